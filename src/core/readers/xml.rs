use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::error::{ArchlensError, Result};
use super::super::{ElementRecord, ModelSource, RelationshipRecord};
use super::ModelReader;

/// Reads ArchiMate XML documents (Open Exchange Format and Archi's native format).
///
/// `element` and `relationship` tags are collected at any depth. An `element` tag
/// that carries both `source` and `target` is read as a relationship, which is how
/// Archi stores relationships in its native files.
pub struct XmlModelReader;

impl XmlModelReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XmlModelReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelReader for XmlModelReader {
    fn read(&self, content: &str) -> Result<ModelSource> {
        let mut reader = Reader::from_str(content);
        let mut parser = ExchangeParser::default();

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => parser.handle_start(e, false)?,
                Event::Empty(ref e) => parser.handle_start(e, true)?,
                Event::Text(ref e) => parser.handle_text(e)?,
                Event::End(ref e) => parser.handle_end(e.local_name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
        }

        if parser.current.is_some() {
            return Err(ArchlensError::Parser(
                "Document ended inside an element or relationship".to_string(),
            ));
        }

        Ok(parser.source)
    }

    fn extensions(&self) -> &[&str] {
        &["xml", "archimate"]
    }

    fn format_name(&self) -> &str {
        "xml"
    }
}

/// Record currently being read
enum OpenRecord {
    Element(ElementRecord),
    Relationship(RelationshipRecord),
    /// Diagrams and sketches stored as `element` tags in Archi files
    Ignored,
}

fn is_view(kind: Option<&str>) -> bool {
    kind.is_some_and(|k| k.ends_with("DiagramModel") || k.ends_with("SketchModel"))
}

#[derive(Default)]
struct PendingProperty {
    key: Option<String>,
    value: String,
}

/// Event-driven state machine over the XML document
#[derive(Default)]
struct ExchangeParser {
    source: ModelSource,
    current: Option<OpenRecord>,
    property: Option<PendingProperty>,
    in_name: bool,
    in_value: bool,
}

/// Attributes of a tag keyed by local name (`xsi:type` becomes `type`)
fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut result = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ArchlensError::Parser(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ArchlensError::Parser(err.to_string()))?
            .to_string();
        result.push((key, value));
    }
    Ok(result)
}

fn lookup(attrs: &[(String, String)], keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
}

impl ExchangeParser {
    fn handle_start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();

        match tag.as_str() {
            "element" | "relationship" if self.current.is_none() => {
                let attrs = attributes(e)?;
                let id = lookup(&attrs, &["identifier", "id"]);
                let kind = lookup(&attrs, &["type"]);
                let source = lookup(&attrs, &["source"]);
                let target = lookup(&attrs, &["target"]);

                let record = if is_view(kind.as_deref()) {
                    OpenRecord::Ignored
                } else if tag == "relationship" || (source.is_some() && target.is_some()) {
                    OpenRecord::Relationship(RelationshipRecord {
                        id,
                        source,
                        target,
                        relationship_type: kind,
                    })
                } else {
                    OpenRecord::Element(ElementRecord {
                        id: id.unwrap_or_default(),
                        name: lookup(&attrs, &["name"]),
                        element_type: kind,
                        ..ElementRecord::default()
                    })
                };

                self.current = Some(record);
                if empty {
                    self.finish_record();
                }
            }
            "name" if !empty && self.property.is_none() => {
                // First name wins, whether from the attribute or an earlier child
                if let Some(OpenRecord::Element(element)) = &self.current {
                    self.in_name = element.name.is_none();
                }
            }
            "property" if matches!(self.current, Some(OpenRecord::Element(_))) => {
                let attrs = attributes(e)?;
                self.property = Some(PendingProperty {
                    key: lookup(&attrs, &["key", "propertyDefinitionRef"]),
                    value: lookup(&attrs, &["value"]).unwrap_or_default(),
                });
                if empty {
                    self.finish_property();
                }
            }
            "value" if !empty && self.property.is_some() => {
                self.in_value = true;
            }
            _ => {}
        }

        Ok(())
    }

    fn handle_text(&mut self, e: &BytesText<'_>) -> Result<()> {
        if !self.in_name && !self.in_value {
            return Ok(());
        }

        let text = e
            .unescape()
            .map_err(|err| ArchlensError::Parser(err.to_string()))?;

        if self.in_value {
            if let Some(property) = self.property.as_mut() {
                property.value.push_str(&text);
            }
        } else if let Some(OpenRecord::Element(element)) = self.current.as_mut() {
            element.name.get_or_insert_with(String::new).push_str(&text);
        }

        Ok(())
    }

    fn handle_end(&mut self, local_name: &[u8]) {
        match local_name {
            b"name" => self.in_name = false,
            b"value" => self.in_value = false,
            b"property" => self.finish_property(),
            b"element" | b"relationship" => self.finish_record(),
            _ => {}
        }
    }

    fn finish_property(&mut self) {
        let Some(property) = self.property.take() else {
            return;
        };
        self.in_value = false;

        if let (Some(key), Some(OpenRecord::Element(element))) = (property.key, self.current.as_mut()) {
            element
                .properties
                .insert(key, property.value.trim().to_string());
        }
    }

    fn finish_record(&mut self) {
        self.in_name = false;
        match self.current.take() {
            Some(OpenRecord::Element(mut element)) => {
                element.name = element
                    .name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty());
                self.source.elements.push(element);
            }
            Some(OpenRecord::Relationship(relationship)) => {
                self.source.relationships.push(relationship);
            }
            Some(OpenRecord::Ignored) | None => {}
        }
    }
}
