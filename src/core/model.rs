// src/core/model.rs
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use serde::{Deserialize, Serialize};

use crate::error::{ArchlensError, Result};

/// Architectural stratum an element belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Business,
    Application,
    Technology,
    Unknown,
}

impl Layer {
    /// The three named layers in their declared order
    pub const NAMED: [Layer; 3] = [Layer::Business, Layer::Application, Layer::Technology];

    /// Position in the business → application → technology ordering.
    /// `Unknown` has no level and is never considered misaligned.
    pub fn level(self) -> Option<u8> {
        match self {
            Layer::Business => Some(0),
            Layer::Application => Some(1),
            Layer::Technology => Some(2),
            Layer::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Business => "business",
            Layer::Application => "application",
            Layer::Technology => "technology",
            Layer::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single architecture artifact (actor, process, component, node, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: String,
    /// Assigned once from the type tag when the element is parsed
    pub layer: Layer,
    /// Relationship ids this element takes part in, as source or target
    pub relationships: Vec<String>,
    pub properties: BTreeMap<String, String>,
}

impl Element {
    /// Name used in risk messages; falls back to the id when the name is unset
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}

/// A directed, typed connection between two elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
}

/// Element record as delivered by a model reader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub element_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Relationship record as delivered by a model reader.
/// Fields are optional so incomplete records can be skipped instead of failing the parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(rename = "type", default)]
    pub relationship_type: Option<String>,
}

/// Raw records extracted from a model document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSource {
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

impl ElementRecord {
    pub fn new(id: &str, name: &str, element_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: Some(name.to_string()),
            element_type: Some(element_type.to_string()),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }
}

impl RelationshipRecord {
    pub fn new(id: &str, source: &str, target: &str, relationship_type: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            source: Some(source.to_string()),
            target: Some(target.to_string()),
            relationship_type: Some(relationship_type.to_string()),
        }
    }
}

/// Parsed elements and relationships, keyed by id, in insertion order
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    elements: Vec<Element>,
    element_index: HashMap<String, usize>,
    relationships: Vec<Relationship>,
    relationship_index: HashMap<String, usize>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.element_index.clear();
        self.relationships.clear();
        self.relationship_index.clear();
    }

    /// Add an element; ids must be non-empty and unique. Returns its position.
    pub fn insert_element(&mut self, element: Element) -> Result<usize> {
        if element.id.is_empty() {
            return Err(ArchlensError::MissingAttribute {
                record: "element".to_string(),
                attribute: "identifier".to_string(),
            });
        }
        if self.element_index.contains_key(&element.id) {
            return Err(ArchlensError::DuplicateElement(element.id));
        }

        let position = self.elements.len();
        self.element_index.insert(element.id.clone(), position);
        self.elements.push(element);
        Ok(position)
    }

    /// Add a relationship; ids must be unique. Endpoints are not checked here.
    pub fn insert_relationship(&mut self, relationship: Relationship) -> Result<usize> {
        if self.relationship_index.contains_key(&relationship.id) {
            return Err(ArchlensError::DuplicateRelationship(relationship.id));
        }

        let position = self.relationships.len();
        self.relationship_index.insert(relationship.id.clone(), position);
        self.relationships.push(relationship);
        Ok(position)
    }

    /// Record that `element_id` participates in `relationship_id`.
    /// Returns false when the element is not in the store.
    pub fn attach_relationship(&mut self, element_id: &str, relationship_id: &str) -> bool {
        match self.element_index.get(element_id) {
            Some(&position) => {
                self.elements[position]
                    .relationships
                    .push(relationship_id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.element_index.get(id).map(|&i| &self.elements[i])
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationship_index.get(id).map(|&i| &self.relationships[i])
    }

    pub fn contains_element(&self, id: &str) -> bool {
        self.element_index.contains_key(id)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}
