use crate::error::Result;
use super::super::ModelSource;
use super::ModelReader;

/// Reads models stored as `{ "elements": [...], "relationships": [...] }`
pub struct JsonModelReader;

impl JsonModelReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonModelReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelReader for JsonModelReader {
    fn read(&self, content: &str) -> Result<ModelSource> {
        Ok(serde_json::from_str(content)?)
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn format_name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelationshipRecord;
    use crate::error::ArchlensError;

    #[test]
    fn test_reads_records() {
        let json = r#"{
            "elements": [
                {"id": "a", "name": "Clerk", "type": "business-role", "properties": {"site": "HQ"}},
                {"id": "b", "type": "node"}
            ],
            "relationships": [
                {"id": "r1", "source": "a", "target": "b", "type": "assignment"},
                {"id": "r2", "source": "a"}
            ]
        }"#;

        let source = JsonModelReader::new().read(json).unwrap();
        assert_eq!(source.elements[0].properties["site"], "HQ");
        assert_eq!(source.elements[1].name, None);
        assert_eq!(source.relationships[0], RelationshipRecord::new("r1", "a", "b", "assignment"));
        assert_eq!(source.relationships[1].target, None);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let source = JsonModelReader::new().read("{}").unwrap();
        assert!(source.elements.is_empty());
        assert!(source.relationships.is_empty());
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = JsonModelReader::new().read("{\"elements\": [");
        assert!(matches!(result, Err(ArchlensError::Serialization(_))));
    }
}
