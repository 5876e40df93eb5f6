use thiserror::Error;

/// Main error type for archlens operations
#[derive(Error, Debug)]
pub enum ArchlensError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required attribute '{attribute}' on {record} record")]
    MissingAttribute { record: String, attribute: String },

    #[error("Duplicate element identifier: {0}")]
    DuplicateElement(String),

    #[error("Duplicate relationship identifier: {0}")]
    DuplicateRelationship(String),

    #[error("Relationship {relationship} references unknown element {element}")]
    UnknownEndpoint { relationship: String, element: String },

    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),
}

impl ArchlensError {
    /// True for failures caused by the model source itself rather than the environment.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            ArchlensError::Parser(_)
                | ArchlensError::Xml(_)
                | ArchlensError::Serialization(_)
                | ArchlensError::MissingAttribute { .. }
                | ArchlensError::DuplicateElement(_)
                | ArchlensError::DuplicateRelationship(_)
                | ArchlensError::UnknownEndpoint { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ArchlensError>;
