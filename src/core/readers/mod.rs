//! Model readers for the supported document formats
//!
//! Each format gets its own module with a consistent interface that turns a
//! document into raw element and relationship records.

mod json;
mod xml;

pub use json::JsonModelReader;
pub use xml::XmlModelReader;

use std::path::{Path, PathBuf};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ArchlensError, Result};
use super::ModelSource;

/// Trait that all model readers must implement
pub trait ModelReader {
    /// Extract element and relationship records from a document
    fn read(&self, content: &str) -> Result<ModelSource>;

    /// Get the file extensions this reader handles
    fn extensions(&self) -> &[&str];

    /// Get the format name
    fn format_name(&self) -> &str;
}

/// A model document read from disk
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub format: String,
    /// sha256 of the raw document, hex encoded
    pub content_hash: String,
    pub source: ModelSource,
}

fn readers() -> Vec<Box<dyn ModelReader>> {
    vec![Box::new(XmlModelReader::new()), Box::new(JsonModelReader::new())]
}

/// Pick a reader from the file extension
pub fn reader_for_path(path: &Path) -> Option<Box<dyn ModelReader>> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    readers()
        .into_iter()
        .find(|reader| reader.extensions().contains(&extension.as_str()))
}

pub fn is_model_file(path: &Path) -> bool {
    path.is_file() && reader_for_path(path).is_some()
}

/// Read and parse a model file
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LoadedModel> {
    let path = path.as_ref();
    let reader = reader_for_path(path)
        .ok_or_else(|| ArchlensError::UnsupportedFormat(path.display().to_string()))?;

    let content = std::fs::read_to_string(path)?;
    let content_hash = calculate_hash(&content);
    debug!("Reading {} as {} ({})", path.display(), reader.format_name(), &content_hash[..12]);

    let source = reader.read(&content)?;

    Ok(LoadedModel {
        path: path.to_path_buf(),
        format: reader.format_name().to_string(),
        content_hash,
        source,
    })
}

fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
