use std::path::Path;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;
use super::{AnalysisReport, LayerSubgraph};

/// Serialize with four-space indentation
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Write an analysis report as JSON
pub fn export_report<P: AsRef<Path>>(report: &AnalysisReport, path: P) -> Result<()> {
    std::fs::write(path, to_pretty_json(report)?)?;
    Ok(())
}

/// Read back a report written by [`export_report`]
pub fn load_report<P: AsRef<Path>>(path: P) -> Result<AnalysisReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write per-layer subgraphs for visualization tools
pub fn export_layer_subgraphs<P: AsRef<Path>>(subgraphs: &[LayerSubgraph], path: P) -> Result<()> {
    std::fs::write(path, to_pretty_json(&subgraphs)?)?;
    Ok(())
}
