//! Archlens builds a typed graph from ArchiMate models and reports
//! per-element and per-relationship risks, layer statistics and
//! remediation recommendations.

pub mod config;
pub mod core;
pub mod error;

pub use error::{ArchlensError, Result};
