// src/core/mod.rs
mod engine;
mod model;
mod classifier;
mod graph;
mod builder;
mod risk;
mod layers;
mod recommend;
mod report;

// Model ingestion and output
pub mod readers;
mod export;
mod summary;

pub use model::{
    Element, ElementRecord, Layer, ModelSource, ModelStore, Relationship, RelationshipRecord,
};
pub use classifier::LayerClassifier;
pub use graph::{GraphEdge, GraphNode, GraphStats, LayerSubgraph, ModelGraph};
pub use builder::{ModelBuilder, ParseWarning, ParsedModel};
pub use risk::{
    complexity_score, normalize_type, ElementReport, RelationshipReport, RiskEngine, RiskTables,
    RiskThresholds,
};
pub use layers::{aggregate, LayerStats, LayerSummary};
pub use recommend::{Recommendation, RecommendationGenerator};
pub use report::{collect_risks, AnalysisReport};

pub use readers::{load_model, is_model_file, LoadedModel, ModelReader};
pub use export::{export_layer_subgraphs, export_report, load_report};
pub use summary::{render_summary, risk_categories, HIGH_RISK_THRESHOLD};

// Export the main engine
pub use engine::Engine;
