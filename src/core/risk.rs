// src/core/risk.rs
use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, RiskTablesConfig};
use super::{Element, Layer, ModelGraph, ModelStore, Relationship};

/// Static risk catalogs keyed by type tag. Lookups fall back to the canonical
/// spelling from [`normalize_type`] when no key matches exactly.
#[derive(Debug, Clone, Default)]
pub struct RiskTables {
    pub elements: BTreeMap<String, Vec<String>>,
    pub relationships: BTreeMap<String, Vec<String>>,
}

impl RiskTables {
    /// Static risks for an element type tag
    pub fn element_risks(&self, element_type: &str) -> Vec<String> {
        lookup(&self.elements, element_type)
    }

    /// Static risks for a relationship kind
    pub fn relationship_risks(&self, relationship_type: &str) -> Vec<String> {
        lookup(&self.relationships, relationship_type)
    }
}

/// Canonical spelling of a type tag, so that `business-process`, `BusinessProcess`
/// and `archimate:BusinessProcess` share one table entry, as do `serving` and
/// `ServingRelationship`.
pub fn normalize_type(tag: &str) -> String {
    let local = tag.rsplit(':').next().unwrap_or(tag);
    let compact: String = local
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect();

    match compact.strip_suffix("relationship") {
        Some(kind) if !kind.is_empty() => kind.to_string(),
        _ => compact,
    }
}

/// Exact key first, then the first key with the same canonical spelling
fn lookup(table: &BTreeMap<String, Vec<String>>, tag: &str) -> Vec<String> {
    if let Some(risks) = table.get(tag) {
        return risks.clone();
    }

    let wanted = normalize_type(tag);
    table
        .iter()
        .find(|(key, _)| normalize_type(key) == wanted)
        .map(|(_, risks)| risks.clone())
        .unwrap_or_default()
}

impl From<&RiskTablesConfig> for RiskTables {
    fn from(config: &RiskTablesConfig) -> Self {
        Self {
            elements: config.elements.clone(),
            relationships: config.relationships.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskThresholds {
    /// Neighbor count above which an element is highly coupled
    pub coupling: usize,
    /// Largest level difference tolerated between neighbors
    pub max_layer_gap: u8,
}

impl From<&AnalysisConfig> for RiskThresholds {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            coupling: config.coupling_threshold,
            max_layer_gap: config.max_layer_gap,
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

/// Annotated element in the analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementReport {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: String,
    pub layer: Layer,
    pub risks: Vec<String>,
    pub complexity_score: f64,
}

/// Annotated relationship in the analysis report; endpoints are display names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipReport {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub risks: Vec<String>,
}

/// Derives risk annotations and complexity scores from the model graph
#[derive(Debug, Clone)]
pub struct RiskEngine {
    tables: RiskTables,
    thresholds: RiskThresholds,
}

impl RiskEngine {
    pub fn new(tables: RiskTables, thresholds: RiskThresholds) -> Self {
        Self { tables, thresholds }
    }

    /// Analyze every element and relationship, preserving store order
    pub fn analyze(
        &self,
        store: &ModelStore,
        graph: &ModelGraph,
    ) -> (Vec<ElementReport>, Vec<RelationshipReport>) {
        let elements = store
            .elements()
            .iter()
            .map(|element| self.analyze_element(element, graph))
            .collect();

        let relationships = store
            .relationships()
            .iter()
            .map(|relationship| self.analyze_relationship(relationship, store, graph))
            .collect();

        (elements, relationships)
    }

    pub fn analyze_element(&self, element: &Element, graph: &ModelGraph) -> ElementReport {
        let mut risks = self.tables.element_risks(&element.element_type);

        let neighbors = graph.neighbors(&element.id);

        if neighbors.len() > self.thresholds.coupling {
            risks.push(format!(
                "High coupling: {} has {} dependencies (threshold {})",
                element.display_name(),
                neighbors.len(),
                self.thresholds.coupling
            ));
        }

        if neighbors.iter().any(|n| self.misaligned(element.layer, n.layer)) {
            risks.push(format!(
                "Layer misalignment: {} ({}) depends across non-adjacent layers",
                element.display_name(),
                element.layer
            ));
        }

        let cross_layer_neighbors = neighbors.iter().filter(|n| n.layer != element.layer).count();

        ElementReport {
            id: element.id.clone(),
            name: element.name.clone(),
            element_type: element.element_type.clone(),
            layer: element.layer,
            risks,
            complexity_score: complexity_score(
                element.relationships.len(),
                cross_layer_neighbors,
                element.properties.len(),
            ),
        }
    }

    pub fn analyze_relationship(
        &self,
        relationship: &Relationship,
        store: &ModelStore,
        graph: &ModelGraph,
    ) -> RelationshipReport {
        let display = |id: &str| {
            store
                .element(id)
                .map(|e| e.display_name().to_string())
                .unwrap_or_else(|| id.to_string())
        };
        let source = display(&relationship.source);
        let target = display(&relationship.target);

        let mut risks = self.tables.relationship_risks(&relationship.relationship_type);

        // The edge source -> target closes a cycle iff target already reaches source
        if graph.has_path(&relationship.target, &relationship.source) {
            risks.push(format!("Circular dependency: {} -> {}", source, target));
        }

        RelationshipReport {
            id: relationship.id.clone(),
            source,
            target,
            relationship_type: relationship.relationship_type.clone(),
            risks,
        }
    }

    /// Unknown layers have no level and never count as misaligned
    fn misaligned(&self, a: Layer, b: Layer) -> bool {
        match (a.level(), b.level()) {
            (Some(x), Some(y)) => x.abs_diff(y) > self.thresholds.max_layer_gap,
            _ => false,
        }
    }
}

/// Heuristic structural weight of an element, rounded to two decimals
pub fn complexity_score(relationships: usize, cross_layer_neighbors: usize, properties: usize) -> f64 {
    let raw = 1.5 * relationships as f64 + 2.0 * cross_layer_neighbors as f64 + 0.5 * properties as f64;
    (raw * 100.0).round() / 100.0
}
