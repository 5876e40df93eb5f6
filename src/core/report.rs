use serde::{Deserialize, Serialize};

use super::{ElementReport, LayerStats, Recommendation, RelationshipReport};

/// The complete result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub elements: Vec<ElementReport>,
    pub relationships: Vec<RelationshipReport>,
    pub layers: LayerStats,
    /// Every risk of every element, then of every relationship; duplicates kept
    pub risks: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisReport {
    pub fn assemble(
        elements: Vec<ElementReport>,
        relationships: Vec<RelationshipReport>,
        layers: LayerStats,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        let risks = collect_risks(&elements, &relationships);
        Self {
            elements,
            relationships,
            layers,
            risks,
            recommendations,
        }
    }

    /// Elements carrying more than `threshold` risks
    pub fn high_risk_elements(&self, threshold: usize) -> impl Iterator<Item = &ElementReport> {
        self.elements.iter().filter(move |e| e.risks.len() > threshold)
    }
}

/// Flatten element risks (in element order) followed by relationship risks
pub fn collect_risks(elements: &[ElementReport], relationships: &[RelationshipReport]) -> Vec<String> {
    elements
        .iter()
        .flat_map(|e| e.risks.iter())
        .chain(relationships.iter().flat_map(|r| r.risks.iter()))
        .cloned()
        .collect()
}
