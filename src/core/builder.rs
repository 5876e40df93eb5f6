// src/core/builder.rs
use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LookupPolicy;
use crate::error::{ArchlensError, Result};
use super::{
    Element, GraphEdge, GraphNode, LayerClassifier, ModelGraph, ModelSource, ModelStore,
    Relationship, RelationshipRecord,
};

/// Non-fatal problem found while building the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A relationship record lacked an id, source or target and was skipped
    IncompleteRelationship { position: usize, missing: String },
    /// A relationship pointed at an element that is not in the model and was skipped
    UnknownEndpoint { relationship: String, element: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::IncompleteRelationship { position, missing } => write!(
                f,
                "relationship record #{} skipped: missing {}",
                position, missing
            ),
            ParseWarning::UnknownEndpoint { relationship, element } => write!(
                f,
                "relationship {} skipped: unknown element {}",
                relationship, element
            ),
        }
    }
}

/// Everything produced by one parse
#[derive(Debug, Clone, Default)]
pub struct ParsedModel {
    pub store: ModelStore,
    pub graph: ModelGraph,
    pub warnings: Vec<ParseWarning>,
}

/// Builds the model store and graph from raw records
pub struct ModelBuilder<'a> {
    classifier: &'a LayerClassifier,
    lookup_policy: LookupPolicy,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(classifier: &'a LayerClassifier, lookup_policy: LookupPolicy) -> Self {
        Self {
            classifier,
            lookup_policy,
        }
    }

    /// Build a fresh store and graph. Elements are loaded before any relationship.
    pub fn build(&self, source: &ModelSource) -> Result<ParsedModel> {
        let mut model = ParsedModel::default();

        for record in &source.elements {
            let element_type = record.element_type.clone().unwrap_or_default();
            let element = Element {
                id: record.id.clone(),
                name: record.name.clone(),
                layer: self.classifier.classify(&element_type),
                element_type,
                relationships: Vec::new(),
                properties: record.properties.clone(),
            };

            let node = GraphNode::from(&element);
            model.store.insert_element(element)?;
            model.graph.add_node(node);
        }

        for (position, record) in source.relationships.iter().enumerate() {
            let Some(relationship) = self.complete_relationship(position, record, &mut model)
            else {
                continue;
            };

            if let Some(missing) = [&relationship.source, &relationship.target]
                .into_iter()
                .find(|id| !model.store.contains_element(id))
            {
                match self.lookup_policy {
                    LookupPolicy::Fail => {
                        return Err(ArchlensError::UnknownEndpoint {
                            relationship: relationship.id.clone(),
                            element: missing.clone(),
                        });
                    }
                    LookupPolicy::Skip => {
                        let warning = ParseWarning::UnknownEndpoint {
                            relationship: relationship.id.clone(),
                            element: missing.clone(),
                        };
                        warn!("{}", warning);
                        model.warnings.push(warning);
                        continue;
                    }
                }
            }

            model.store.insert_relationship(relationship.clone())?;
            model.graph.add_edge(GraphEdge::from(&relationship));
            model.store.attach_relationship(&relationship.source, &relationship.id);
            model.store.attach_relationship(&relationship.target, &relationship.id);
        }

        debug!(
            "Built model: {} elements, {} relationships, {} warnings",
            model.store.element_count(),
            model.store.relationship_count(),
            model.warnings.len()
        );

        Ok(model)
    }

    /// Turn a record into a relationship, or record why it was skipped
    fn complete_relationship(
        &self,
        position: usize,
        record: &RelationshipRecord,
        model: &mut ParsedModel,
    ) -> Option<Relationship> {
        let present = |field: &Option<String>| field.as_ref().filter(|v| !v.is_empty()).cloned();

        let missing: Vec<&str> = [
            ("identifier", &record.id),
            ("source", &record.source),
            ("target", &record.target),
        ]
        .into_iter()
        .filter(|(_, value)| present(*value).is_none())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            let warning = ParseWarning::IncompleteRelationship {
                position,
                missing: missing.join(", "),
            };
            warn!("{}", warning);
            model.warnings.push(warning);
            return None;
        }

        Some(Relationship {
            id: present(&record.id)?,
            source: present(&record.source)?,
            target: present(&record.target)?,
            relationship_type: record.relationship_type.clone().unwrap_or_default(),
        })
    }
}
