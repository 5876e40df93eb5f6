use serde::{Deserialize, Serialize};

use super::{Layer, ModelStore};

/// Element and cross-layer dependency counts for one layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub elements: usize,
    pub dependencies: usize,
}

/// Per-layer statistics for the three named layers. `unknown` is not aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    pub business: LayerSummary,
    pub application: LayerSummary,
    pub technology: LayerSummary,
}

impl LayerStats {
    pub fn get(&self, layer: Layer) -> Option<&LayerSummary> {
        match layer {
            Layer::Business => Some(&self.business),
            Layer::Application => Some(&self.application),
            Layer::Technology => Some(&self.technology),
            Layer::Unknown => None,
        }
    }

    fn get_mut(&mut self, layer: Layer) -> Option<&mut LayerSummary> {
        match layer {
            Layer::Business => Some(&mut self.business),
            Layer::Application => Some(&mut self.application),
            Layer::Technology => Some(&mut self.technology),
            Layer::Unknown => None,
        }
    }

    /// Named layers with their summaries, in layer order
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &LayerSummary)> {
        Layer::NAMED
            .into_iter()
            .filter_map(move |layer| self.get(layer).map(|summary| (layer, summary)))
    }
}

/// Count elements per layer and cross-layer dependencies.
///
/// A relationship between two different layers counts once for each side, so the
/// dependency totals double-count every cross-layer relationship. An `unknown`
/// endpoint has no counter of its own.
pub fn aggregate(store: &ModelStore) -> LayerStats {
    let mut stats = LayerStats::default();

    for element in store.elements() {
        if let Some(summary) = stats.get_mut(element.layer) {
            summary.elements += 1;
        }
    }

    for relationship in store.relationships() {
        let (Some(source), Some(target)) = (
            store.element(&relationship.source),
            store.element(&relationship.target),
        ) else {
            continue;
        };

        if source.layer == target.layer {
            continue;
        }
        for layer in [source.layer, target.layer] {
            if let Some(summary) = stats.get_mut(layer) {
                summary.dependencies += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LookupPolicy;
    use crate::core::{ElementRecord, LayerClassifier, ModelBuilder, ModelSource, RelationshipRecord};

    fn store(source: ModelSource) -> ModelStore {
        let classifier = LayerClassifier::default();
        ModelBuilder::new(&classifier, LookupPolicy::Skip)
            .build(&source)
            .unwrap()
            .store
    }

    #[test]
    fn test_cross_layer_relationship_counts_on_both_sides() {
        let stats = aggregate(&store(ModelSource {
            elements: vec![
                ElementRecord::new("a", "Clerk", "business-actor"),
                ElementRecord::new("b", "Server", "device"),
            ],
            relationships: vec![RelationshipRecord::new("r1", "a", "b", "flow")],
        }));

        assert_eq!(stats.business, LayerSummary { elements: 1, dependencies: 1 });
        assert_eq!(stats.technology, LayerSummary { elements: 1, dependencies: 1 });
        assert_eq!(stats.application, LayerSummary::default());
    }

    #[test]
    fn test_same_layer_relationships_do_not_count() {
        let stats = aggregate(&store(ModelSource {
            elements: vec![
                ElementRecord::new("a", "Portal", "application-component"),
                ElementRecord::new("b", "Api", "application-interface"),
            ],
            relationships: vec![
                RelationshipRecord::new("r1", "a", "b", "composition"),
                RelationshipRecord::new("r2", "b", "a", "serving"),
            ],
        }));

        assert_eq!(stats.application, LayerSummary { elements: 2, dependencies: 0 });
    }

    #[test]
    fn test_unknown_endpoint_counts_only_named_side() {
        let stats = aggregate(&store(ModelSource {
            elements: vec![
                ElementRecord::new("a", "Goal", "motivation-goal"),
                ElementRecord::new("b", "Clerk", "business-role"),
            ],
            relationships: vec![RelationshipRecord::new("r1", "a", "b", "influence")],
        }));

        assert_eq!(stats.business, LayerSummary { elements: 1, dependencies: 1 });
        let total: usize = stats.iter().map(|(_, s)| s.elements).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_serializes_in_layer_order() {
        let json = serde_json::to_string(&LayerStats::default()).unwrap();
        assert_eq!(
            json,
            r#"{"business":{"elements":0,"dependencies":0},"application":{"elements":0,"dependencies":0},"technology":{"elements":0,"dependencies":0}}"#
        );
    }
}
