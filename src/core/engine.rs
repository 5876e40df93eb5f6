// src/core/engine.rs
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use super::{
    collect_risks, layers, AnalysisReport, LayerClassifier, LayerSubgraph, ModelBuilder, ModelSource,
    ParseWarning, ParsedModel, RecommendationGenerator, RiskEngine, RiskTables, RiskThresholds,
};

/// Main orchestration engine: parse → build graph → analyze → aggregate → recommend
pub struct Engine {
    config: Config,
    classifier: LayerClassifier,
    risk_engine: RiskEngine,
    recommender: RecommendationGenerator,
    /// Store and graph of the most recent parse
    model: ParsedModel,
}

impl Engine {
    pub fn new(config: &Config) -> Result<Self> {
        debug!("Loaded configuration: {:?}", config.analysis);

        Ok(Self {
            config: config.clone(),
            classifier: LayerClassifier::new(&config.layers),
            risk_engine: RiskEngine::new(
                RiskTables::from(&config.risks),
                RiskThresholds::from(&config.analysis),
            ),
            recommender: RecommendationGenerator::new(&config.recommendations.rules)?,
            model: ParsedModel::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &ParsedModel {
        &self.model
    }

    /// Replace the current model with one built from `source`.
    /// On failure the engine is left with an empty model.
    pub fn parse(&mut self, source: &ModelSource) -> Result<&[ParseWarning]> {
        self.model = ParsedModel::default();

        let builder = ModelBuilder::new(&self.classifier, self.config.analysis.lookup_policy);
        self.model = builder.build(source)?;

        let stats = self.model.graph.get_statistics();
        info!(
            "Built model graph: {} elements, {} relationships ({} distinct pairs), {} skipped",
            stats.total_nodes,
            stats.total_edges,
            stats.distinct_pairs,
            self.model.warnings.len()
        );

        Ok(&self.model.warnings)
    }

    /// Analyze the current model
    pub fn analyze(&self) -> AnalysisReport {
        let ParsedModel { store, graph, .. } = &self.model;

        let (elements, relationships) = self.risk_engine.analyze(store, graph);
        let layer_stats = layers::aggregate(store);
        let risks = collect_risks(&elements, &relationships);
        let recommendations = self.recommender.recommend(&risks);

        debug!(
            "Analysis produced {} risks in {} recommendation categories",
            risks.len(),
            recommendations.len()
        );

        AnalysisReport::assemble(elements, relationships, layer_stats, recommendations)
    }

    /// Parse and analyze in one step
    pub fn run(&mut self, source: &ModelSource) -> Result<AnalysisReport> {
        self.parse(source)?;
        Ok(self.analyze())
    }

    /// Same-layer views of the current graph for visualization
    pub fn layer_subgraphs(&self) -> Vec<LayerSubgraph> {
        self.model.graph.layer_subgraphs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LookupPolicy;
    use crate::core::{ElementRecord, Layer, LayerSummary, RelationshipRecord};
    use crate::error::ArchlensError;

    fn engine() -> Engine {
        Engine::new(&Config::default()).unwrap()
    }

    fn mixed_model() -> ModelSource {
        ModelSource {
            elements: vec![
                ElementRecord::new("bp", "Claims", "business-process").with_property("owner", "ops"),
                ElementRecord::new("ac", "Claims App", "application-component"),
                ElementRecord::new("ts", "Hosting", "technology-service"),
                ElementRecord::new("dv", "Server", "device"),
            ],
            relationships: vec![
                RelationshipRecord::new("r1", "ac", "bp", "serving"),
                RelationshipRecord::new("r2", "ts", "ac", "serving"),
                RelationshipRecord::new("r3", "dv", "ts", "realization"),
                RelationshipRecord::new("r4", "bp", "dv", "flow"),
                RelationshipRecord::new("r5", "bp", "missing", "flow"),
            ],
        }
    }

    #[test]
    fn test_scenario_single_business_process() {
        let report = engine()
            .run(&ModelSource {
                elements: vec![ElementRecord::new("p", "Billing", "business-process")],
                relationships: vec![],
            })
            .unwrap();

        let element = &report.elements[0];
        assert_eq!(element.layer, Layer::Business);
        assert_eq!(element.risks.len(), 4);
        assert_eq!(element.complexity_score, 0.0);
        assert_eq!(report.layers.business, LayerSummary { elements: 1, dependencies: 0 });
        assert_eq!(report.risks, element.risks);
    }

    #[test]
    fn test_scenario_fan_out_is_coupled() {
        let mut elements = vec![ElementRecord::new("x", "Hub", "application-component")];
        let mut relationships = Vec::new();
        for i in 0..6 {
            let id = format!("t{}", i);
            elements.push(ElementRecord::new(&id, &id, "application-service"));
            relationships.push(RelationshipRecord::new(&format!("r{}", i), "x", &id, "flow"));
        }

        let report = engine().run(&ModelSource { elements, relationships }).unwrap();
        let coupled: Vec<_> = report
            .elements
            .iter()
            .filter(|e| e.risks.iter().any(|r| r.starts_with("High coupling")))
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(coupled, vec!["x"]);
        assert_eq!(report.recommendations[0].category, "architecture");
    }

    #[test]
    fn test_scenario_business_to_technology() {
        let report = engine()
            .run(&ModelSource {
                elements: vec![
                    ElementRecord::new("a", "Clerk", "business-actor"),
                    ElementRecord::new("b", "Server", "node"),
                ],
                relationships: vec![RelationshipRecord::new("r1", "a", "b", "flow")],
            })
            .unwrap();

        for element in &report.elements {
            assert!(element.risks.iter().any(|r| r.starts_with("Layer misalignment")));
        }
        assert_eq!(report.layers.business.dependencies, 1);
        assert_eq!(report.layers.technology.dependencies, 1);
        assert_eq!(report.layers.application.dependencies, 0);
    }

    #[test]
    fn test_scenario_mutual_dependency_is_circular() {
        let report = engine()
            .run(&ModelSource {
                elements: vec![
                    ElementRecord::new("a", "Orders", "application-component"),
                    ElementRecord::new("b", "Billing", "application-component"),
                ],
                relationships: vec![
                    RelationshipRecord::new("r1", "a", "b", "flow"),
                    RelationshipRecord::new("r2", "b", "a", "flow"),
                ],
            })
            .unwrap();

        assert!(report
            .relationships
            .iter()
            .any(|r| r.risks.iter().any(|risk| risk.starts_with("Circular dependency"))));
    }

    #[test]
    fn test_cycle_through_several_elements() {
        let mut engine = engine();
        let report = engine.run(&mixed_model()).unwrap();

        // r1..r4 form bp -> dv -> ts -> ac -> bp
        for relationship in &report.relationships {
            assert!(relationship.risks.iter().any(|r| r.starts_with("Circular dependency")));
        }
        assert_eq!(engine.model().warnings.len(), 1);
        assert_eq!(report.relationships.len(), 4);
    }

    #[test]
    fn test_risks_follow_element_then_relationship_order() {
        let report = engine().run(&mixed_model()).unwrap();

        let mut expected = Vec::new();
        for element in &report.elements {
            expected.extend(element.risks.clone());
        }
        for relationship in &report.relationships {
            expected.extend(relationship.risks.clone());
        }
        assert_eq!(report.risks, expected);

        let ids: Vec<_> = report.elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["bp", "ac", "ts", "dv"]);
    }

    #[test]
    fn test_running_twice_is_byte_identical() {
        let mut engine = engine();
        let first = serde_json::to_string(&engine.run(&mixed_model()).unwrap()).unwrap();
        let second = serde_json::to_string(&engine.run(&mixed_model()).unwrap()).unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.model().store.element_count(), 4);
    }

    #[test]
    fn test_reparse_replaces_previous_model() {
        let mut engine = engine();
        engine.run(&mixed_model()).unwrap();

        let report = engine
            .run(&ModelSource {
                elements: vec![ElementRecord::new("n", "Node", "node")],
                relationships: vec![],
            })
            .unwrap();

        assert_eq!(report.elements.len(), 1);
        assert!(report.relationships.is_empty());
        assert_eq!(engine.layer_subgraphs()[2].nodes.len(), 1);
    }

    #[test]
    fn test_strict_policy_surfaces_lookup_failure() {
        let mut config = Config::default();
        config.analysis.lookup_policy = LookupPolicy::Fail;
        let mut engine = Engine::new(&config).unwrap();

        let error = engine.run(&mixed_model()).unwrap_err();
        assert!(matches!(error, ArchlensError::UnknownEndpoint { .. }));
        assert!(error.is_source_failure());
        assert_eq!(engine.model().store.element_count(), 0);
    }

    #[test]
    fn test_exchange_document_gets_static_risks() {
        use crate::core::readers::{ModelReader, XmlModelReader};

        let xml = r#"<model xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
          <elements>
            <element identifier="a" xsi:type="BusinessProcess"><name>Claims</name></element>
            <element identifier="b" xsi:type="ApplicationComponent"><name>Claims App</name></element>
          </elements>
          <relationships>
            <relationship identifier="r1" source="b" target="a" xsi:type="Serving"/>
          </relationships>
        </model>"#;
        let source = XmlModelReader::new().read(xml).unwrap();

        let report = engine().run(&source).unwrap();
        assert_eq!(report.elements[0].layer, Layer::Business);
        assert_eq!(report.elements[0].risks.len(), 4);
        assert_eq!(report.elements[1].layer, Layer::Application);
        assert_eq!(report.elements[1].risks.len(), 4);
        assert_eq!(report.relationships[0].risks.len(), 2);
        assert_eq!(report.relationships[0].source, "Claims App");
    }

    #[test]
    fn test_empty_model_still_produces_report() {
        let report = engine().run(&ModelSource::default()).unwrap();

        assert!(report.elements.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.layers.business, LayerSummary::default());
    }

    #[test]
    fn test_layer_subgraphs_exclude_cross_layer_edges() {
        let mut engine = engine();
        engine
            .run(&ModelSource {
                elements: vec![
                    ElementRecord::new("a", "Clerk", "business-actor"),
                    ElementRecord::new("b", "Claims", "business-process"),
                    ElementRecord::new("c", "App", "application-component"),
                ],
                relationships: vec![
                    RelationshipRecord::new("r1", "a", "b", "assignment"),
                    RelationshipRecord::new("r2", "c", "b", "serving"),
                ],
            })
            .unwrap();

        let subgraphs = engine.layer_subgraphs();
        assert_eq!(subgraphs[0].layer, Layer::Business);
        assert_eq!(subgraphs[0].nodes.len(), 2);
        assert_eq!(subgraphs[0].edges.len(), 1);
        assert_eq!(subgraphs[1].nodes.len(), 1);
        assert!(subgraphs[1].edges.is_empty());
    }
}
