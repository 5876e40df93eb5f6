use crate::config::LayersConfig;
use super::Layer;

/// Maps element type tags onto architectural layers by substring markers
#[derive(Debug, Clone)]
pub struct LayerClassifier {
    /// Checked in order; the first layer with a matching marker wins
    markers: Vec<(Layer, Vec<String>)>,
}

impl LayerClassifier {
    pub fn new(config: &LayersConfig) -> Self {
        let lower = |items: &[String]| -> Vec<String> { items.iter().map(|m| m.to_lowercase()).collect() };

        Self {
            markers: vec![
                (Layer::Business, lower(&config.business)),
                (Layer::Application, lower(&config.application)),
                (Layer::Technology, lower(&config.technology)),
            ],
        }
    }

    /// Classify a type tag. Absent or unrecognized tags yield `Layer::Unknown`.
    pub fn classify(&self, type_tag: &str) -> Layer {
        if type_tag.is_empty() {
            return Layer::Unknown;
        }

        let tag = type_tag.to_lowercase();
        self.markers
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| tag.contains(m.as_str())))
            .map(|(layer, _)| *layer)
            .unwrap_or(Layer::Unknown)
    }
}

impl Default for LayerClassifier {
    fn default() -> Self {
        Self::new(&LayersConfig::default())
    }
}
