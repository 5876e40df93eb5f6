use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ArchlensError, Result};

/// What to do with a relationship whose endpoint is not in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupPolicy {
    /// Drop the relationship and record a warning
    Skip,
    /// Abort the whole parse
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Thresholds and ingestion policy
    pub analysis: AnalysisConfig,

    /// Substring markers used to classify element types into layers
    pub layers: LayersConfig,

    /// Static risk catalogs keyed by element type and relationship kind
    pub risks: RiskTablesConfig,

    /// Keyword rules used to group risks into recommendation categories
    pub recommendations: RecommendationsConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// An element with more neighbors than this is flagged as highly coupled
    pub coupling_threshold: usize,

    /// Largest allowed level difference between connected layers
    pub max_layer_gap: u8,

    /// Handling of relationships that reference unknown elements
    pub lookup_policy: LookupPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    pub business: Vec<String>,
    pub application: Vec<String>,
    pub technology: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTablesConfig {
    /// Risks attached verbatim to every element of a given type
    pub elements: BTreeMap<String, Vec<String>>,

    /// Risks attached verbatim to every relationship of a given kind
    pub relationships: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category name reported in recommendations
    pub category: String,

    /// Case-insensitive substrings that place a risk in this category
    pub keywords: Vec<String>,

    /// Fixed suggestions emitted when the category has at least one risk
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationsConfig {
    /// Rules are checked in order; the first matching rule wins
    pub rules: Vec<CategoryRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Suffix appended to the model file stem for exported reports
    pub report_suffix: String,

    /// Suffix appended to the model file stem for exported layer subgraphs
    pub layers_suffix: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coupling_threshold: 5,
            max_layer_gap: 1,
            lookup_policy: LookupPolicy::Skip,
        }
    }
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            business: strings(&[
                "business-actor",
                "business-role",
                "business-process",
                "business-function",
                // exchange-format spellings, e.g. "BusinessActor"
                "businessactor",
                "businessrole",
                "businessprocess",
                "businessfunction",
            ]),
            application: strings(&[
                "application-component",
                "application-service",
                "application-interface",
                "applicationcomponent",
                "applicationservice",
                "applicationinterface",
            ]),
            technology: strings(&[
                "node",
                "device",
                "system-software",
                "technology-service",
                "systemsoftware",
                "technologyservice",
            ]),
        }
    }
}

impl Default for RiskTablesConfig {
    fn default() -> Self {
        let mut elements = BTreeMap::new();
        elements.insert(
            "business-process".to_string(),
            strings(&[
                "Process efficiency",
                "Business continuity",
                "Compliance requirements",
                "Resource allocation",
            ]),
        );
        elements.insert(
            "application-component".to_string(),
            strings(&[
                "Technical debt",
                "Scalability limitations",
                "Integration complexity",
                "Maintenance overhead",
            ]),
        );
        elements.insert(
            "technology-service".to_string(),
            strings(&[
                "Service availability",
                "Performance bottlenecks",
                "Security vulnerabilities",
                "Infrastructure dependencies",
            ]),
        );

        let mut relationships = BTreeMap::new();
        relationships.insert(
            "serving".to_string(),
            strings(&[
                "Service dependency on provider availability",
                "Interface contract drift between consumer and provider",
            ]),
        );
        relationships.insert(
            "realization".to_string(),
            strings(&[
                "Implementation gap between design and realization",
                "Traceability loss across layer boundaries",
            ]),
        );
        relationships.insert(
            "assignment".to_string(),
            strings(&[
                "Responsibility overload on assigned resource",
                "Access rights drift for assigned actors",
            ]),
        );

        Self {
            elements,
            relationships,
        }
    }
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule {
                    category: "architecture".to_string(),
                    keywords: strings(&["layer", "dependency", "coupling"]),
                    suggestions: strings(&[
                        "Review and optimize layer dependencies",
                        "Consider implementing microservices",
                        "Introduce facades to reduce coupling between components",
                        "Break circular dependencies with events or dependency inversion",
                    ]),
                },
                CategoryRule {
                    category: "integration".to_string(),
                    keywords: strings(&["interface", "connection", "relationship"]),
                    suggestions: strings(&[
                        "Standardize interfaces with explicit contracts",
                        "Introduce an integration layer or API gateway",
                        "Document relationship ownership and versioning",
                    ]),
                },
                CategoryRule {
                    category: "security".to_string(),
                    keywords: strings(&["security", "vulnerability", "access"]),
                    suggestions: strings(&[
                        "Strengthen security measures",
                        "Perform regular vulnerability assessments",
                        "Apply least-privilege access control",
                    ]),
                },
                CategoryRule {
                    category: "performance".to_string(),
                    keywords: strings(&["performance", "scalability", "efficiency"]),
                    suggestions: strings(&[
                        "Improve scalability",
                        "Identify and remove performance bottlenecks",
                        "Introduce caching and load balancing where appropriate",
                    ]),
                },
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_suffix: "_analysis.json".to_string(),
            layers_suffix: "_layers.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            layers: LayersConfig::default(),
            risks: RiskTablesConfig::default(),
            recommendations: RecommendationsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ArchlensError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ArchlensError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = ["Archlens.toml", "archlens.toml", ".archlens.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_round_trip_keeps_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archlens.toml");

        let mut config = Config::default();
        config.analysis.coupling_threshold = 8;
        config.analysis.lookup_policy = LookupPolicy::Fail;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.analysis.coupling_threshold, 8);
        assert_eq!(loaded.analysis.lookup_policy, LookupPolicy::Fail);
        assert_eq!(loaded.recommendations.rules, config.recommendations.rules);
        assert_eq!(loaded.risks.elements["business-process"].len(), 4);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archlens.toml");
        std::fs::write(&path, "[analysis]\ncoupling_threshold = 2\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.analysis.coupling_threshold, 2);
        assert_eq!(loaded.analysis.max_layer_gap, 1);
        assert_eq!(loaded.recommendations.rules.len(), 4);
        assert_eq!(loaded.layers.technology[0], "node");
    }

    #[test]
    fn test_missing_explicit_path_uses_default() {
        let config = Config::load_or_default(Some("does/not/exist.toml")).unwrap();
        assert_eq!(config.analysis.coupling_threshold, 5);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archlens.toml");
        std::fs::write(&path, "analysis = [[[").unwrap();

        assert!(matches!(Config::load(&path), Err(ArchlensError::Config(_))));
    }
}
