use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::CategoryRule;
use crate::error::{ArchlensError, Result};

/// Suggestions for one category of risks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub risks: Vec<String>,
    pub suggestions: Vec<String>,
}

/// A category rule with its keywords compiled into one case-insensitive matcher
#[derive(Debug, Clone)]
struct CompiledRule {
    category: String,
    /// `None` when the rule has no keywords and can never match
    matcher: Option<Regex>,
    suggestions: Vec<String>,
}

/// Groups risks into categories by keyword and attaches fixed suggestions
#[derive(Debug, Clone)]
pub struct RecommendationGenerator {
    rules: Vec<CompiledRule>,
}

impl RecommendationGenerator {
    pub fn new(rules: &[CategoryRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let keywords: Vec<String> = rule
                    .keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .map(|k| regex::escape(k))
                    .collect();

                let matcher = if keywords.is_empty() {
                    None
                } else {
                    let pattern = keywords.join("|");
                    Some(
                        RegexBuilder::new(&pattern)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| {
                                ArchlensError::Config(format!(
                                    "Invalid keywords for category {}: {}",
                                    rule.category, e
                                ))
                            })?,
                    )
                };

                Ok(CompiledRule {
                    category: rule.category.clone(),
                    matcher,
                    suggestions: rule.suggestions.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Category of a risk under first-match-wins, if any rule matches
    pub fn categorize(&self, risk: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.as_ref().is_some_and(|m| m.is_match(risk)))
            .map(|rule| rule.category.as_str())
    }

    /// One recommendation per category that matched at least one risk, in rule order
    pub fn recommend(&self, risks: &[String]) -> Vec<Recommendation> {
        let mut matched: Vec<Vec<String>> = vec![Vec::new(); self.rules.len()];

        for risk in risks {
            let position = self
                .rules
                .iter()
                .position(|rule| rule.matcher.as_ref().is_some_and(|m| m.is_match(risk)));
            if let Some(position) = position {
                matched[position].push(risk.clone());
            }
        }

        self.rules
            .iter()
            .zip(matched)
            .filter(|(_, risks)| !risks.is_empty())
            .map(|(rule, risks)| Recommendation {
                category: rule.category.clone(),
                risks,
                suggestions: rule.suggestions.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecommendationsConfig;

    fn generator() -> RecommendationGenerator {
        RecommendationGenerator::new(&RecommendationsConfig::default().rules).unwrap()
    }

    fn risks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_matching_category_wins() {
        let generator = generator();

        assert_eq!(
            generator.categorize("Layer misalignment with security access"),
            Some("architecture")
        );
        assert_eq!(generator.categorize("Interface ACCESS token"), Some("integration"));
        assert_eq!(generator.categorize("Security vulnerabilities"), Some("security"));
        assert_eq!(generator.categorize("Scalability limitations"), Some("performance"));
        assert_eq!(generator.categorize("Business continuity"), None);
    }

    #[test]
    fn test_only_non_empty_categories_are_emitted() {
        let recommendations = generator().recommend(&risks(&[
            "Performance bottlenecks",
            "Business continuity",
            "High coupling: Hub has 6 dependencies (threshold 5)",
            "Process efficiency",
        ]));

        let categories: Vec<_> = recommendations.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["architecture", "performance"]);
        assert_eq!(
            recommendations[1].risks,
            vec!["Performance bottlenecks", "Process efficiency"]
        );
        assert_eq!(recommendations[0].suggestions[0], "Review and optimize layer dependencies");
    }

    #[test]
    fn test_no_risks_no_recommendations() {
        assert!(generator().recommend(&[]).is_empty());
        assert!(generator().recommend(&risks(&["Technical debt"])).is_empty());
    }

    #[test]
    fn test_duplicate_risks_are_kept() {
        let recommendations = generator().recommend(&risks(&["Security vulnerabilities", "Security vulnerabilities"]));
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].risks.len(), 2);
    }

    #[test]
    fn test_keywords_are_matched_literally() {
        let rules = vec![CategoryRule {
            category: "odd".to_string(),
            keywords: vec!["a.b".to_string(), String::new()],
            suggestions: vec!["Check it".to_string()],
        }];
        let generator = RecommendationGenerator::new(&rules).unwrap();

        assert_eq!(generator.categorize("contains A.B here"), Some("odd"));
        assert_eq!(generator.categorize("contains axb here"), None);
    }

    #[test]
    fn test_rule_without_keywords_never_matches() {
        let rules = vec![CategoryRule {
            category: "empty".to_string(),
            keywords: vec![],
            suggestions: vec![],
        }];
        let generator = RecommendationGenerator::new(&rules).unwrap();
        assert!(generator.recommend(&risks(&["anything"])).is_empty());
    }
}
