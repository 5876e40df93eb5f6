use super::AnalysisReport;

/// Elements with more risks than this are called out as high risk
pub const HIGH_RISK_THRESHOLD: usize = 2;

/// How many suggestions per recommendation the summary shows
const TOP_SUGGESTIONS: usize = 2;

/// Risk counts grouped by the text before the first ':' ("Other" when there is none),
/// in order of first appearance
pub fn risk_categories(report: &AnalysisReport) -> Vec<(String, usize)> {
    let mut categories: Vec<(String, usize)> = Vec::new();

    for risk in &report.risks {
        let category = risk
            .split_once(':')
            .map(|(prefix, _)| prefix.trim())
            .unwrap_or("Other");

        match categories.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => categories.push((category.to_string(), 1)),
        }
    }

    categories
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human-readable summary of a report
pub fn render_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("\n=== Architecture Analysis Summary ===\n");

    out.push_str("\nElement Analysis:\n");
    out.push_str(&format!("Total Elements: {}\n", report.elements.len()));
    out.push_str(&format!(
        "High Risk Elements: {}\n",
        report.high_risk_elements(HIGH_RISK_THRESHOLD).count()
    ));
    out.push_str(&format!("Total Relationships: {}\n", report.relationships.len()));

    out.push_str("\nLayer Analysis:\n");
    for (layer, stats) in report.layers.iter() {
        out.push_str(&format!("{} Layer:\n", capitalize(layer.as_str())));
        out.push_str(&format!("  Elements: {}\n", stats.elements));
        out.push_str(&format!("  Dependencies: {}\n", stats.dependencies));
    }

    out.push_str("\nTop Risks:\n");
    for (category, count) in risk_categories(report) {
        out.push_str(&format!("{}: {} risks\n", category, count));
    }

    out.push_str("\nKey Recommendations:\n");
    for (i, recommendation) in report.recommendations.iter().enumerate() {
        out.push_str(&format!("\n{}. {}:\n", i + 1, capitalize(&recommendation.category)));
        for suggestion in recommendation.suggestions.iter().take(TOP_SUGGESTIONS) {
            out.push_str(&format!("   - {}\n", suggestion));
        }
    }

    out
}
