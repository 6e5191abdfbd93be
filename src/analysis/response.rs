use crate::analysis::{AnalysisError, RULES};
use crate::model::AnalysisResult;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

pub fn strip_json_fence(raw: &str) -> &str {
    let inner = if let Some((_, rest)) = raw.split_once(JSON_FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else if let Some((_, rest)) = raw.split_once(FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else {
        raw
    };

    inner.trim()
}

pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let payload = strip_json_fence(raw);
    Ok(serde_json::from_str::<AnalysisResult>(payload)?)
}

pub fn shape_issues(result: &AnalysisResult) -> Vec<String> {
    let mut issues = Vec::new();

    if result.rules_analysis.len() != RULES.len() {
        issues.push(format!(
            "expected {} rule checks, got {}",
            RULES.len(),
            result.rules_analysis.len()
        ));
    }

    for (index, check) in result.rules_analysis.iter().enumerate() {
        if !(0..=100).contains(&check.confidence) {
            issues.push(format!(
                "rule check {} has confidence {} outside 0-100",
                index + 1,
                check.confidence
            ));
        }
    }

    if result.summary.is_empty() {
        issues.push("summary is empty".to_string());
    }

    if result.sections.is_empty() {
        issues.push("no sections extracted".to_string());
    }

    issues
}
