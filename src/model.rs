use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::AnalysisError;
use crate::pdf::NormalizeStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub sections: Sections,
    #[serde(default)]
    pub rules_analysis: Vec<RuleCheck>,
}

impl AnalysisResult {
    pub fn compliance_score(&self) -> ComplianceScore {
        ComplianceScore {
            passed: self
                .rules_analysis
                .iter()
                .filter(|check| check.status == RuleStatus::Pass)
                .count(),
            total: self.rules_analysis.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(default)]
    pub definitions: String,
    #[serde(default)]
    pub obligations: String,
    #[serde(default)]
    pub responsibilities: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default)]
    pub payments: String,
    #[serde(default)]
    pub penalties: String,
    #[serde(default)]
    pub record_keeping: String,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, value)| value.trim().is_empty())
    }

    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("definitions", &self.definitions),
            ("obligations", &self.obligations),
            ("responsibilities", &self.responsibilities),
            ("eligibility", &self.eligibility),
            ("payments", &self.payments),
            ("penalties", &self.penalties),
            ("record_keeping", &self.record_keeping),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub rule: String,
    pub status: RuleStatus,
    #[serde(default)]
    pub evidence: String,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: i64,
}

// Models sometimes write `85.0` or `85.5`; any finite number is rounded.
fn deserialize_confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "confidence must be a finite number, got {value}"
        )));
    }
    Ok(value.round() as i64)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RuleStatus {
    Pass,
    Fail,
}

impl RuleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("rule status must be pass or fail, got '{raw}'"))
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ComplianceScore {
    pub passed: usize,
    pub total: usize,
}

impl ComplianceScore {
    pub fn ratio(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

impl fmt::Display for ComplianceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.passed, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Failed { error: String },
    Completed(AnalysisResult),
}

impl AnalysisOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Completed(_) => None,
        }
    }
}

impl From<Result<AnalysisResult, AnalysisError>> for AnalysisOutcome {
    fn from(value: Result<AnalysisResult, AnalysisError>) -> Self {
        match value {
            Ok(result) => Self::Completed(result),
            Err(err) => Self::Failed {
                error: format!("Analysis failed: {err}"),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub source: String,
    pub source_sha256: String,
    pub model: String,
    pub extract_backend: String,
    pub document_chars: usize,
    pub prompt_chars: usize,
    pub truncated: bool,
    pub normalize: NormalizeStats,
}

/// On-disk report. Metadata is optional so a bare outcome file loads too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
}
