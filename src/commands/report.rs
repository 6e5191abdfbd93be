use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ReportArgs;
use crate::model::{AnalysisReport, AnalysisResult, RuleStatus};

pub fn run(args: ReportArgs) -> Result<()> {
    let report = load_report(&args.input)?;
    info!(path = %args.input.display(), "loaded analysis report");

    if let Some(error) = report.outcome.error() {
        warn!(error = %error, "report holds a failed analysis");
    }

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{rendered}");
    } else {
        print!("{}", render_report(&report));
    }

    Ok(())
}

pub fn load_report(path: &Path) -> Result<AnalysisReport> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    if let Some(metadata) = &report.metadata {
        let _ = writeln!(out, "Source: {} ({})", metadata.source, metadata.model);
        let _ = writeln!(
            out,
            "Generated: {}  |  {} chars{}",
            metadata.generated_at,
            metadata.document_chars,
            if metadata.truncated {
                " (truncated for prompt)"
            } else {
                ""
            }
        );
        out.push('\n');
    }

    match report.outcome.result() {
        Some(result) => render_result(&mut out, result),
        None => {
            let error = report.outcome.error().unwrap_or_default();
            let message = error.trim_start_matches("Analysis failed: ");
            let _ = writeln!(out, "Analysis failed: {message}");
        }
    }

    out
}

fn render_result(out: &mut String, result: &AnalysisResult) {
    let _ = writeln!(out, "== Executive Summary ==");
    if result.summary.is_empty() {
        let _ = writeln!(out, "No summary available.");
    }
    for (index, point) in result.summary.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, point);
    }

    let _ = writeln!(out, "\n== Key Sections ==");
    for (key, value) in result.sections.entries() {
        let _ = writeln!(out, "[{}]", section_title(key));
        if value.trim().is_empty() {
            let _ = writeln!(out, "  (not found)");
            continue;
        }
        for line in value.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    let score = result.compliance_score();
    let _ = writeln!(
        out,
        "\n== Rule Validation ==\nCompliance score: {} ({:.0}%)",
        score,
        score.ratio() * 100.0
    );
    for check in &result.rules_analysis {
        let marker = match check.status {
            RuleStatus::Pass => "PASS",
            RuleStatus::Fail => "FAIL",
        };
        let _ = writeln!(
            out,
            "[{marker}] {} (confidence {}%)",
            check.rule, check.confidence
        );
        let evidence = if check.evidence.trim().is_empty() {
            "No specific evidence found in text."
        } else {
            check.evidence.as_str()
        };
        let _ = writeln!(out, "       evidence: {evidence}");
    }
}

/// `record_keeping` -> `Record Keeping`
fn section_title(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut characters = word.chars();
            match characters.next() {
                Some(first) => first.to_uppercase().chain(characters).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
