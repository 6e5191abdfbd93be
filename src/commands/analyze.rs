use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::analysis::{AnalysisError, Analyzer, build_prompt};
use crate::cli::{AnalyzeArgs, ExtractBackend};
use crate::commands::extract::extract_document;
use crate::commands::report::render_report;
use crate::config::{gemini_config, resolve_api_key};
use crate::llm::{GeminiClient, GenerativeModel};
use crate::model::{AnalysisOutcome, AnalysisReport, AnalysisResult, ReportMetadata};
use crate::pdf::{DocumentText, PdfInput};
use crate::util::{now_utc_string, sha256_bytes, write_json_pretty};

#[derive(Debug)]
struct AnalysisRun {
    result: AnalysisResult,
    metadata: ReportMetadata,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let run = match execute(&args) {
        Ok(run) => run,
        Err(err) => {
            let kind = err.kind();
            let outcome = AnalysisOutcome::from(Err::<AnalysisResult, _>(err));
            let rendered = serde_json::to_string_pretty(&outcome)
                .context("failed to serialize error outcome")?;
            println!("{rendered}");
            bail!("analysis failed ({kind}); no report written");
        }
    };

    let report = build_report(run, args.with_metadata);
    write_json_pretty(&args.output, &report)?;
    info!(path = %args.output.display(), "wrote analysis report");

    if !args.quiet {
        print!("{}", render_report(&report));
    }

    Ok(())
}

fn execute(args: &AnalyzeArgs) -> Result<AnalysisRun, AnalysisError> {
    let (api_key, _) = resolve_api_key(args)?;

    let (input, document) = extract_document(&args.source)
        .map_err(|err| AnalysisError::Extraction(format!("{err:#}")))?;

    let client = GeminiClient::new(gemini_config(args, api_key))?;
    let analyzer = Analyzer::new(client).strict(args.strict);

    analyze_document(&analyzer, &input, &document, args.source.backend)
}

fn analyze_document<M: GenerativeModel>(
    analyzer: &Analyzer<M>,
    input: &PdfInput,
    document: &DocumentText,
    backend: ExtractBackend,
) -> Result<AnalysisRun, AnalysisError> {
    if document.text.trim().is_empty() {
        warn!(source = %input.label(), "no text extracted; sending empty document");
    }

    let prompt = build_prompt(&document.text);
    let result = analyzer.analyze(&prompt)?;

    let score = result.compliance_score();
    info!(
        summary_points = result.summary.len(),
        rule_checks = result.rules_analysis.len(),
        compliance = %score,
        "analysis complete"
    );

    Ok(AnalysisRun {
        result,
        metadata: ReportMetadata {
            generated_at: now_utc_string(),
            source: input.label(),
            source_sha256: sha256_bytes(&input.bytes),
            model: analyzer.model_name().to_string(),
            extract_backend: backend.as_str().to_string(),
            document_chars: prompt.document_chars,
            prompt_chars: prompt.char_count(),
            truncated: prompt.truncated,
            normalize: document.stats.clone(),
        },
    })
}

fn build_report(run: AnalysisRun, with_metadata: bool) -> AnalysisReport {
    AnalysisReport {
        metadata: with_metadata.then_some(run.metadata),
        outcome: AnalysisOutcome::Completed(run.result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RULES;
    use crate::commands::report::load_report;
    use crate::pdf::normalize_pages;

    struct FixedReply(String);

    impl GenerativeModel for FixedReply {
        fn model_name(&self) -> &str {
            "fixed"
        }

        fn generate(&self, _prompt: &str) -> Result<String, AnalysisError> {
            Ok(self.0.clone())
        }
    }

    fn reply() -> String {
        let checks = RULES
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "rule": rule,
                    "status": "Pass",
                    "evidence": "Part 1",
                    "confidence": 90
                })
            })
            .collect::<Vec<_>>();
        let body = serde_json::json!({
            "summary": ["Replaces legacy benefits"],
            "sections": { "payments": "Monthly assessment periods" },
            "rules_analysis": checks,
        });
        format!("```json\n{body}\n```")
    }

    fn input() -> PdfInput {
        PdfInput::from_bytes(b"%PDF-1.7 fixture".to_vec())
    }

    #[test]
    fn analyze_document_records_metadata() {
        let analyzer = Analyzer::new(FixedReply(reply()));
        let document = normalize_pages(&["Universal Credit Act 2025 (c. 22)\n1\nPart 1"])
            .expect("normalize");

        let run = analyze_document(&analyzer, &input(), &document, ExtractBackend::Native)
            .expect("analysis");

        assert_eq!(run.result.rules_analysis.len(), 6);
        assert_eq!(run.metadata.model, "fixed");
        assert_eq!(run.metadata.source, "<memory>");
        assert_eq!(run.metadata.extract_backend, "native");
        assert_eq!(run.metadata.document_chars, "Part 1".len());
        assert!(!run.metadata.truncated);
        assert_eq!(run.metadata.normalize.header_spans_removed, 1);
        assert_eq!(run.metadata.source_sha256, sha256_bytes(b"%PDF-1.7 fixture"));
    }

    #[test]
    fn analyze_document_propagates_parse_failure() {
        let analyzer = Analyzer::new(FixedReply("not valid json".to_string()));
        let document = normalize_pages(&["text"]).expect("normalize");

        let err = analyze_document(&analyzer, &input(), &document, ExtractBackend::Native)
            .expect_err("parse failure");
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn report_without_metadata_is_plain_result_json() {
        let analyzer = Analyzer::new(FixedReply(reply()));
        let document = normalize_pages(&["text"]).expect("normalize");
        let run = analyze_document(&analyzer, &input(), &document, ExtractBackend::Native)
            .expect("analysis");

        let report = build_report(run, false);
        let value = serde_json::to_value(&report).expect("serialize");
        let mut keys = value
            .as_object()
            .expect("object")
            .keys()
            .cloned()
            .collect::<Vec<String>>();
        keys.sort();
        assert_eq!(keys, vec!["rules_analysis", "sections", "summary"]);
        assert_eq!(value["rules_analysis"][0]["status"], "pass");
    }

    #[test]
    fn report_with_metadata_round_trips_through_disk() {
        let analyzer = Analyzer::new(FixedReply(reply()));
        let document = normalize_pages(&["text"]).expect("normalize");
        let run = analyze_document(&analyzer, &input(), &document, ExtractBackend::Pdftotext)
            .expect("analysis");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("final_report.json");
        write_json_pretty(&path, &build_report(run, true)).expect("write report");

        let loaded = load_report(&path).expect("load report");
        let metadata = loaded.metadata.expect("metadata");
        assert_eq!(metadata.extract_backend, "pdftotext");
        let result = loaded.outcome.result().expect("completed");
        assert_eq!(result.sections.payments, "Monthly assessment periods");
        assert_eq!(result.compliance_score().to_string(), "6/6");
    }
}
