//! Remote text generation over the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::AnalysisError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

pub trait GenerativeModel {
    fn model_name(&self) -> &str;

    fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AnalysisError> {
        if config.api_key.trim().is_empty() {
            return Err(AnalysisError::MissingCredential);
        }

        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(config.timeout)
            .user_agent(concat!("actcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        generate_endpoint(&self.config.base_url, &self.config.model)
    }
}

impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!(status = status.as_u16(), bytes = body.len(), "model responded");

        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response_text(&body, &self.config.model)
    }
}

fn generate_endpoint(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn response_text(body: &str, model: &str) -> Result<String, AnalysisError> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse {
            model: model.to_string(),
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn endpoint_joins_base_url_and_model() {
        assert_eq!(
            generate_endpoint("http://localhost:8080/", "gemini-test"),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn request_body_matches_generate_content_layout() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
        );
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body = r#"{
          "candidates": [
            {"content": {"parts": [{"text": "```json\n{"}, {"text": "}\n```"}], "role": "model"}},
            {"content": {"parts": [{"text": "ignored"}]}}
          ],
          "usageMetadata": {"promptTokenCount": 10}
        }"#;

        let text = response_text(body, "gemini-test").expect("text");
        assert_eq!(text, "```json\n{}\n```");
    }

    #[test]
    fn response_without_candidates_is_empty_response() {
        let err = response_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#, "gemini-test")
            .expect_err("no candidates");
        assert!(matches!(err, AnalysisError::EmptyResponse { .. }));
        assert_eq!(err.kind(), "network");
    }

    #[test]
    fn non_json_body_is_parse_error() {
        let err = response_text("<html>bad gateway</html>", "gemini-test").expect_err("html");
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn blank_api_key_is_rejected_before_any_request() {
        let err = GeminiClient::new(config("   ")).expect_err("blank key");
        assert!(matches!(err, AnalysisError::MissingCredential));
    }

    #[test]
    fn client_reports_configured_model() {
        let client = GeminiClient::new(config("test-key")).expect("client");
        assert_eq!(client.model_name(), DEFAULT_MODEL);
        assert!(client.endpoint().ends_with(":generateContent"));
    }
}
