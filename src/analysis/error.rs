#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("API key is required: pass --api-key or set GEMINI_API_KEY")]
    MissingCredential,

    #[error("error reading PDF: {0}")]
    Extraction(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty response from {model}")]
    EmptyResponse { model: String },

    #[error("JSON parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected result shape: {0}")]
    Shape(String),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "credential",
            Self::Extraction(_) => "extraction",
            Self::Network(_) | Self::Api { .. } | Self::EmptyResponse { .. } => "network",
            Self::Parse(_) => "parse",
            Self::Shape(_) => "shape",
        }
    }
}
