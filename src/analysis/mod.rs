mod error;
mod prompt;
mod response;

pub use error::AnalysisError;
pub use prompt::{MAX_DOCUMENT_CHARS, Prompt, RULES, build_prompt};
pub use response::{parse_analysis, shape_issues};

use tracing::{info, warn};

use crate::llm::GenerativeModel;
use crate::model::AnalysisResult;

pub struct Analyzer<M> {
    model: M,
    strict: bool,
}

impl<M: GenerativeModel> Analyzer<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn analyze(&self, prompt: &Prompt) -> Result<AnalysisResult, AnalysisError> {
        if prompt.truncated {
            warn!(
                document_chars = prompt.document_chars,
                limit = MAX_DOCUMENT_CHARS,
                "document text truncated before prompting"
            );
        }

        info!(
            model = self.model.model_name(),
            prompt_chars = prompt.char_count(),
            "sending document to model"
        );
        let raw = self.model.generate(&prompt.text)?;
        let result = parse_analysis(&raw)?;

        let issues = shape_issues(&result);
        if !issues.is_empty() {
            if self.strict {
                return Err(AnalysisError::Shape(issues.join("; ")));
            }
            for issue in &issues {
                warn!(issue = %issue, "model result departs from expected shape");
            }
        }

        Ok(result)
    }
}
