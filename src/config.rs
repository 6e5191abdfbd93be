use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::analysis::AnalysisError;
use crate::cli::AnalyzeArgs;
use crate::llm::GeminiConfig;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CredentialSource {
    Flag,
    Environment,
    EnvFile,
}

impl CredentialSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Environment => "environment",
            Self::EnvFile => "env_file",
        }
    }
}

pub fn resolve_api_key(
    args: &AnalyzeArgs,
) -> std::result::Result<(String, CredentialSource), AnalysisError> {
    let env_file_value = match &args.env_file {
        Some(path) => read_env_file_key(path, true),
        None => read_env_file_key(Path::new(DEFAULT_ENV_FILE), false),
    }
    .unwrap_or_else(|err| {
        warn!(error = %format!("{err:#}"), "ignoring unreadable env file");
        None
    });

    let (key, source) = select_api_key(
        args.api_key.as_deref(),
        std::env::var(API_KEY_ENV).ok(),
        env_file_value,
    )?;
    debug!(source = source.as_str(), "resolved API credential");
    Ok((key, source))
}

fn select_api_key(
    flag: Option<&str>,
    environment: Option<String>,
    env_file: Option<String>,
) -> std::result::Result<(String, CredentialSource), AnalysisError> {
    let candidates = [
        (flag.map(str::to_string), CredentialSource::Flag),
        (environment, CredentialSource::Environment),
        (env_file, CredentialSource::EnvFile),
    ];

    candidates
        .into_iter()
        .find_map(|(value, source)| {
            value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| (value, source))
        })
        .ok_or(AnalysisError::MissingCredential)
}

fn read_env_file_key(path: &Path, required: bool) -> Result<Option<String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(err) if err.not_found() && !required => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    for entry in entries {
        let (name, value) =
            entry.with_context(|| format!("failed to parse {}", path.display()))?;
        if name == API_KEY_ENV {
            return Ok(Some(value));
        }
    }

    Ok(None)
}

pub fn gemini_config(args: &AnalyzeArgs, api_key: String) -> GeminiConfig {
    GeminiConfig {
        api_key,
        model: args.model.clone(),
        base_url: args.base_url.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn flag_wins_over_environment_and_env_file() {
        let (key, source) = select_api_key(
            Some("from-flag"),
            Some("from-env".to_string()),
            Some("from-file".to_string()),
        )
        .expect("key");
        assert_eq!(key, "from-flag");
        assert_eq!(source, CredentialSource::Flag);
    }

    #[test]
    fn blank_values_fall_through_to_next_source() {
        let (key, source) = select_api_key(
            Some("  "),
            Some(String::new()),
            Some(" from-file \n".to_string()),
        )
        .expect("key");
        assert_eq!(key, "from-file");
        assert_eq!(source, CredentialSource::EnvFile);
    }

    #[test]
    fn missing_everywhere_is_credential_error() {
        let err = select_api_key(None, None, None).expect_err("no key");
        assert!(matches!(err, AnalysisError::MissingCredential));
        assert_eq!(err.kind(), "credential");
    }

    #[test]
    fn env_file_value_is_read_without_touching_process_environment() {
        let mut file = tempfile::NamedTempFile::new().expect("temp env file");
        writeln!(file, "# local secrets").expect("write");
        writeln!(file, "OTHER_SETTING=1").expect("write");
        writeln!(file, "{API_KEY_ENV}=file-key").expect("write");

        let value = read_env_file_key(file.path(), true).expect("read env file");
        assert_eq!(value.as_deref(), Some("file-key"));
    }

    #[test]
    fn optional_env_file_may_be_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join(".env");

        assert_eq!(read_env_file_key(&missing, false).expect("optional"), None);
        assert!(read_env_file_key(&missing, true).is_err());
    }
}
