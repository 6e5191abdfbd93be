use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Parser, Debug)]
#[command(
    name = "actcheck",
    version,
    about = "Summarise UK Acts of Parliament and check them against compliance rules"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Analyze(AnalyzeArgs),
    Report(ReportArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExtractBackend {
    Native,
    Pdftotext,
}

impl ExtractBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Pdftotext => "pdftotext",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(long)]
    pub pdf: PathBuf,

    #[arg(long, value_enum, default_value_t = ExtractBackend::Native)]
    pub backend: ExtractBackend,

    #[arg(long, default_value_t = 200 * 1024 * 1024)]
    pub max_bytes: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    #[arg(long)]
    pub env_file: Option<PathBuf>,

    #[arg(long, default_value = "final_report.json")]
    pub output: PathBuf,

    #[arg(long, default_value_t = false)]
    pub strict: bool,

    #[arg(long, default_value_t = false)]
    pub with_metadata: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(long, default_value = "final_report.json")]
    pub input: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
