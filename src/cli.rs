use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, Provider, Settings};

#[derive(Parser, Debug)]
#[command(name = "testforge", version)]
#[command(about = "Generate test-case spreadsheets from requirement documents")]
pub struct Args {
    /// Folder with the .docx, .pdf and .txt documents to analyse
    #[arg(long, default_value = config::DEFAULT_DOCS_DIR)]
    pub docs_dir: PathBuf,

    /// Directory that receives one CSV file per sheet
    #[arg(long, default_value = config::DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Where raw model responses are preserved
    #[arg(long, default_value = ".")]
    pub raw_dir: PathBuf,

    /// Generation service
    #[arg(long, value_enum, default_value = "gemini")]
    pub provider: Provider,

    /// Model name (default depends on the provider)
    #[arg(long)]
    pub model: Option<String>,

    /// API key; falls back to GEMINI_API_KEY or OPENAI_API_KEY for the chosen provider
    #[arg(long, env = "TESTFORGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the provider's base URL (proxies, compatible servers)
    #[arg(long)]
    pub base_url: Option<String>,

    /// HTTP timeout per document, in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Character budget of the prompt sent per document
    #[arg(long, default_value_t = config::DEFAULT_PROMPT_MAX_CHARS)]
    pub prompt_max_chars: usize,

    /// Maximum sheet name length
    #[arg(long, default_value_t = config::DEFAULT_MAX_SHEET_NAME_LEN)]
    pub max_sheet_name_len: usize,

    /// Skip the model and generate basic scenarios from the text
    #[arg(long)]
    pub offline: bool,

    /// Verbose logs plus prompt and record dumps
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    pub fn into_settings(self) -> Settings {
        let api_key = if self.offline {
            None
        } else {
            config::resolve_api_key(self.api_key, self.provider)
        };

        Settings {
            docs_dir: self.docs_dir,
            output_dir: self.output_dir,
            raw_dir: self.raw_dir,
            model: self
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| self.provider.default_model().to_string()),
            provider: self.provider,
            api_key,
            base_url: self.base_url,
            timeout_secs: self.timeout_secs,
            prompt_max_chars: self.prompt_max_chars,
            max_sheet_name_len: self.max_sheet_name_len,
            debug: self.debug,
        }
    }
}
