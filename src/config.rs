use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "TestForge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Folder scanned for documentation when none is given.
pub const DEFAULT_DOCS_DIR: &str = "Documentações";

/// Directory that receives one CSV file per sheet.
pub const DEFAULT_OUTPUT_DIR: &str = "cenarios_de_teste";

/// Character budget applied to the outbound prompt.
pub const DEFAULT_PROMPT_MAX_CHARS: usize = 15_000;

/// Sheet names are capped at 31 characters by the spreadsheet format.
pub const DEFAULT_MAX_SHEET_NAME_LEN: usize = 31;

/// HTTP timeout for a single generation request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter(debug: bool) -> &'static str {
    if debug {
        "testforge=debug,testforge_lib=debug"
    } else {
        "testforge=info,testforge_lib=info"
    }
}

/// Which generation service backs the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    /// Google Gemini `generateContent`
    Gemini,
    /// OpenAI-compatible chat completions
    Openai,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => DEFAULT_GEMINI_MODEL,
            Provider::Openai => DEFAULT_OPENAI_MODEL,
        }
    }

    /// Provider-specific environment variable consulted after `TESTFORGE_API_KEY`.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Openai => "OPENAI_API_KEY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Openai => "openai",
        }
    }
}

/// Fully resolved settings for one batch run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub docs_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Where raw model responses are preserved for manual inspection.
    pub raw_dir: PathBuf,
    pub provider: Provider,
    pub model: String,
    /// `None` switches the run to the offline heuristic generator.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub prompt_max_chars: usize,
    pub max_sheet_name_len: usize,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            raw_dir: PathBuf::from("."),
            provider: Provider::Gemini,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            prompt_max_chars: DEFAULT_PROMPT_MAX_CHARS,
            max_sheet_name_len: DEFAULT_MAX_SHEET_NAME_LEN,
            debug: false,
        }
    }
}

impl Settings {
    pub fn is_offline(&self) -> bool {
        self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
    }
}

/// Resolve the API key: explicit value first, then the provider's own variable.
pub fn resolve_api_key(explicit: Option<String>, provider: Provider) -> Option<String> {
    explicit
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(provider.key_env_var()).ok())
        .filter(|k| !k.trim().is_empty())
}
