use super::StructuringError;

/// Text generation backend. One blocking call per document.
pub trait LlmClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError>;

    /// Short provider label for logs.
    fn provider(&self) -> &'static str;
}

/// Mock LLM client for testing. Returns the same response for every call.
pub struct MockLlmClient {
    response: String,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        _model: &str,
        _prompt: &str,
        _system: &str,
    ) -> Result<String, StructuringError> {
        Ok(self.response.clone())
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}

impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError> {
        (**self).generate(model, prompt, system)
    }

    fn provider(&self) -> &'static str {
        (**self).provider()
    }
}

/// Shared mapping of transport failures onto `StructuringError`.
pub(crate) fn map_send_error(
    e: reqwest::Error,
    base_url: &str,
    timeout_secs: u64,
) -> StructuringError {
    if e.is_connect() {
        StructuringError::ServiceConnection(base_url.to_string())
    } else if e.is_timeout() {
        StructuringError::HttpClient(format!("Request timed out after {timeout_secs}s"))
    } else {
        StructuringError::HttpClient(e.to_string())
    }
}

pub(crate) fn build_http_client(
    timeout_secs: u64,
) -> Result<reqwest::blocking::Client, StructuringError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| StructuringError::HttpClient(e.to_string()))
}
