use serde::{Deserialize, Serialize};

use super::llm::{build_http_client, map_send_error, LlmClient};
use super::StructuringError;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent` REST client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        base_url: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, StructuringError> {
        Ok(Self {
            base_url: base_url
                .unwrap_or(GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            client: build_http_client(timeout_secs)?,
            timeout_secs,
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, system: &'a str) -> Self {
        let system_instruction = (!system.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part { text: system }],
        });
        Self {
            system_instruction,
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenated text of the first candidate; empty when the model returned nothing.
fn candidate_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

impl LlmClient for GeminiClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError> {
        let body = GenerateContentRequest::new(prompt, system);

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        Ok(candidate_text(parsed))
    }

    fn provider(&self) -> &'static str {
        "gemini"
    }
}
