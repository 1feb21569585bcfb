use serde::{Deserialize, Serialize};

use super::llm::{build_http_client, map_send_error, LlmClient};
use super::StructuringError;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

const TEMPERATURE: f32 = 0.7;

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(
        api_key: &str,
        base_url: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, StructuringError> {
        Ok(Self {
            base_url: base_url
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            client: build_http_client(timeout_secs)?,
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, prompt: &'a str, system: &'a str) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system.trim().is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        Self {
            model,
            messages,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn first_choice_text(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default()
}

impl LlmClient for OpenAiClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError> {
        let body = ChatRequest::new(model, prompt, system);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
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

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        Ok(first_choice_text(parsed))
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let client = OpenAiClient::new("k", Some("http://localhost:8080/"), 10).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn default_base_url() {
        let client = OpenAiClient::new("k", None, 10).unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn request_has_system_then_user() {
        let body = serde_json::to_value(ChatRequest::new("gpt-4o-mini", "gerar", "QA")).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "gerar");
    }

    #[test]
    fn blank_system_message_is_skipped() {
        let body = serde_json::to_value(ChatRequest::new("m", "p", "")).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn first_choice_content_is_returned() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{}"}}, {"message": {"content": "x"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(parsed), "{}");
    }

    #[test]
    fn null_content_is_empty() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(first_choice_text(parsed), "");
    }
}
