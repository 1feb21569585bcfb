use chrono::NaiveDate;

use super::aggregate::{aggregate, AggregatedRow};
use super::fallback::offline_response;
use super::gemini::GeminiClient;
use super::llm::LlmClient;
use super::openai::OpenAiClient;
use super::parser::parse_model_response;
use super::payload::PayloadKind;
use super::prompt::{build_prompt, QA_SYSTEM_PROMPT};
use super::schema::{apply_metadata_defaults, normalize, NormalizedRecord, SummaryBlock};
use super::StructuringError;
use crate::config::{Provider, Settings};
use crate::pipeline::extraction::ExtractedDocument;

/// Where raw responses come from.
pub enum ScenarioSource {
    Model {
        client: Box<dyn LlmClient>,
        model: String,
    },
    /// Heuristic scenarios built from the document text.
    Offline,
}

/// Everything produced for one document after parsing.
#[derive(Debug, Clone)]
pub struct StructuredDocument {
    pub record: NormalizedRecord,
    pub summary: SummaryBlock,
    pub rows: Vec<AggregatedRow>,
    pub payload_kind: PayloadKind,
}

/// Turns extracted documents into structured scenario tables.
pub struct DocumentStructurer {
    source: ScenarioSource,
    prompt_max_chars: usize,
}

impl DocumentStructurer {
    pub fn new(source: ScenarioSource, prompt_max_chars: usize) -> Self {
        Self {
            source,
            prompt_max_chars,
        }
    }

    /// Build the model client the settings ask for, or the offline source
    /// when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, StructuringError> {
        let source = match settings.api_key.as_deref() {
            Some(key) if !settings.is_offline() => {
                let base_url = settings.base_url.as_deref();
                let client: Box<dyn LlmClient> = match settings.provider {
                    Provider::Gemini => {
                        Box::new(GeminiClient::new(key, base_url, settings.timeout_secs)?)
                    }
                    Provider::Openai => {
                        Box::new(OpenAiClient::new(key, base_url, settings.timeout_secs)?)
                    }
                };
                ScenarioSource::Model {
                    client,
                    model: settings.model.clone(),
                }
            }
            _ => ScenarioSource::Offline,
        };
        Ok(Self::new(source, settings.prompt_max_chars))
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.source, ScenarioSource::Offline)
    }

    /// Provider label for logs and the run summary.
    pub fn source_label(&self) -> &'static str {
        match &self.source {
            ScenarioSource::Model { client, .. } => client.provider(),
            ScenarioSource::Offline => "offline",
        }
    }

    pub fn prompt_for(&self, document: &ExtractedDocument) -> String {
        build_prompt(
            &document.sections,
            Some(&document.display_name),
            self.prompt_max_chars,
        )
    }

    /// Raw response for one document. An empty response is returned as is;
    /// parsing reports it.
    pub fn generate(
        &self,
        document: &ExtractedDocument,
        prompt: &str,
    ) -> Result<String, StructuringError> {
        match &self.source {
            ScenarioSource::Model { client, model } => {
                tracing::info!(
                    doc = %document.display_name,
                    provider = client.provider(),
                    model = %model,
                    prompt_chars = prompt.chars().count(),
                    "Requesting scenarios from model"
                );
                client.generate(model, prompt, QA_SYSTEM_PROMPT)
            }
            ScenarioSource::Offline => {
                offline_response(&document.plain_text(), &document.display_name)
            }
        }
    }

    /// Parse, normalize, default and aggregate one raw response.
    pub fn structure_response(
        &self,
        raw: &str,
        document_name: &str,
        today: NaiveDate,
    ) -> Result<StructuredDocument, StructuringError> {
        let parsed = parse_model_response(raw)?;
        if !parsed.payload.is_object() {
            tracing::warn!(
                doc = %document_name,
                "Model returned JSON that is not an object; using an empty record"
            );
        }

        let mut record = normalize(parsed.payload);
        apply_metadata_defaults(&mut record, document_name, today);

        let extra = record.extra_keys();
        if !extra.is_empty() {
            tracing::debug!(doc = %document_name, keys = ?extra, "Unknown top-level keys kept");
        }

        let summary = SummaryBlock::from_record(&record);
        let rows = aggregate(&record);
        Ok(StructuredDocument {
            record,
            summary,
            rows,
            payload_kind: parsed.kind,
        })
    }
}
