//! BatchRunner: one pass over a documents folder.
//!
//! Import → Extraction → Structuring → Output, one document at a time.
//! A failing document is recorded in the report and the run moves on.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::diagnostic;
use super::extraction::{extract_document, ExtractionError};
use super::import::{ImportError, SourceDocument};
use super::output::{
    DocumentSheet, OutputError, SheetNameRegistry, SummaryEntry, TabularWriter,
    SUMMARY_SHEET_LABEL,
};
use super::structuring::{DocumentStructurer, PayloadKind, StructuringError};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Structuring error: {0}")]
    Structuring(#[from] StructuringError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// Pipeline stage a document failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Extraction,
    Generation,
    Parsing,
    Output,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Generation => "generation",
            Self::Parsing => "parsing",
            Self::Output => "output",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Succeeded {
        sheet_name: String,
        scenario_count: usize,
        payload_kind: PayloadKind,
    },
    Failed {
        stage: FailureStage,
        reason: String,
        /// Preserved raw response, when the model answered at all.
        raw_artifact: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub display_name: String,
    pub status: DocumentStatus,
    pub duration_ms: u64,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, DocumentStatus::Succeeded { .. })
    }
}

/// Result of a batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub outcomes: Vec<DocumentOutcome>,
    /// Sheet name of the run summary; `None` when nothing succeeded.
    pub summary_sheet: Option<String>,
    /// Where the workbook went; `None` when nothing was written.
    pub output_location: Option<PathBuf>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn total_scenarios(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.status {
                DocumentStatus::Succeeded { scenario_count, .. } => *scenario_count,
                DocumentStatus::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Per-document failure before it is folded into the report.
struct DocumentFailure {
    stage: FailureStage,
    error: BatchError,
    raw_artifact: Option<PathBuf>,
}

impl DocumentFailure {
    fn new(stage: FailureStage, error: impl Into<BatchError>) -> Self {
        Self {
            stage,
            error: error.into(),
            raw_artifact: None,
        }
    }

    fn with_artifact(mut self, raw_artifact: Option<PathBuf>) -> Self {
        self.raw_artifact = raw_artifact;
        self
    }
}

/// Runs the pipeline over a list of documents, sequentially.
pub struct BatchRunner<W: TabularWriter> {
    structurer: DocumentStructurer,
    writer: W,
    registry: SheetNameRegistry,
    /// Raw and debug artifact names; documents sharing a stem get suffixes.
    artifact_names: SheetNameRegistry,
    raw_dir: PathBuf,
    debug: bool,
    today: NaiveDate,
}

impl<W: TabularWriter> BatchRunner<W> {
    pub fn new(
        structurer: DocumentStructurer,
        writer: W,
        registry: SheetNameRegistry,
        raw_dir: &Path,
    ) -> Self {
        Self {
            structurer,
            writer,
            registry,
            artifact_names: SheetNameRegistry::new(diagnostic::ARTIFACT_NAME_MAX_LEN),
            raw_dir: raw_dir.to_path_buf(),
            debug: false,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Dump prompts and normalized records next to the raw responses.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Date used when a response carries no generation date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Process every document. Only output-level failures after the
    /// per-document loop (summary sheet, finish) abort the run.
    pub fn run(mut self, documents: &[SourceDocument]) -> Result<BatchReport, BatchError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("batch_run", run_id = %run_id);
        let _guard = span.enter();

        tracing::info!(
            documents = documents.len(),
            source = self.structurer.source_label(),
            "Batch started"
        );

        let mut outcomes = Vec::with_capacity(documents.len());
        for document in documents {
            let start = Instant::now();
            let status = match self.process_document(document) {
                Ok(status) => status,
                Err(failure) => {
                    tracing::warn!(
                        doc = %document.display_name,
                        stage = failure.stage.as_str(),
                        error = %failure.error,
                        raw = ?failure.raw_artifact,
                        "Document skipped"
                    );
                    DocumentStatus::Failed {
                        stage: failure.stage,
                        reason: failure.error.to_string(),
                        raw_artifact: failure.raw_artifact,
                    }
                }
            };
            outcomes.push(DocumentOutcome {
                display_name: document.display_name.clone(),
                status,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let entries: Vec<SummaryEntry> = outcomes
            .iter()
            .filter_map(|o| match &o.status {
                DocumentStatus::Succeeded {
                    sheet_name,
                    scenario_count,
                    ..
                } => Some(SummaryEntry {
                    sheet_name: sheet_name.clone(),
                    scenario_count: *scenario_count,
                }),
                DocumentStatus::Failed { .. } => None,
            })
            .collect();

        let (summary_sheet, output_location) = if entries.is_empty() {
            tracing::warn!("No scenarios generated; workbook not written");
            (None, None)
        } else {
            let name = self.registry.allocate(SUMMARY_SHEET_LABEL);
            self.writer.write_summary(&name, &entries)?;
            let location = self.writer.finish()?;
            (Some(name), Some(location))
        };

        let report = BatchReport {
            run_id,
            outcomes,
            summary_sheet,
            output_location,
        };
        tracing::info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            scenarios = report.total_scenarios(),
            "Batch complete"
        );
        Ok(report)
    }

    fn process_document(
        &mut self,
        document: &SourceDocument,
    ) -> Result<DocumentStatus, DocumentFailure> {
        let span = tracing::info_span!("document", doc = %document.display_name);
        let _guard = span.enter();

        let extracted = extract_document(document)
            .map_err(|e| DocumentFailure::new(FailureStage::Extraction, e))?;

        let artifact_name = self.artifact_names.allocate(&document.display_name);
        let prompt = self.structurer.prompt_for(&extracted);
        let debug_dir = if self.debug {
            diagnostic::debug_dir_for(&self.raw_dir, &artifact_name)
        } else {
            None
        };
        if let Some(dir) = &debug_dir {
            diagnostic::dump_text(dir, diagnostic::PROMPT_DUMP, &prompt);
        }

        let raw = self
            .structurer
            .generate(&extracted, &prompt)
            .map_err(|e| DocumentFailure::new(FailureStage::Generation, e))?;
        let raw_artifact =
            diagnostic::preserve_raw_response(&self.raw_dir, &artifact_name, &raw);

        let structured = self
            .structurer
            .structure_response(&raw, &document.display_name, self.today)
            .map_err(|e| {
                DocumentFailure::new(FailureStage::Parsing, e).with_artifact(raw_artifact.clone())
            })?;
        if let Some(dir) = &debug_dir {
            diagnostic::dump_json(dir, diagnostic::RECORD_DUMP, &structured.record);
        }

        let sheet_name = self.registry.allocate(&document.display_name);
        let scenario_count = self
            .writer
            .write_document(&DocumentSheet {
                name: &sheet_name,
                summary: &structured.summary,
                rows: &structured.rows,
            })
            .map_err(|e| {
                DocumentFailure::new(FailureStage::Output, e).with_artifact(raw_artifact.clone())
            })?;

        tracing::info!(
            sheet = %sheet_name,
            scenarios = scenario_count,
            payload = structured.payload_kind.as_str(),
            "Document processed"
        );
        Ok(DocumentStatus::Succeeded {
            sheet_name,
            scenario_count,
            payload_kind: structured.payload_kind,
        })
    }
}
