use std::fs;
use std::path::{Path, PathBuf};

use super::OutputError;
use crate::pipeline::structuring::aggregate::AggregatedRow;
use crate::pipeline::structuring::schema::SummaryBlock;

/// Column headers of the scenario table.
pub const TABLE_HEADERS: [&str; 9] = [
    "ID",
    "Título",
    "Descrição",
    "Pré-condições",
    "Passos",
    "Dados de Teste",
    "Resultado Esperado",
    "Prioridade",
    "Tipo de Cenário",
];

/// Title line of the block above each table.
pub const SUMMARY_TITLE: &str = "Meta Info & Análise Preditiva (gerado automaticamente)";

/// Label for the per-run summary sheet.
pub const SUMMARY_SHEET_LABEL: &str = "Resumo";

/// Everything written for one document.
#[derive(Debug, Clone)]
pub struct DocumentSheet<'a> {
    pub name: &'a str,
    pub summary: &'a SummaryBlock,
    pub rows: &'a [AggregatedRow],
}

/// One line of the run summary sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub sheet_name: String,
    pub scenario_count: usize,
}

/// Sink for generated tables. The batch runner only talks to this trait.
pub trait TabularWriter {
    /// Write one document's sheet. Returns the number of scenario rows written.
    fn write_document(&mut self, sheet: &DocumentSheet<'_>) -> Result<usize, OutputError>;

    /// Write the run summary under the given (already unique) sheet name.
    fn write_summary(&mut self, name: &str, entries: &[SummaryEntry]) -> Result<(), OutputError>;

    /// Flush and report where the output went.
    fn finish(&mut self) -> Result<PathBuf, OutputError>;
}

/// Writes every sheet as `<output_dir>/<sheet name>.csv`.
pub struct CsvWorkbookWriter {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvWorkbookWriter {
    pub fn create(output_dir: &Path) -> Result<Self, OutputError> {
        fs::create_dir_all(output_dir).map_err(|source| OutputError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    pub fn sheet_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.csv"))
    }

    /// Files written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn open(&self, name: &str) -> Result<(csv::Writer<fs::File>, PathBuf), OutputError> {
        let path = self.sheet_path(name);
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| OutputError::Csv(e.to_string()))?;
        Ok((writer, path))
    }
}

fn summary_lines(summary: &SummaryBlock) -> Vec<Vec<&str>> {
    vec![
        vec![SUMMARY_TITLE],
        vec!["Funcionalidade Alvo:", summary.target_feature.as_str()],
        vec![
            "Data Geração:",
            summary.generated_on.as_str(),
            "Complexidade Percebida:",
            summary.perceived_complexity.as_str(),
        ],
        vec![
            "Estimativa total bugs esperados:",
            summary.estimated_bug_total.as_str(),
        ],
        vec!["Top 3 áreas de maior risco:", summary.top_risk_areas.as_str()],
    ]
}

fn row_record(row: &AggregatedRow) -> [&str; 9] {
    [
        row.id.as_str(),
        row.title.as_str(),
        row.description.as_str(),
        row.preconditions.as_str(),
        row.steps.as_str(),
        row.test_data.as_str(),
        row.expected_result.as_str(),
        row.priority.as_str(),
        row.category.key(),
    ]
}

fn csv_err(e: csv::Error) -> OutputError {
    OutputError::Csv(e.to_string())
}

impl TabularWriter for CsvWorkbookWriter {
    fn write_document(&mut self, sheet: &DocumentSheet<'_>) -> Result<usize, OutputError> {
        let (mut writer, path) = self.open(sheet.name)?;

        for line in summary_lines(sheet.summary) {
            writer.write_record(&line).map_err(csv_err)?;
        }
        writer.write_record([""]).map_err(csv_err)?;
        writer.write_record(TABLE_HEADERS).map_err(csv_err)?;
        for row in sheet.rows {
            writer.write_record(row_record(row)).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            sheet = sheet.name,
            rows = sheet.rows.len(),
            path = %path.display(),
            "Sheet written"
        );
        self.written.push(path);
        Ok(sheet.rows.len())
    }

    fn write_summary(&mut self, name: &str, entries: &[SummaryEntry]) -> Result<(), OutputError> {
        let (mut writer, path) = self.open(name)?;
        writer
            .write_record(["Resumo de cenários por documento"])
            .map_err(csv_err)?;
        writer
            .write_record(["Documento", "Total Cenários"])
            .map_err(csv_err)?;
        for entry in entries {
            let count = entry.scenario_count.to_string();
            writer
                .write_record([entry.sheet_name.as_str(), count.as_str()])
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;
        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> Result<PathBuf, OutputError> {
        tracing::info!(
            files = self.written.len(),
            dir = %self.output_dir.display(),
            "Workbook written"
        );
        Ok(self.output_dir.clone())
    }
}
