pub mod cli;
pub mod config;
pub mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pipeline::batch::{BatchError, BatchReport, BatchRunner, DocumentStatus};
use pipeline::import::discover_documents;
use pipeline::output::{CsvWorkbookWriter, SheetNameRegistry};
use pipeline::structuring::DocumentStructurer;

pub fn run() -> ExitCode {
    let args = cli::Args::parse();
    let settings = args.into_settings();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter(settings.debug))),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    if settings.is_offline() {
        tracing::warn!(
            env = settings.provider.key_env_var(),
            "No API key configured; generating basic scenarios offline"
        );
    }

    match run_batch(&settings) {
        Ok(report) => {
            print_report(&report);
            if report.success_count() > 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("Erro: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Discover, process and write every document under `settings.docs_dir`.
pub fn run_batch(settings: &config::Settings) -> Result<BatchReport, BatchError> {
    let documents = discover_documents(&settings.docs_dir)?;
    let structurer = DocumentStructurer::from_settings(settings)?;
    let writer = CsvWorkbookWriter::create(&settings.output_dir)?;
    let registry = SheetNameRegistry::new(settings.max_sheet_name_len);

    BatchRunner::new(structurer, writer, registry, &settings.raw_dir)
        .with_debug(settings.debug)
        .run(&documents)
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        match &outcome.status {
            DocumentStatus::Succeeded {
                sheet_name,
                scenario_count,
                ..
            } => println!(
                "✔ {} → aba '{}' ({} cenários)",
                outcome.display_name, sheet_name, scenario_count
            ),
            DocumentStatus::Failed {
                stage,
                reason,
                raw_artifact,
            } => {
                println!(
                    "✘ {} ({}): {}",
                    outcome.display_name,
                    stage.as_str(),
                    reason
                );
                if let Some(path) = raw_artifact {
                    println!("  resposta bruta: {}", path.display());
                }
            }
        }
    }

    println!(
        "{} documento(s) processado(s), {} com falha, {} cenários no total.",
        report.success_count(),
        report.failure_count(),
        report.total_scenarios()
    );
    match &report.output_location {
        Some(location) => println!("Planilhas salvas em: {}", location.display()),
        None => println!("Nenhum cenário foi gerado; nenhuma planilha salva."),
    }
}
