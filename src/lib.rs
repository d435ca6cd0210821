pub mod columns;
pub mod config;
pub mod dates;
pub mod error;
pub mod health;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod sla;
pub mod state;
pub mod templates;
pub mod utils;
pub mod workbook;

pub use config::{CliArgs, Command, ServerConfig};
pub use error::{AnalysisError, AnalysisResult, ErrorCode};
pub use logging::{LoggingConfig, init_logging};
pub use model::{ColumnBinding, ComplianceSummary, EvaluatedTicket, Ticket};
pub use pipeline::{Analysis, analyze_bytes, generate_report};
pub use report::RenderedReport;
pub use server::{router, run_server};

use anyhow::{Context, Result};
use report::CHART_FILE_NAME;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths written by a one-shot report run.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub analysis: Analysis,
    pub document_path: PathBuf,
    pub chart_path: PathBuf,
}

/// Analyzes `input` and writes the report workbook and chart into `out_dir`.
pub fn write_report(config: &ServerConfig, input: &Path, out_dir: &Path) -> Result<ReportOutput> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {:?}", input))?;
    let (analysis, rendered) = generate_report(&bytes, &config.report_file_name)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {:?}", out_dir))?;
    let document_path = out_dir.join(&rendered.document.file_name);
    fs::write(&document_path, &rendered.document.bytes)
        .with_context(|| format!("failed to write {:?}", document_path))?;
    let chart_path = out_dir.join(CHART_FILE_NAME);
    fs::write(&chart_path, rendered.chart.svg.as_bytes())
        .with_context(|| format!("failed to write {:?}", chart_path))?;

    tracing::info!(
        document = %document_path.display(),
        chart = %chart_path.display(),
        sha256 = %rendered.document.sha256(),
        "report written"
    );

    Ok(ReportOutput {
        analysis,
        document_path,
        chart_path,
    })
}
