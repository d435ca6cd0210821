pub mod chart;
pub mod document;

use crate::error::AnalysisResult;
use crate::model::{ComplianceSummary, EvaluatedTicket};
use crate::utils::sha256_hex;
use base64::Engine;

pub const DEFAULT_REPORT_FILE_NAME: &str = "CloudTech_SLA_Report.xlsx";
pub const CHART_FILE_NAME: &str = "sla_chart.svg";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub svg: String,
}

impl ChartImage {
    pub fn data_uri(&self) -> String {
        data_uri(SVG_CONTENT_TYPE, self.svg.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ReportDocument {
    pub fn data_uri(&self) -> String {
        data_uri(XLSX_CONTENT_TYPE, &self.bytes)
    }

    pub fn sha256(&self) -> String {
        sha256_hex(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub chart: ChartImage,
    pub document: ReportDocument,
}

fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{content_type};base64,{encoded}")
}

/// Renders both artifacts. Either failing fails the whole render.
pub fn render(
    evaluated: &[EvaluatedTicket],
    summary: &ComplianceSummary,
    file_name: &str,
) -> AnalysisResult<RenderedReport> {
    let svg = chart::render_chart(summary)?;
    let bytes = document::write_document(evaluated, summary)?;
    tracing::debug!(
        chart_bytes = svg.len(),
        document_bytes = bytes.len(),
        "report artifacts rendered"
    );
    Ok(RenderedReport {
        chart: ChartImage { svg },
        document: ReportDocument {
            file_name: file_name.to_string(),
            bytes,
        },
    })
}
