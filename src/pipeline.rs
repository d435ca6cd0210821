//! Upload bytes in, evaluated tickets and report artifacts out.
//!
//! Stages run strictly in order and the first failure ends the run:
//! sheet selection, date normalization (bad rows dropped), SLA evaluation,
//! artifact rendering.

use crate::dates::normalize;
use crate::error::{AnalysisError, AnalysisResult};
use crate::model::{ColumnBinding, ComplianceSummary, EvaluatedTicket, RawTable, Ticket};
use crate::report::{self, RenderedReport};
use crate::sla;
use crate::workbook::{self, SelectedSheet};
use serde::Serialize;
use tracing::{debug, info, info_span};
use umya_spreadsheet::Spreadsheet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub sheet_name: String,
    pub binding: ColumnBinding,
    /// Data rows on the selected sheet before date cleaning.
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub summary: ComplianceSummary,
    pub tickets: Vec<EvaluatedTicket>,
}

impl Analysis {
    pub fn success_message(&self) -> String {
        format!(
            "Found data in sheet: {} → {} rows",
            self.sheet_name, self.rows_read
        )
    }
}

/// Normalizes the bound columns of `table`, keeping rows where both
/// timestamps parse. Returns the kept tickets and the dropped-row count.
pub fn collect_tickets(table: &RawTable, binding: &ColumnBinding) -> (Vec<Ticket>, usize) {
    let mut tickets = Vec::with_capacity(table.row_count());
    let mut dropped = 0usize;

    for row in 0..table.row_count() {
        let created = normalize(table.cell(binding.created_at, row)).parsed();
        let ended = normalize(table.cell(binding.ended_at, row)).parsed();
        match (created, ended) {
            (Some(created_at), Some(ended_at)) => tickets.push(Ticket {
                id: table.cell(binding.ticket_id, row).cloned(),
                created_at,
                ended_at,
            }),
            _ => {
                dropped += 1;
                debug!(row, "row dropped: unparseable timestamp");
            }
        }
    }

    (tickets, dropped)
}

pub fn analyze_selected(selected: SelectedSheet) -> AnalysisResult<Analysis> {
    let rows_read = selected.table.row_count();
    let (tickets, rows_dropped) = collect_tickets(&selected.table, &selected.binding);
    if tickets.is_empty() {
        return Err(AnalysisError::NoValidDates);
    }

    let (tickets, summary) = sla::evaluate(&tickets)?;
    info!(
        sheet = %selected.name,
        rows = rows_read,
        dropped = rows_dropped,
        total = summary.total,
        breached = summary.breached_count,
        "sla evaluated"
    );

    Ok(Analysis {
        sheet_name: selected.name,
        binding: selected.binding,
        rows_read,
        rows_dropped,
        summary,
        tickets,
    })
}

pub fn analyze_workbook(book: &Spreadsheet) -> AnalysisResult<Analysis> {
    let selected = workbook::select_sheet(book)?;
    info!(
        sheet = %selected.name,
        ticket_column = %selected.binding.ticket_id_header,
        created_column = %selected.binding.created_at_header,
        ended_column = %selected.binding.ended_at_header,
        "sheet selected"
    );
    analyze_selected(selected)
}

pub fn analyze_bytes(bytes: &[u8]) -> AnalysisResult<Analysis> {
    let _span = info_span!("analysis", upload_bytes = bytes.len()).entered();
    let book = workbook::read_workbook(bytes)?;
    analyze_workbook(&book)
}

/// Full run: analysis plus chart and document.
pub fn generate_report(bytes: &[u8], file_name: &str) -> AnalysisResult<(Analysis, RenderedReport)> {
    let analysis = analyze_bytes(bytes)?;
    let rendered = report::render(&analysis.tickets, &analysis.summary, file_name)?;
    Ok((analysis, rendered))
}
