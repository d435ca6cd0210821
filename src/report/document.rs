//! The downloadable `.xlsx` report.
//!
//! Layout of the single `Sheet1`:
//!
//! | row            | content                                                |
//! |----------------|--------------------------------------------------------|
//! | 1              | bold header: Number, Created, Actual work end, hours, STATUS |
//! | 2 ..= n + 1    | one row per evaluated ticket                           |
//! | n + 4 ..= n + 8| summary labels in C (bold), values in D                |

use crate::dates::datetime_to_serial;
use crate::error::{AnalysisError, AnalysisResult};
use crate::model::{CellValue, ComplianceSummary, EvaluatedTicket};
use crate::utils::{cell_address, round2};
use std::io::Cursor;
use umya_spreadsheet::{Cell, Spreadsheet, Worksheet};

pub const REPORT_SHEET: &str = "Sheet1";

pub const HEADERS: [&str; 5] = ["Number", "Created", "Actual work end", "hours", "STATUS"];

/// Rows from the last data row to the first summary row.
pub const SUMMARY_ROW_OFFSET: u32 = 3;
pub const SUMMARY_LABEL_COLUMN: u32 = 3;
pub const SUMMARY_VALUE_COLUMN: u32 = 4;

pub const LABEL_WITHIN: &str = "Ticket Within SLA";
pub const LABEL_BREACHED: &str = "Closed past SLA";
pub const LABEL_AVERAGE: &str = "Avg Close (h)";
pub const LABEL_BREACHED_RATE: &str = "Past SLA %";
pub const LABEL_COMPLIANCE: &str = "SLA COMPLIANCE";

pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
pub const PERCENT_FORMAT: &str = "0.00%";

/// Document timestamps are pinned so identical input gives identical output.
const PINNED_TIMESTAMP: &str = "2000-01-01T00:00:00Z";

enum SummaryValue {
    Count(usize),
    Hours(f64),
    Percent(f64),
}

/// First row of the summary block for `data_rows` ticket rows.
pub fn summary_start_row(data_rows: usize) -> u32 {
    data_rows as u32 + 1 + SUMMARY_ROW_OFFSET
}

pub fn build_workbook(
    evaluated: &[EvaluatedTicket],
    summary: &ComplianceSummary,
) -> AnalysisResult<Spreadsheet> {
    let mut book = umya_spreadsheet::new_file();
    {
        let properties = book.get_properties_mut();
        properties.set_creator("sla-analyzer");
        properties.set_created(PINNED_TIMESTAMP);
        properties.set_modified(PINNED_TIMESTAMP);
    }

    let sheet = book
        .get_sheet_by_name_mut(REPORT_SHEET)
        .ok_or_else(|| AnalysisError::Document(format!("sheet {REPORT_SHEET} missing")))?;

    write_header(sheet);
    for (idx, ticket) in evaluated.iter().enumerate() {
        write_ticket_row(sheet, idx as u32 + 2, ticket);
    }
    write_summary(sheet, summary_start_row(evaluated.len()), summary);

    Ok(book)
}

/// Builds the report and serializes it to `.xlsx` bytes.
pub fn write_document(
    evaluated: &[EvaluatedTicket],
    summary: &ComplianceSummary,
) -> AnalysisResult<Vec<u8>> {
    let book = build_workbook(evaluated, summary)?;
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor)
        .map_err(|err| AnalysisError::Document(err.to_string()))?;
    Ok(cursor.into_inner())
}

fn cell_mut<'a>(sheet: &'a mut Worksheet, column: u32, row: u32) -> &'a mut Cell {
    sheet.get_cell_mut(cell_address(column, row).as_str())
}

fn write_header(sheet: &mut Worksheet) {
    for (idx, header) in HEADERS.iter().enumerate() {
        let cell = cell_mut(sheet, idx as u32 + 1, 1);
        cell.set_value_string(*header);
        cell.get_style_mut().get_font_mut().set_bold(true);
    }
}

fn write_ticket_row(sheet: &mut Worksheet, row: u32, ticket: &EvaluatedTicket) {
    match &ticket.ticket.id {
        Some(CellValue::Text(text)) => {
            cell_mut(sheet, 1, row).set_value_string(text.clone());
        }
        Some(CellValue::Number(number)) => {
            cell_mut(sheet, 1, row).set_value_number(*number);
        }
        Some(CellValue::Bool(flag)) => {
            cell_mut(sheet, 1, row).set_value_bool(*flag);
        }
        None => {}
    }

    for (column, timestamp) in [(2, &ticket.ticket.created_at), (3, &ticket.ticket.ended_at)] {
        let cell = cell_mut(sheet, column, row);
        cell.set_value_number(datetime_to_serial(timestamp));
        cell.get_style_mut()
            .get_number_format_mut()
            .set_format_code(DATETIME_FORMAT);
    }

    cell_mut(sheet, 4, row).set_value_number(ticket.elapsed_hours);
    cell_mut(sheet, 5, row).set_value_bool(ticket.breached);
}

fn write_summary(sheet: &mut Worksheet, start_row: u32, summary: &ComplianceSummary) {
    let rows = [
        (LABEL_WITHIN, SummaryValue::Count(summary.within_count)),
        (LABEL_BREACHED, SummaryValue::Count(summary.breached_count)),
        (
            LABEL_AVERAGE,
            SummaryValue::Hours(round2(summary.average_elapsed_hours)),
        ),
        (
            LABEL_BREACHED_RATE,
            SummaryValue::Percent(summary.breached_rate),
        ),
        (LABEL_COMPLIANCE, SummaryValue::Percent(summary.compliance_rate)),
    ];

    for (offset, (label, value)) in rows.into_iter().enumerate() {
        let row = start_row + offset as u32;

        let label_cell = cell_mut(sheet, SUMMARY_LABEL_COLUMN, row);
        label_cell.set_value_string(label);
        label_cell.get_style_mut().get_font_mut().set_bold(true);

        let value_cell = cell_mut(sheet, SUMMARY_VALUE_COLUMN, row);
        match value {
            SummaryValue::Count(count) => {
                value_cell.set_value_number(count as f64);
            }
            SummaryValue::Hours(hours) => {
                value_cell.set_value_number(hours);
            }
            SummaryValue::Percent(ratio) => {
                value_cell.set_value_number(ratio);
                value_cell
                    .get_style_mut()
                    .get_number_format_mut()
                    .set_format_code(PERCENT_FORMAT);
            }
        }
    }
}
