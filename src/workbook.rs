use crate::columns;
use crate::error::{AnalysisError, AnalysisResult};
use crate::model::{CellValue, ColumnBinding, RawTable};
use crate::utils::cell_address;
use std::io::Cursor;
use tracing::debug;
use umya_spreadsheet::reader::xlsx;
use umya_spreadsheet::{CellRawValue, Spreadsheet, Worksheet};

/// The sheet adopted for analysis together with its resolved columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedSheet {
    pub name: String,
    pub table: RawTable,
    pub binding: ColumnBinding,
}

pub fn read_workbook(bytes: &[u8]) -> AnalysisResult<Spreadsheet> {
    xlsx::read_reader(Cursor::new(bytes), true)
        .map_err(|err| AnalysisError::Workbook(err.to_string()))
}

/// Maps a cell by its stored type. Text stays text even when it looks like
/// a number or a boolean; error cells read as empty.
pub fn cell_to_value(cell: &umya_spreadsheet::Cell) -> Option<CellValue> {
    match cell.get_raw_value() {
        CellRawValue::Numeric(number) => Some(CellValue::Number(*number)),
        CellRawValue::Bool(flag) => Some(CellValue::Bool(*flag)),
        CellRawValue::String(text) | CellRawValue::Lazy(text) => text_value(text),
        CellRawValue::RichText(rich) => text_value(&rich.get_text()),
        CellRawValue::Error(_) | CellRawValue::Empty => None,
    }
}

fn text_value(text: &str) -> Option<CellValue> {
    if text.is_empty() {
        None
    } else {
        Some(CellValue::Text(text.to_string()))
    }
}

fn read_cell(sheet: &Worksheet, column: u32, row: u32) -> Option<CellValue> {
    sheet
        .get_cell(cell_address(column, row).as_str())
        .and_then(cell_to_value)
}

/// Reads a worksheet into a [`RawTable`]. The first non-empty row is the
/// header; blank headers become `Unnamed: {index}`. Wholly blank data rows
/// are skipped.
pub fn sheet_table(sheet: &Worksheet) -> RawTable {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    if max_col == 0 || max_row == 0 {
        return RawTable::default();
    }

    let read_row = |row: u32| -> Vec<Option<CellValue>> {
        (1..=max_col).map(|col| read_cell(sheet, col, row)).collect()
    };

    let Some((header_row, header_cells)) = (1..=max_row)
        .map(|row| (row, read_row(row)))
        .find(|(_, cells)| cells.iter().any(Option::is_some))
    else {
        return RawTable::default();
    };

    let headers = header_cells
        .into_iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Some(value) => value.to_string(),
            None => format!("Unnamed: {idx}"),
        })
        .collect();

    let rows = (header_row + 1..=max_row)
        .map(|row| read_row(row))
        .filter(|cells| cells.iter().any(Option::is_some))
        .collect();

    RawTable::from_rows(headers, rows)
}

/// First sheet, in the order given, whose headers bind all three roles.
pub fn select_from<I>(sheets: I) -> Option<SelectedSheet>
where
    I: IntoIterator<Item = (String, RawTable)>,
{
    sheets.into_iter().find_map(|(name, table)| {
        let binding = columns::resolve(&table.headers());
        match binding {
            Some(binding) => Some(SelectedSheet {
                name,
                table,
                binding,
            }),
            None => {
                debug!(sheet = %name, headers = ?table.headers(), "sheet rejected");
                None
            }
        }
    })
}

pub fn select_sheet(book: &Spreadsheet) -> AnalysisResult<SelectedSheet> {
    select_from(
        book.get_sheet_collection()
            .iter()
            .map(|sheet| (sheet.get_name().to_string(), sheet_table(sheet))),
    )
    .ok_or(AnalysisError::NoValidSheet)
}
