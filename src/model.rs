use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty cell as read from an uploaded sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(number) => write!(f, "{number}"),
            CellValue::Bool(flag) => write!(f, "{}", if *flag { "TRUE" } else { "FALSE" }),
        }
    }
}

/// A named column of a [`RawTable`]. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub cells: Vec<Option<CellValue>>,
}

/// One sheet's grid, header row split out into column names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<RawColumn>,
    row_count: usize,
}

impl RawTable {
    /// Builds a table from a header and row-major data. Short rows are padded
    /// with empty cells.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Option<CellValue>>>) -> Self {
        let row_count = rows.len();
        let mut columns: Vec<RawColumn> = headers
            .into_iter()
            .map(|name| RawColumn {
                name,
                cells: Vec::with_capacity(row_count),
            })
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().flatten());
            }
        }
        Self { columns, row_count }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&RawColumn> {
        self.columns.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&CellValue> {
        self.columns
            .get(column)
            .and_then(|c| c.cells.get(row))
            .and_then(Option::as_ref)
    }
}

/// Column indices for the three roles, all resolved on the same sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBinding {
    pub ticket_id: usize,
    pub created_at: usize,
    pub ended_at: usize,
    pub ticket_id_header: String,
    pub created_at_header: String,
    pub ended_at_header: String,
}

/// A row whose two timestamps both normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Option<CellValue>,
    pub created_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Signed; closures recorded before creation yield negative hours.
    pub elapsed_hours: f64,
    pub breached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total: usize,
    pub within_count: usize,
    pub breached_count: usize,
    pub average_elapsed_hours: f64,
    pub breached_rate: f64,
    pub compliance_rate: f64,
}
