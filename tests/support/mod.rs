#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use sla_analyzer::{ServerConfig, router};
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Spreadsheet, Worksheet};

pub const BOUNDARY: &str = "sla-analyzer-test-boundary";

/// One fixture cell.
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

pub use Cell::{Blank, Number, Text};

pub fn workbook_bytes<F>(f: F) -> Vec<u8>
where
    F: FnOnce(&mut Spreadsheet),
{
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor).expect("write workbook");
    cursor.into_inner()
}

/// Writes `headers` into row 1 and `rows` below it, starting at column A.
pub fn fill_sheet(sheet: &mut Worksheet, headers: &[&str], rows: &[Vec<Cell>]) {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .get_cell_mut((col as u32 + 1, 1))
            .set_value_string(*header);
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            let target = sheet.get_cell_mut((col as u32 + 1, row_idx as u32 + 2));
            match cell {
                Text(text) => {
                    target.set_value_string(*text);
                }
                Number(number) => {
                    target.set_value_number(*number);
                }
                Blank => {}
            }
        }
    }
}

/// Single-sheet workbook with the incident headers used across the suite.
pub fn incident_workbook(rows: &[Vec<Cell>]) -> Vec<u8> {
    workbook_bytes(|book| {
        let sheet = book.get_sheet_by_name_mut("Sheet1").expect("default sheet");
        fill_sheet(sheet, &["Incident Number", "Created On", "Actual end"], rows);
    })
}

/// Two closures: 12 hours and 48 hours.
pub fn scenario_a() -> Vec<u8> {
    incident_workbook(&[
        vec![Text("INC1"), Number(44000.0), Number(44000.5)],
        vec![Text("INC2"), Number(44001.0), Number(44003.0)],
    ])
}

pub fn reopen(bytes: &[u8]) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes.to_vec()), true)
        .expect("reopen workbook")
}

pub fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_bind_address: "127.0.0.1:0".parse().unwrap(),
        ..ServerConfig::default()
    }
}

pub fn test_router() -> Router {
    router(Arc::new(test_config()))
}

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).expect("write fixture");
        path
    }
}
