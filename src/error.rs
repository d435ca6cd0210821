//! Error handling for the SLA analysis pipeline
//!
//! Every failure that ends an invocation is an [`AnalysisError`]. Each variant
//! maps onto a stable [`ErrorCode`] used for HTTP status mapping and for the
//! `error.code` field of structured logs. Per-row date failures are not errors
//! at all; they surface as [`crate::dates::Timestamp::Unparseable`] and only
//! shrink the working set.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message shown when no sheet carries the three required columns.
pub const NO_VALID_SHEET_MESSAGE: &str =
    "No valid sheet found. Need: Number, Created, Actual work end";

/// Message shown when every row was dropped by date normalization.
pub const NO_VALID_DATES_MESSAGE: &str = "No valid date rows found!";

// =============================================================================
// ERROR CODES
// =============================================================================

/// Stable identifiers for pipeline failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Upload could not be opened as an xlsx workbook
    WorkbookUnreadable,
    /// No sheet satisfied the column resolver
    NoValidSheet,
    /// Working set was empty after date normalization
    NoValidDates,
    /// Summary requested over zero tickets
    EmptyWorkingSet,
    /// Chart rendering failed
    ChartRender,
    /// Report document generation failed
    DocumentRender,
    /// Request was malformed (missing upload field, oversized body)
    InvalidRequest,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::WorkbookUnreadable => "workbook_unreadable",
            ErrorCode::NoValidSheet => "no_valid_sheet",
            ErrorCode::NoValidDates => "no_valid_dates",
            ErrorCode::EmptyWorkingSet => "empty_working_set",
            ErrorCode::ChartRender => "chart_render",
            ErrorCode::DocumentRender => "document_render",
            ErrorCode::InvalidRequest => "invalid_request",
        }
    }

    /// Get the error category for logs
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::WorkbookUnreadable | ErrorCode::InvalidRequest => "client_error",
            ErrorCode::NoValidSheet => "resolution_failure",
            ErrorCode::NoValidDates | ErrorCode::EmptyWorkingSet => "empty_working_set",
            ErrorCode::ChartRender | ErrorCode::DocumentRender => "artifact_generation",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidRequest | ErrorCode::WorkbookUnreadable => StatusCode::BAD_REQUEST,
            ErrorCode::NoValidSheet | ErrorCode::NoValidDates | ErrorCode::EmptyWorkingSet => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::ChartRender | ErrorCode::DocumentRender => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ANALYSIS ERROR
// =============================================================================

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("could not read workbook: {0}")]
    Workbook(String),

    #[error("{}", NO_VALID_SHEET_MESSAGE)]
    NoValidSheet,

    #[error("{}", NO_VALID_DATES_MESSAGE)]
    NoValidDates,

    /// Summary statistics are undefined over an empty working set.
    #[error("cannot summarise an empty set of tickets")]
    EmptyWorkingSet,

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("report generation failed: {0}")]
    Document(String),

    #[error("{0}")]
    InvalidRequest(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::Workbook(_) => ErrorCode::WorkbookUnreadable,
            AnalysisError::NoValidSheet => ErrorCode::NoValidSheet,
            AnalysisError::NoValidDates => ErrorCode::NoValidDates,
            AnalysisError::EmptyWorkingSet => ErrorCode::EmptyWorkingSet,
            AnalysisError::Chart(_) => ErrorCode::ChartRender,
            AnalysisError::Document(_) => ErrorCode::DocumentRender,
            AnalysisError::InvalidRequest(_) => ErrorCode::InvalidRequest,
        }
    }

    /// Body returned to API clients.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: ErrorCode,
    pub message: String,
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let code = self.code();
        if code.status_code().is_server_error() {
            tracing::error!(error.code = %code, error.category = code.category(), "{}", self);
        } else {
            tracing::info!(error.code = %code, error.category = code.category(), "{}", self);
        }
        (code.status_code(), Json(self.to_body())).into_response()
    }
}
