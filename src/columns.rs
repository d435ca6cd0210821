//! Header-name inference for the ticket id, created and closed columns.

use crate::model::ColumnBinding;
use once_cell::sync::Lazy;
use regex::Regex;

const TICKET_ID_NEEDLE: &str = "number";
const CREATED_NEEDLE: &str = "created";

static ENDED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"actual.*end|work.*end|close").expect("closure header pattern is valid")
});

/// Column role inferred from header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    TicketId,
    CreatedAt,
    EndedAt,
}

impl ColumnRole {
    /// Whether an already-lowercased header qualifies for this role.
    pub fn matches(self, lowered: &str) -> bool {
        match self {
            ColumnRole::TicketId => lowered.contains(TICKET_ID_NEEDLE),
            ColumnRole::CreatedAt => lowered.contains(CREATED_NEEDLE),
            ColumnRole::EndedAt => ENDED_PATTERN.is_match(lowered),
        }
    }
}

/// First header (in column order) qualifying for `role`.
pub fn find_column<S: AsRef<str>>(headers: &[S], role: ColumnRole) -> Option<usize> {
    headers
        .iter()
        .position(|header| role.matches(&header.as_ref().to_lowercase()))
}

/// Binds all three roles or nothing.
pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Option<ColumnBinding> {
    let ticket_id = find_column(headers, ColumnRole::TicketId)?;
    let created_at = find_column(headers, ColumnRole::CreatedAt)?;
    let ended_at = find_column(headers, ColumnRole::EndedAt)?;

    Some(ColumnBinding {
        ticket_id,
        created_at,
        ended_at,
        ticket_id_header: headers[ticket_id].as_ref().to_string(),
        created_at_header: headers[created_at].as_ref().to_string(),
        ended_at_header: headers[ended_at].as_ref().to_string(),
    })
}
