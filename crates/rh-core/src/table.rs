//! Raw source rows and their conversion into typed records.
//!
//! Loaders hand over rows as plain strings. Every row that cannot be turned
//! into a record is dropped with a [`DataQualityWarning`]; no single row can
//! fail a whole table.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::diagnostic::{DataQualityWarning, Parsed};
use crate::record::{LeaveRecord, PunchEvent};
use crate::types::{PersonName, PunchAction, PunchStatus};

pub const PERSON_COLUMN: &str = "Prénom et nom";
pub const LEAVE_KIND_COLUMN: &str = "Type de congé";
pub const LEAVE_START_COLUMN: &str = "Début";
pub const LEAVE_END_COLUMN: &str = "Fin";
pub const JUSTIFICATION_COLUMN: &str = "Justification";
pub const TIMESTAMP_COLUMN: &str = "Date et heure";
pub const ACTION_COLUMN: &str = "Action";
pub const STATUS_COLUMN: &str = "Statut";

/// Columns a leave table must provide.
pub const LEAVE_COLUMNS: [&str; 5] = [
    PERSON_COLUMN,
    LEAVE_KIND_COLUMN,
    LEAVE_START_COLUMN,
    LEAVE_END_COLUMN,
    JUSTIFICATION_COLUMN,
];

/// Columns a punch table must provide.
pub const PUNCH_COLUMNS: [&str; 4] = [PERSON_COLUMN, TIMESTAMP_COLUMN, ACTION_COLUMN, STATUS_COLUMN];

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// An unparsed leave row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveRow {
    pub line: usize,
    pub person: String,
    pub kind: String,
    pub start: String,
    pub end: String,
    pub justification: String,
}

/// An unparsed punch row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PunchRow {
    pub line: usize,
    pub person: String,
    pub timestamp: String,
    pub action: String,
    pub status: String,
}

/// Parses a local wall-clock timestamp.
///
/// RFC 3339 input keeps its local time and drops the offset.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a calendar date. Timestamps are accepted and truncated to their date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| parse_timestamp(s).map(|dt| dt.date()))
}

fn warning(line: usize, field: &'static str, value: &str, reason: &str) -> DataQualityWarning {
    let warning = DataQualityWarning {
        line,
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    };
    tracing::warn!(line, field, value, reason, "skipping malformed row");
    warning
}

/// Converts leave rows into records, preserving row order.
pub fn parse_leave_rows(rows: &[LeaveRow]) -> Parsed<LeaveRecord> {
    let mut parsed = Parsed::default();
    for row in rows {
        match parse_leave_row(row) {
            Ok(record) => parsed.records.push(record),
            Err(warning) => parsed.warnings.push(warning),
        }
    }
    parsed
}

fn parse_leave_row(row: &LeaveRow) -> Result<LeaveRecord, DataQualityWarning> {
    let person = PersonName::new(row.person.as_str())
        .map_err(|e| warning(row.line, PERSON_COLUMN, &row.person, &e.to_string()))?;
    let start = parse_date(&row.start)
        .ok_or_else(|| warning(row.line, LEAVE_START_COLUMN, &row.start, "invalid date"))?;
    let end = parse_date(&row.end)
        .ok_or_else(|| warning(row.line, LEAVE_END_COLUMN, &row.end, "invalid date"))?;
    if end < start {
        return Err(warning(
            row.line,
            LEAVE_END_COLUMN,
            &row.end,
            "leave ends before it starts",
        ));
    }
    Ok(LeaveRecord {
        person,
        kind: row.kind.trim().to_string(),
        start,
        end,
        justification: row.justification.trim().to_string(),
    })
}

/// Converts punch rows into events, preserving row order.
pub fn parse_punch_rows(rows: &[PunchRow]) -> Parsed<PunchEvent> {
    let mut parsed = Parsed::default();
    for row in rows {
        match parse_punch_row(row) {
            Ok(event) => parsed.records.push(event),
            Err(warning) => parsed.warnings.push(warning),
        }
    }
    parsed
}

fn parse_punch_row(row: &PunchRow) -> Result<PunchEvent, DataQualityWarning> {
    let person = PersonName::new(row.person.as_str())
        .map_err(|e| warning(row.line, PERSON_COLUMN, &row.person, &e.to_string()))?;
    let timestamp = parse_timestamp(&row.timestamp)
        .ok_or_else(|| warning(row.line, TIMESTAMP_COLUMN, &row.timestamp, "invalid timestamp"))?;
    let action: PunchAction = row
        .action
        .parse()
        .map_err(|_| warning(row.line, ACTION_COLUMN, &row.action, "unknown action"))?;
    Ok(PunchEvent {
        person,
        timestamp,
        action,
        status: PunchStatus::from_label(&row.status),
    })
}
