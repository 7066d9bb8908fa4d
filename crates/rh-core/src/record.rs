//! Typed records produced from the source tables.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{PersonName, PunchAction, PunchStatus};

/// An approved absence covering an inclusive date range.
///
/// `start <= end` holds for every record built by [`crate::table::parse_leave_rows`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub person: PersonName,
    /// Leave kind ("Type de congé"), e.g. "Congé payé".
    pub kind: String,
    /// First day of leave, inclusive.
    pub start: NaiveDate,
    /// Last day of leave, inclusive.
    pub end: NaiveDate,
    #[serde(default)]
    pub justification: String,
}

impl LeaveRecord {
    /// Whether `date` falls within the closed interval `[start, end]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the span starts or ends in `year`.
    pub fn touches_year(&self, year: i32) -> bool {
        self.start.year() == year || self.end.year() == year
    }

    /// Every day of the span, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|day| *day <= self.end)
    }
}

/// A single clock action by one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    pub person: PersonName,
    /// Local wall-clock time of the punch.
    pub timestamp: NaiveDateTime,
    pub action: PunchAction,
    pub status: PunchStatus,
}

impl PunchEvent {
    /// Calendar day of the punch.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
