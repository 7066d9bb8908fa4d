//! Leave-interval resolution.
//!
//! Determines which leave records cover a given day, lays a month out as a
//! Monday-first grid, and counts overlapping leaves per day for a year.
//!
//! All lookups use closed intervals: a record covers both its start and its
//! end day. Matches are always returned in source order.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar::{first_of_month, last_of_month};
use crate::error::ContractViolation;
use crate::record::LeaveRecord;

/// Highest occupancy still considered [`Severity::Low`].
pub const LOW_MAX: u32 = 3;

/// Colour scale for a day's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Nobody is on leave.
    Neutral,
    /// One to [`LOW_MAX`] people are on leave.
    Low,
    /// More than [`LOW_MAX`] people are on leave.
    High,
}

impl Severity {
    pub const fn from_count(count: u32) -> Self {
        match count {
            0 => Self::Neutral,
            1..=LOW_MAX => Self::Low,
            _ => Self::High,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Low => "low",
            Self::High => "high",
        }
    }
}

/// One day of a [`MonthGrid`].
#[derive(Debug, Clone, Serialize)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub matches: Vec<&'a LeaveRecord>,
}

/// A month laid out in Monday-first week rows.
///
/// Cells before the first and after the last day of the month are `None`.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<DayCell<'a>>; 7]>,
}

impl<'a> MonthGrid<'a> {
    /// Looks up the cell for `date`, if it belongs to this month.
    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell<'a>> {
        self.weeks
            .iter()
            .flatten()
            .flatten()
            .find(|cell| cell.date == date)
    }
}

/// Records whose span starts or ends in `year`, in source order.
///
/// Spans straddling a year boundary belong to both years.
pub fn in_year(records: &[LeaveRecord], year: i32) -> Vec<LeaveRecord> {
    records
        .iter()
        .filter(|r| r.touches_year(year))
        .cloned()
        .collect()
}

/// Records covering `date`, in source order.
pub fn resolve_day(records: &[LeaveRecord], date: NaiveDate) -> Vec<&LeaveRecord> {
    records.iter().filter(|r| r.covers(date)).collect()
}

/// Lays out `year`/`month` as Monday-first weeks, each day listing the
/// records that cover it.
pub fn resolve_month_grid(
    records: &[LeaveRecord],
    year: i32,
    month: u32,
) -> Result<MonthGrid<'_>, ContractViolation> {
    let first = first_of_month(year, month)?;
    let last = last_of_month(year, month)?;
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut weeks: Vec<[Option<DayCell<'_>>; 7]> = Vec::new();
    let mut week: [Option<DayCell<'_>>; 7] = Default::default();
    let mut slot = offset;

    for date in first.iter_days().take_while(|d| *d <= last) {
        week[slot] = Some(DayCell {
            date,
            matches: resolve_day(records, date),
        });
        slot += 1;
        if slot == 7 {
            weeks.push(std::mem::take(&mut week));
            slot = 0;
        }
    }
    if slot != 0 {
        weeks.push(week);
    }

    Ok(MonthGrid { year, month, weeks })
}

/// Number of records covering each day of `year`.
///
/// Only records passing [`in_year`] are counted, and only days inside `year`
/// appear in the map. Days nobody is on leave are absent.
pub fn daily_occupancy(records: &[LeaveRecord], year: i32) -> BTreeMap<NaiveDate, u32> {
    let mut occupancy = BTreeMap::new();
    for record in records.iter().filter(|r| r.touches_year(year)) {
        for day in record.days().filter(|d| d.year() == year) {
            *occupancy.entry(day).or_insert(0) += 1;
        }
    }
    occupancy
}
