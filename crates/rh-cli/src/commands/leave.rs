//! Leave calendar commands.
//!
//! This module implements `rh leave calendar`, `rh leave day` and
//! `rh leave occupancy` over a leave table.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rh_core::leave::in_year;
use rh_core::table::{parse_date, parse_leave_rows};
use rh_core::{
    DataQualityWarning, LeaveRecord, MonthGrid, Parsed, Severity, daily_occupancy, resolve_day,
    resolve_month_grid,
};
use serde::Serialize;

use super::util::{plural, section, write_warnings};
use crate::loader::SourceCache;

/// Indent of continuation lines under a day heading ("  Mon 03  ").
const DETAIL_INDENT: &str = "          ";

/// Loads and parses a leave table through the cache.
pub fn load(cache: &mut SourceCache, path: &Path) -> Result<Parsed<LeaveRecord>> {
    let rows = cache
        .get(path)?
        .leave_rows()
        .with_context(|| format!("invalid leave table {}", path.display()))?;
    Ok(parse_leave_rows(&rows))
}

fn describe(record: &LeaveRecord) -> String {
    if record.justification.is_empty() {
        format!("{} ({})", record.person, record.kind)
    } else {
        format!("{} ({}): {}", record.person, record.kind, record.justification)
    }
}

fn marker(matches: usize) -> char {
    match Severity::from_count(u32::try_from(matches).unwrap_or(u32::MAX)) {
        Severity::Neutral => ' ',
        Severity::Low => '*',
        Severity::High => '!',
    }
}

// ========== Calendar ==========

/// Formats one month: a Monday-first grid followed by the leaves of each day.
///
/// Days marked `*` have one to three people away, `!` more than three.
pub fn format_month(grid: &MonthGrid<'_>) -> String {
    let mut output = String::new();

    let title = NaiveDate::from_ymd_opt(grid.year, grid.month, 1)
        .map_or_else(|| format!("{}-{:02}", grid.year, grid.month), |d| d.format("%B %Y").to_string());
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();

    let header: String = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .map(|d| format!("{d:>4} "))
        .collect();
    writeln!(output, "{}", header.trim_end()).unwrap();

    for week in &grid.weeks {
        let line: String = week
            .iter()
            .map(|cell| match cell {
                None => "     ".to_string(),
                Some(cell) => format!("{:>3}{} ", cell.date.day(), marker(cell.matches.len())),
            })
            .collect();
        writeln!(output, "{}", line.trim_end()).unwrap();
    }

    writeln!(output).unwrap();
    let mut any = false;
    for cell in grid.weeks.iter().flatten().flatten() {
        for (idx, record) in cell.matches.iter().enumerate() {
            any = true;
            if idx == 0 {
                let day = cell.date.format("%a %d");
                writeln!(output, "  {day}  {}", describe(record)).unwrap();
            } else {
                writeln!(output, "{DETAIL_INDENT}{}", describe(record)).unwrap();
            }
        }
    }
    if !any {
        writeln!(output, "  No leave this month.").unwrap();
    }

    output
}

/// Formats the calendar for one month, or for every month of `year`.
pub fn format_calendar(
    records: &[LeaveRecord],
    year: i32,
    month: Option<u32>,
) -> Result<String> {
    let records = in_year(records, year);
    let months: Vec<u32> = month.map_or_else(|| (1..=12).collect(), |m| vec![m]);

    let mut output = String::new();
    for (idx, month) in months.into_iter().enumerate() {
        let grid = resolve_month_grid(&records, year, month)?;
        if idx > 0 {
            writeln!(output).unwrap();
        }
        output.push_str(&format_month(&grid));
    }
    Ok(output)
}

/// Runs `rh leave calendar`.
pub fn calendar<W: Write>(
    writer: &mut W,
    cache: &mut SourceCache,
    path: &Path,
    year: i32,
    month: Option<u32>,
) -> Result<()> {
    let parsed = load(cache, path)?;
    let mut output = format_calendar(&parsed.records, year, month)?;
    write_warnings(&mut output, &parsed.warnings);
    write!(writer, "{output}")?;
    Ok(())
}

// ========== Single Day ==========

/// Formats the leaves covering `date`.
pub fn format_day(date: NaiveDate, matches: &[&LeaveRecord]) -> String {
    let mut output = String::new();
    writeln!(output, "LEAVE ON {}", date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();
    if matches.is_empty() {
        writeln!(output, "  Nobody is on leave.").unwrap();
    }
    for record in matches {
        writeln!(output, "  {}", describe(record)).unwrap();
    }
    output
}

/// Runs `rh leave day`.
pub fn day<W: Write>(
    writer: &mut W,
    cache: &mut SourceCache,
    path: &Path,
    date: &str,
) -> Result<()> {
    let date = parse_date(date).with_context(|| format!("invalid date: {date}"))?;
    let parsed = load(cache, path)?;
    let records = in_year(&parsed.records, date.year());
    let mut output = format_day(date, &resolve_day(&records, date));
    write_warnings(&mut output, &parsed.warnings);
    write!(writer, "{output}")?;
    Ok(())
}

// ========== Occupancy ==========

/// Formats per-day occupancy for a year.
pub fn format_occupancy(year: i32, occupancy: &BTreeMap<NaiveDate, u32>) -> String {
    let mut output = String::new();
    writeln!(output, "LEAVE OCCUPANCY: {year}").unwrap();

    if occupancy.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No leave recorded in {year}.").unwrap();
        return output;
    }

    section(&mut output, "BY DAY");
    for (date, count) in occupancy {
        let severity = Severity::from_count(*count);
        writeln!(
            output,
            "  {date}  {}  {count:>3}  {}",
            date.format("%a"),
            severity.as_str()
        )
        .unwrap();
    }

    let high_days = occupancy
        .values()
        .filter(|c| Severity::from_count(**c) == Severity::High)
        .count();
    section(&mut output, "SUMMARY");
    writeln!(output, "Days with leave:  {}", occupancy.len()).unwrap();
    writeln!(output, "High days:        {high_days}").unwrap();
    // Earliest day wins ties.
    if let Some((date, count)) = occupancy
        .iter()
        .fold(None::<(&NaiveDate, &u32)>, |best, item| match best {
            Some(b) if b.1 >= item.1 => Some(b),
            _ => Some(item),
        })
    {
        let people = plural(*count as usize, "person", "people");
        writeln!(output, "Peak:             {date} ({people})").unwrap();
    }
    output
}

/// JSON occupancy structure.
#[derive(Debug, Serialize)]
pub struct JsonOccupancy<'a> {
    pub year: i32,
    pub days: Vec<JsonOccupancyDay>,
    pub warnings: &'a [DataQualityWarning],
}

#[derive(Debug, Serialize)]
pub struct JsonOccupancyDay {
    pub date: NaiveDate,
    pub count: u32,
    pub severity: Severity,
}

/// Formats occupancy as JSON.
pub fn format_occupancy_json(
    year: i32,
    occupancy: &BTreeMap<NaiveDate, u32>,
    warnings: &[DataQualityWarning],
) -> Result<String> {
    let report = JsonOccupancy {
        year,
        days: occupancy
            .iter()
            .map(|(date, count)| JsonOccupancyDay {
                date: *date,
                count: *count,
                severity: Severity::from_count(*count),
            })
            .collect(),
        warnings,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Runs `rh leave occupancy`.
pub fn occupancy<W: Write>(
    writer: &mut W,
    cache: &mut SourceCache,
    path: &Path,
    year: i32,
    json: bool,
) -> Result<()> {
    let parsed = load(cache, path)?;
    let occupancy = daily_occupancy(&parsed.records, year);

    if json {
        let output = format_occupancy_json(year, &occupancy, &parsed.warnings)?;
        writeln!(writer, "{output}")?;
    } else {
        let mut output = format_occupancy(year, &occupancy);
        write_warnings(&mut output, &parsed.warnings);
        write!(writer, "{output}")?;
    }
    Ok(())
}
