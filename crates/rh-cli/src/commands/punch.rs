//! Punch report command for time-card analysis.
//!
//! This module implements `rh punch report`, reconciling one month of punches
//! and rendering it as a human-readable report or JSON.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rh_core::calendar::first_of_month;
use rh_core::punch::{FirstPairDuration, first_pair_durations, in_month, summarize};
use rh_core::table::parse_punch_rows;
use rh_core::{
    ContractViolation, DataQualityWarning, Parsed, PunchAnomaly, PunchEvent, PunchSummary,
    Reconciliation, reconcile,
};
use serde::Serialize;

use super::util::{
    format_minutes, format_timestamp, plural, progress_bar, section, write_warnings,
};
use crate::loader::SourceCache;

/// Computed report data for one month.
#[derive(Debug)]
pub struct PunchReport {
    pub year: i32,
    pub month: u32,
    pub reconciliation: Reconciliation,
    pub first_pairs: Vec<FirstPairDuration>,
    pub summary: PunchSummary,
    pub warnings: Vec<DataQualityWarning>,
}

/// Loads and parses a punch table through the cache.
pub fn load(cache: &mut SourceCache, path: &Path) -> Result<Parsed<PunchEvent>> {
    let rows = cache
        .get(path)?
        .punch_rows()
        .with_context(|| format!("invalid punch table {}", path.display()))?;
    Ok(parse_punch_rows(&rows))
}

// ========== Report Generation ==========

/// Builds the report for `year`/`month` from every parsed event.
pub fn build_report(
    parsed: Parsed<PunchEvent>,
    year: i32,
    month: u32,
) -> Result<PunchReport, ContractViolation> {
    let window = in_month(&parsed.records, year, month)?;
    tracing::debug!(
        total = parsed.records.len(),
        in_window = window.len(),
        "selected punch window"
    );

    Ok(PunchReport {
        year,
        month,
        reconciliation: reconcile(&window),
        first_pairs: first_pair_durations(&window),
        summary: summarize(&window),
        warnings: parsed.warnings,
    })
}

fn month_title(year: i32, month: u32) -> String {
    first_of_month(year, month).map_or_else(
        |_| format!("{year}-{month:02}"),
        |d| d.format("%B %Y").to_string(),
    )
}

fn describe_anomaly(anomaly: &PunchAnomaly) -> String {
    match anomaly {
        PunchAnomaly::ReplacedEntry {
            discarded,
            replacement,
            ..
        } => format!(
            "replaced entry {} by {}",
            format_timestamp(*discarded),
            format_timestamp(*replacement)
        ),
        PunchAnomaly::OrphanExit { at, .. } => {
            format!("exit without entry at {}", format_timestamp(*at))
        }
        PunchAnomaly::RejectedPair { entry, exit, .. } => format!(
            "rejected pair {} → {}",
            format_timestamp(*entry),
            format_timestamp(*exit)
        ),
        PunchAnomaly::UnclosedEntry { entry, .. } => {
            format!("entry without exit at {}", format_timestamp(*entry))
        }
    }
}

/// Formats the human-readable report output.
pub fn format_report(report: &PunchReport) -> String {
    let mut output = String::new();
    let title = month_title(report.year, report.month);
    writeln!(output, "PUNCH REPORT: {title}").unwrap();

    if report.summary.total_events == 0 {
        writeln!(output).unwrap();
        writeln!(output, "No punches recorded in {title}.").unwrap();
        write_warnings(&mut output, &report.warnings);
        return output;
    }

    let rec = &report.reconciliation;

    section(&mut output, "CORRECTLY PUNCHED");
    if rec.correctly_punched.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for person in &rec.correctly_punched {
        writeln!(output, "  {person}").unwrap();
    }

    section(&mut output, "INCORRECTLY PUNCHED");
    if rec.incorrectly_punched.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for person in &rec.incorrectly_punched {
        writeln!(output, "  {person}").unwrap();
    }

    section(&mut output, "WORK INTERVALS");
    if rec.intervals.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for interval in &rec.intervals {
        let note = if interval.crosses_midnight() {
            "  overnight"
        } else {
            ""
        };
        writeln!(
            output,
            "  {:<22}{} → {}  {:>7}{note}",
            interval.person.as_str(),
            format_timestamp(interval.entry),
            format_timestamp(interval.exit),
            format_minutes(interval.duration_minutes),
        )
        .unwrap();
    }

    section(&mut output, "FIRST ENTRY / FIRST EXIT");
    if report.first_pairs.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for pair in &report.first_pairs {
        let note = if pair.wrapped { "  +1 day" } else { "" };
        writeln!(
            output,
            "  {:<22}{} → {}  {:>7}{note}",
            pair.person.as_str(),
            format_timestamp(pair.entry),
            format_timestamp(pair.exit),
            format_minutes(pair.duration_minutes),
        )
        .unwrap();
    }

    if !rec.anomalies.is_empty() {
        section(&mut output, "ANOMALIES");
        for anomaly in &rec.anomalies {
            writeln!(
                output,
                "  {:<22}{}",
                anomaly.person().as_str(),
                describe_anomaly(anomaly)
            )
            .unwrap();
        }
    }

    section(&mut output, "PUNCHES PER DAY");
    let max = report.summary.daily_counts.values().copied().max().unwrap_or(0);
    for (date, count) in &report.summary.daily_counts {
        writeln!(output, "  {date}  {count:>3}  {}", progress_bar(*count, max)).unwrap();
    }

    let summary = &report.summary;
    section(&mut output, "SUMMARY");
    writeln!(output, "Records:       {}", summary.total_events).unwrap();
    writeln!(output, "Operators:     {}", summary.unique_people).unwrap();
    writeln!(output, "Success rate:  {:.2}%", summary.success_rate).unwrap();
    if let Some(day) = summary.busiest_day {
        let punches = plural(day.count, "punch", "punches");
        writeln!(output, "Busiest day:   {} ({punches})", day.date).unwrap();
    }
    if let Some(day) = summary.quietest_day {
        let punches = plural(day.count, "punch", "punches");
        writeln!(output, "Quietest day:  {} ({punches})", day.date).unwrap();
    }

    write_warnings(&mut output, &report.warnings);
    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonPunchReport<'a> {
    pub year: i32,
    pub month: u32,
    pub correctly_punched: Vec<&'a str>,
    pub incorrectly_punched: Vec<&'a str>,
    pub intervals: &'a [rh_core::WorkInterval],
    pub first_pairs: &'a [FirstPairDuration],
    pub anomalies: &'a [PunchAnomaly],
    pub summary: JsonSummary<'a>,
    pub warnings: &'a [DataQualityWarning],
}

#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    pub total_events: usize,
    pub unique_people: usize,
    /// Percentage rounded to two decimals.
    pub success_rate: f64,
    pub busiest_day: Option<rh_core::punch::DayCount>,
    pub quietest_day: Option<rh_core::punch::DayCount>,
    pub daily_counts: &'a std::collections::BTreeMap<chrono::NaiveDate, usize>,
}

/// Formats report data as JSON.
pub fn format_report_json(report: &PunchReport) -> Result<String> {
    let rec = &report.reconciliation;
    let summary = &report.summary;
    let json = JsonPunchReport {
        year: report.year,
        month: report.month,
        correctly_punched: rec.correctly_punched.iter().map(|p| p.as_str()).collect(),
        incorrectly_punched: rec.incorrectly_punched.iter().map(|p| p.as_str()).collect(),
        intervals: &rec.intervals,
        first_pairs: &report.first_pairs,
        anomalies: &rec.anomalies,
        summary: JsonSummary {
            total_events: summary.total_events,
            unique_people: summary.unique_people,
            success_rate: (summary.success_rate * 100.0).round() / 100.0,
            busiest_day: summary.busiest_day,
            quietest_day: summary.quietest_day,
            daily_counts: &summary.daily_counts,
        },
        warnings: &report.warnings,
    };

    Ok(serde_json::to_string_pretty(&json)?)
}

// ========== Public Interface ==========

/// Runs the punch report command.
pub fn run<W: Write>(
    writer: &mut W,
    cache: &mut SourceCache,
    path: &Path,
    year: i32,
    month: u32,
    json: bool,
) -> Result<()> {
    let parsed = load(cache, path)?;
    let report = build_report(parsed, year, month)?;

    if json {
        let output = format_report_json(&report)?;
        writeln!(writer, "{output}")?;
    } else {
        let output = format_report(&report);
        write!(writer, "{output}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use insta::assert_snapshot;
    use rh_core::table::TIMESTAMP_COLUMN;
    use rh_core::{PersonName, PunchAction, PunchStatus};

    fn punch(person: &str, ts: &str, action: PunchAction, status: PunchStatus) -> PunchEvent {
        PunchEvent {
            person: PersonName::new(person).unwrap(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
            action,
            status,
        }
    }

    fn january_events() -> Parsed<PunchEvent> {
        use PunchAction::{EntryPunch, ExitPunch};
        use PunchStatus::{Failure, Success};
        Parsed {
            records: vec![
                punch("Alice Martin", "2025-01-06 09:00", EntryPunch, Success),
                punch("Alice Martin", "2025-01-06 17:00", ExitPunch, Success),
                punch("Bob Durand", "2025-01-06 08:00", EntryPunch, Success),
                punch("Bob Durand", "2025-01-06 08:30", EntryPunch, Failure),
                punch("Alice Martin", "2025-01-07 22:00", EntryPunch, Success),
                punch("Alice Martin", "2025-01-08 06:00", ExitPunch, Success),
                punch("Alice Martin", "2025-02-03 09:00", EntryPunch, Success),
            ],
            warnings: vec![DataQualityWarning {
                line: 9,
                field: TIMESTAMP_COLUMN,
                value: "??".to_string(),
                reason: "invalid timestamp".to_string(),
            }],
        }
    }

    #[test]
    fn test_punch_report() {
        let report = build_report(january_events(), 2025, 1).unwrap();
        let output = format_report(&report);
        assert_snapshot!(output);
    }

    #[test]
    fn test_report_window_excludes_other_months() {
        let report = build_report(january_events(), 2025, 1).unwrap();
        assert_eq!(report.summary.total_events, 6);
    }

    #[test]
    fn test_report_empty_month() {
        let report = build_report(january_events(), 2025, 3).unwrap();
        let output = format_report(&report);
        assert!(output.starts_with("PUNCH REPORT: March 2025\n\nNo punches recorded in March 2025.\n"));
        assert!(output.contains("DATA QUALITY"));
    }

    #[test]
    fn test_report_rejects_bad_month() {
        let err = build_report(january_events(), 2025, 0).unwrap_err();
        assert_eq!(err, ContractViolation::MonthOutOfRange { month: 0 });
    }

    #[test]
    fn test_report_json_output() {
        let report = build_report(january_events(), 2025, 1).unwrap();
        let output = format_report_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["correctly_punched"][0], "Alice Martin");
        assert_eq!(value["incorrectly_punched"][0], "Bob Durand");
        assert_eq!(value["intervals"].as_array().unwrap().len(), 2);
        assert_eq!(value["intervals"][0]["duration_minutes"], 480.0);
        assert_eq!(value["anomalies"][0]["kind"], "replaced_entry");
        assert_eq!(value["summary"]["success_rate"], 83.33);
        assert_eq!(value["summary"]["busiest_day"]["date"], "2025-01-06");
        assert_eq!(value["summary"]["daily_counts"]["2025-01-06"], 4);
        assert_eq!(value["warnings"][0]["line"], 9);
    }

    #[test]
    fn test_run_reads_tab_separated_source() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pointage.tsv");
        std::fs::write(
            &path,
            "Prénom et nom\tDate et heure\tAction\tStatut\n\
             Alice Martin\t2025-01-06 09:00\tPointer entrée\tSuccès\n\
             Alice Martin\t2025-01-06 17:00\tPointer sortie\tSuccès\n\
             Bob Durand\tpas une date\tPointer entrée\tSuccès\n",
        )
        .unwrap();

        let mut cache = SourceCache::new(None);
        let mut output = Vec::new();
        run(&mut output, &mut cache, &path, 2025, 1, false).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("CORRECTLY PUNCHED\n─────────────────\n  Alice Martin\n"));
        assert!(output.contains("Success rate:  100.00%"));
        assert!(output.contains("line 4: Date et heure \"pas une date\": invalid timestamp"));
    }
}
