//! Shared utilities for CLI commands.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDateTime;
use rh_core::DataQualityWarning;

/// Timestamp format used in every rendered table.
pub const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M";

/// Picks the source given on the command line, falling back to the configured one.
pub fn resolve_source(
    explicit: Option<&Path>,
    configured: Option<&Path>,
    what: &str,
) -> anyhow::Result<PathBuf> {
    explicit
        .or(configured)
        .map(Path::to_path_buf)
        .with_context(|| format!("no {what} source given; pass --file or set it in the config"))
}

/// Formats a timestamp for display.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_DISPLAY).to_string()
}

/// Formats minutes as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour. Partial minutes are floored.
/// Negative durations are treated as 0m.
#[allow(clippy::cast_possible_truncation)]
pub fn format_minutes(minutes: f64) -> String {
    if minutes.is_nan() || minutes < 0.0 {
        return "0m".to_string();
    }
    let total_minutes = minutes.floor() as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: usize, max: usize) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Writes an underlined section title preceded by a blank line.
pub fn section(output: &mut String, title: &str) {
    writeln!(output).unwrap();
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();
}

/// Appends the data-quality section when any rows were skipped.
pub fn write_warnings(output: &mut String, warnings: &[DataQualityWarning]) {
    if warnings.is_empty() {
        return;
    }
    section(output, "DATA QUALITY");
    for warning in warnings {
        writeln!(output, "  {warning}").unwrap();
    }
}

/// "1 punch", "2 punches".
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes_hours_and_minutes() {
        assert_eq!(format_minutes(150.0), "2h 30m");
        assert_eq!(format_minutes(60.0), "1h 0m");
        assert_eq!(format_minutes(480.0), "8h 0m");
    }

    #[test]
    fn test_format_minutes_floors_seconds() {
        assert_eq!(format_minutes(45.9), "45m");
    }

    #[test]
    fn test_format_minutes_negative_is_zero() {
        assert_eq!(format_minutes(-1.0), "0m");
        assert_eq!(format_minutes(f64::NAN), "0m");
    }

    #[test]
    fn test_progress_bar_partial() {
        assert_eq!(progress_bar(100, 100), "██████████");
        assert_eq!(progress_bar(50, 100), "█████░░░░░");
        assert_eq!(progress_bar(1, 4), "███░░░░░░░");
        assert_eq!(progress_bar(1, 100), "█░░░░░░░░░");
        assert_eq!(progress_bar(0, 0), "░░░░░░░░░░");
    }

    #[test]
    fn test_resolve_source_prefers_explicit() {
        let explicit = Path::new("a.csv");
        let configured = Path::new("b.csv");
        assert_eq!(
            resolve_source(Some(explicit), Some(configured), "leave").unwrap(),
            PathBuf::from("a.csv")
        );
        assert_eq!(
            resolve_source(None, Some(configured), "leave").unwrap(),
            PathBuf::from("b.csv")
        );
        let err = resolve_source(None, None, "punch").unwrap_err();
        assert!(err.to_string().contains("no punch source"));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "punch", "punches"), "1 punch");
        assert_eq!(plural(4, "punch", "punches"), "4 punches");
    }
}
