//! End-to-end tests for the `rh` binary.
//!
//! Each test runs the real binary against tables written to a temp directory,
//! with `HOME` and `XDG_CONFIG_HOME` pointed at it so no user config leaks in.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const PUNCHES: &str = "\
Prénom et nom,Date et heure,Action,Statut
Alice Martin,2025-01-06 08:00,Pointer entrée,Succès
Alice Martin,2025-01-06 17:00,Pointer sortie,Succès
Bob Durand,2025-01-06 09:00,Pointer entrée,Échec
Bob Durand,2025-01-07 09:00,Pointer entrée,Succès
Alice Martin,2025-02-03 08:00,Pointer entrée,Succès
";

const LEAVES: &str = "\
Prénom et nom;Type de congé;Début;Fin;Justification
Alice Martin;Congé payé;10/03/2025;12/03/2025;Vacances
Bob Durand;Maladie;2025-03-11;2025-03-11;
Chloé Petit;Congé payé;2024-12-30;2025-01-02;
";

fn rh_binary() -> String {
    env!("CARGO_BIN_EXE_rh").to_string()
}

fn write_table(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Builds a command isolated from the user's config and `RH_*` variables.
fn rh(home: &Path) -> Command {
    let mut cmd = Command::new(rh_binary());
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RH_LEAVE_SOURCE")
        .env_remove("RH_PUNCH_SOURCE")
        .env_remove("RH_YEAR")
        .env_remove("RH_DELIMITER")
        .env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run rh")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "rh should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = run(&mut rh(temp.path()));
    let out = stdout(&output);
    assert!(out.contains("Usage"), "expected help text, got: {out}");
    assert!(out.contains("leave"));
    assert!(out.contains("punch"));
}

#[test]
fn test_punch_report_classifies_people() {
    let temp = TempDir::new().unwrap();
    let punches = write_table(temp.path(), "punches.csv", PUNCHES);

    let output = run(rh(temp.path())
        .args(["punch", "report", "--year", "2025", "--month", "1", "--file"])
        .arg(&punches));
    let out = stdout(&output);

    assert!(out.starts_with("PUNCH REPORT: January 2025"));
    let correct = out.split("CORRECTLY PUNCHED").nth(1).unwrap();
    assert!(correct.contains("Alice Martin"));
    let incorrect = out.split("INCORRECTLY PUNCHED").nth(1).unwrap();
    assert!(incorrect.contains("Bob Durand"));
    assert!(out.contains("Records:       4"));
}

#[test]
fn test_punch_report_json() {
    let temp = TempDir::new().unwrap();
    let punches = write_table(temp.path(), "punches.csv", PUNCHES);

    let output = run(rh(temp.path())
        .args(["punch", "report", "--year", "2025", "--month", "1", "--json", "--file"])
        .arg(&punches));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();

    assert_eq!(json["month"], 1);
    assert_eq!(json["correctly_punched"], serde_json::json!(["Alice Martin"]));
    assert_eq!(json["incorrectly_punched"], serde_json::json!(["Bob Durand"]));
    assert_eq!(json["intervals"].as_array().unwrap().len(), 1);
    assert_eq!(json["intervals"][0]["duration_minutes"], 540.0);
    assert_eq!(json["summary"]["total_events"], 4);
    assert_eq!(json["summary"]["success_rate"], 75.0);
    assert_eq!(json["anomalies"][0]["kind"], "replaced_entry");
}

#[test]
fn test_punch_report_rejects_month_out_of_range() {
    let temp = TempDir::new().unwrap();
    let punches = write_table(temp.path(), "punches.csv", PUNCHES);

    let output = run(rh(temp.path())
        .args(["punch", "report", "--year", "2025", "--month", "13", "--file"])
        .arg(&punches));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("month must be between 1 and 12"),
        "unexpected error: {stderr}"
    );
}

#[test]
fn test_missing_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let output = run(rh(temp.path()).args(["punch", "report", "--month", "1"]));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no punch source given"), "unexpected error: {stderr}");
}

#[test]
fn test_missing_column_is_an_error() {
    let temp = TempDir::new().unwrap();
    let punches = write_table(
        temp.path(),
        "punches.csv",
        "Prénom et nom,Date et heure,Action\nAlice Martin,2025-01-06 08:00,Pointer entrée\n",
    );

    let output = run(rh(temp.path())
        .args(["punch", "report", "--year", "2025", "--month", "1", "--file"])
        .arg(&punches));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Statut"), "unexpected error: {stderr}");
}

#[test]
fn test_sources_fall_back_to_environment() {
    let temp = TempDir::new().unwrap();
    let punches = write_table(temp.path(), "punches.csv", PUNCHES);

    let output = run(rh(temp.path())
        .env("RH_PUNCH_SOURCE", &punches)
        .env("RH_YEAR", "2025")
        .args(["punch", "report", "--month", "2"]));
    let out = stdout(&output);

    assert!(out.starts_with("PUNCH REPORT: February 2025"));
    assert!(out.contains("Alice Martin"));
}

#[test]
fn test_leave_day_reads_semicolon_table() {
    let temp = TempDir::new().unwrap();
    let leaves = write_table(temp.path(), "leaves.csv", LEAVES);

    let output = run(rh(temp.path())
        .args(["leave", "day", "--date", "11/03/2025", "--file"])
        .arg(&leaves));
    let out = stdout(&output);

    assert!(out.starts_with("LEAVE ON Tuesday, Mar 11, 2025"));
    assert!(out.contains("Alice Martin (Congé payé): Vacances"));
    assert!(out.contains("Bob Durand (Maladie)"));
    assert!(!out.contains("Chloé Petit"));
}

#[test]
fn test_leave_calendar_single_month() {
    let temp = TempDir::new().unwrap();
    let leaves = write_table(temp.path(), "leaves.csv", LEAVES);

    let output = run(rh(temp.path())
        .args(["leave", "calendar", "--year", "2025", "--month", "3", "--file"])
        .arg(&leaves));
    let out = stdout(&output);

    assert!(out.contains("March 2025"));
    assert!(out.contains("Vacances"));
    assert!(!out.contains("January 2025"));
}

#[test]
fn test_leave_occupancy_json_from_config_file() {
    let temp = TempDir::new().unwrap();
    let leaves = write_table(temp.path(), "leaves.csv", LEAVES);
    let config = temp.path().join("rh.toml");
    std::fs::write(
        &config,
        format!("leave_source = {:?}\nyear = 2025\n", leaves.display().to_string()),
    )
    .unwrap();

    let output = run(rh(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["leave", "occupancy", "--json"]));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();

    assert_eq!(json["year"], 2025);
    let days = json["days"].as_array().unwrap();
    // Chloé's leave counts only from Jan 1, then Alice and Bob overlap on Mar 11.
    let dates: Vec<&str> = days.iter().map(|d| d["date"].as_str().unwrap()).collect();
    assert_eq!(
        dates,
        [
            "2025-01-01",
            "2025-01-02",
            "2025-03-10",
            "2025-03-11",
            "2025-03-12"
        ]
    );
    assert_eq!(days[3]["count"], 2);
    assert_eq!(days[3]["severity"], "low");
}
