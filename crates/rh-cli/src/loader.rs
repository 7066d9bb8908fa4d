//! Delimited-text loading with per-source memoization.
//!
//! Sources are comma, semicolon or tab separated tables with a header row.
//! Column names are validated here; individual row problems are left to
//! `rh_core::table`, which drops bad rows with a warning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result, bail};
use rh_core::table::{LEAVE_COLUMNS, LeaveRow, PUNCH_COLUMNS, PunchRow};

/// A loaded table: trimmed header names and raw rows tagged with their line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    /// Parses delimited text. When `delimiter` is `None` it is sniffed from the header line.
    pub fn parse(content: &str, delimiter: Option<char>) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let delimiter = match delimiter {
            Some(c) => u8::try_from(c).with_context(|| format!("delimiter {c:?} is not ASCII"))?,
            None => sniff_delimiter(content.lines().next().unwrap_or("")),
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .context("failed to read header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("failed to read row {}", idx + 1))?;
            let line = record
                .position()
                .map_or(idx + 2, |p| usize::try_from(p.line()).unwrap_or(idx + 2));
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push((line, record.iter().map(str::to_string).collect()));
        }

        Ok(Self { headers, rows })
    }

    /// Index of each named column, failing on the first missing one.
    fn require_columns<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N]> {
        let mut indices = [0; N];
        for (slot, name) in indices.iter_mut().zip(names) {
            let Some(idx) = self.headers.iter().position(|h| h == name) else {
                bail!(
                    "missing column {name:?} (found: {})",
                    self.headers.join(", ")
                );
            };
            *slot = idx;
        }
        Ok(indices)
    }

    /// Maps the table onto leave rows.
    pub fn leave_rows(&self) -> Result<Vec<LeaveRow>> {
        let [person, kind, start, end, justification] = self.require_columns(LEAVE_COLUMNS)?;
        Ok(self
            .rows
            .iter()
            .map(|(line, fields)| LeaveRow {
                line: *line,
                person: field(fields, person),
                kind: field(fields, kind),
                start: field(fields, start),
                end: field(fields, end),
                justification: field(fields, justification),
            })
            .collect())
    }

    /// Maps the table onto punch rows.
    pub fn punch_rows(&self) -> Result<Vec<PunchRow>> {
        let [person, timestamp, action, status] = self.require_columns(PUNCH_COLUMNS)?;
        Ok(self
            .rows
            .iter()
            .map(|(line, fields)| PunchRow {
                line: *line,
                person: field(fields, person),
                timestamp: field(fields, timestamp),
                action: field(fields, action),
                status: field(fields, status),
            })
            .collect())
    }
}

fn field(fields: &[String], idx: usize) -> String {
    fields.get(idx).cloned().unwrap_or_default()
}

/// Picks the most frequent of tab, semicolon and comma in the header line.
pub fn sniff_delimiter(header: &str) -> u8 {
    [b'\t', b';', b',']
        .into_iter()
        .map(|d| (d, header.bytes().filter(|b| *b == d).count()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map_or(b',', |(d, _)| d)
}

/// Identity of a source on disk. A change in any part means the source changed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceKey {
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceKey {
    fn of(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?;
        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// Memoizes loaded tables by canonical path, reloading when the file changes.
#[derive(Debug, Default)]
pub struct SourceCache {
    delimiter: Option<char>,
    entries: HashMap<PathBuf, (SourceKey, Table)>,
    loads: usize,
}

impl SourceCache {
    pub fn new(delimiter: Option<char>) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Returns the table for `path`, reading it only if it is new or changed.
    pub fn get(&mut self, path: &Path) -> Result<&Table> {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("source not found: {}", path.display()))?;
        let key = SourceKey::of(&canonical)?;

        let fresh = self
            .entries
            .get(&canonical)
            .is_some_and(|(cached, _)| *cached == key);
        if fresh {
            tracing::debug!(path = %canonical.display(), "source cache hit");
        } else {
            let content = std::fs::read_to_string(&canonical)
                .with_context(|| format!("failed to read {}", canonical.display()))?;
            let table = Table::parse(&content, self.delimiter)
                .with_context(|| format!("failed to parse {}", canonical.display()))?;
            tracing::debug!(
                path = %canonical.display(),
                rows = table.rows.len(),
                "loaded source"
            );
            self.loads += 1;
            self.entries.insert(canonical.clone(), (key, table));
        }

        self.entries
            .get(&canonical)
            .map(|(_, table)| table)
            .context("source cache entry missing after load")
    }

    /// Drops the cached table for `path`. Returns whether anything was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&canonical).is_some()
    }

    /// Number of times a source was actually read from disk.
    pub const fn loads(&self) -> usize {
        self.loads
    }
}
