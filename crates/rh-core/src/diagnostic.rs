//! Non-fatal diagnostics collected while parsing source rows.

use std::fmt;

use serde::Serialize;

/// A single source row that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataQualityWarning {
    /// 1-based line in the source table (the header is line 1).
    pub line: usize,
    /// Column that made the row unusable.
    pub field: &'static str,
    /// The offending value as it appeared in the source.
    pub value: String,
    pub reason: String,
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} {:?}: {}",
            self.line, self.field, self.value, self.reason
        )
    }
}

/// Records that survived parsing, plus the warnings for those that did not.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub warnings: Vec<DataQualityWarning>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
