//! Caller errors.

use thiserror::Error;

/// A caller supplied a parameter outside the accepted range.
///
/// These are programming errors; callers are expected to surface them rather
/// than recover.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("month must be between 1 and 12, got {month}")]
    MonthOutOfRange { month: u32 },

    #[error("{year}-{month:02} is not a representable calendar month")]
    UnrepresentableMonth { year: i32, month: u32 },
}
