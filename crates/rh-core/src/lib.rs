//! Core domain logic for the leave calendar and time-card dashboards.
//!
//! This crate contains the pure transformations behind both dashboards:
//! - Table parsing: turning raw rows into typed records, with warnings for skipped rows
//! - Leave resolution: which leaves cover a day, month grids, yearly occupancy
//! - Punch reconciliation: pairing entries with exits and classifying people

pub mod calendar;
pub mod diagnostic;
pub mod error;
pub mod leave;
pub mod punch;
pub mod record;
pub mod table;
pub mod types;

pub use diagnostic::{DataQualityWarning, Parsed};
pub use error::ContractViolation;
pub use leave::{DayCell, MonthGrid, Severity, daily_occupancy, resolve_day, resolve_month_grid};
pub use punch::{
    PunchAnomaly, PunchSummary, Reconciliation, WorkInterval, daily_punch_counts, reconcile,
    success_rate,
};
pub use record::{LeaveRecord, PunchEvent};
pub use types::{PersonName, PunchAction, PunchStatus, ValidationError};
