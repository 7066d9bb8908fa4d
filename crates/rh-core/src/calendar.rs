//! Month boundary helpers shared by both pipelines.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ContractViolation;

/// First day of the month, validating the month number.
pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, ContractViolation> {
    if !(1..=12).contains(&month) {
        return Err(ContractViolation::MonthOutOfRange { month });
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ContractViolation::UnrepresentableMonth { year, month })
}

/// Last day of the month, validating the month number.
pub fn last_of_month(year: i32, month: u32) -> Result<NaiveDate, ContractViolation> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt())
        .filter(|last| *last >= first)
        .ok_or(ContractViolation::UnrepresentableMonth { year, month })
}

/// Half-open `[start, end)` bounds of a month as wall-clock timestamps.
pub fn month_bounds(
    year: i32,
    month: u32,
) -> Result<(NaiveDateTime, NaiveDateTime), ContractViolation> {
    let first = first_of_month(year, month)?;
    let last = last_of_month(year, month)?;
    let end = last
        .succ_opt()
        .ok_or(ContractViolation::UnrepresentableMonth { year, month })?;
    Ok((
        first.and_time(NaiveTime::MIN),
        end.and_time(NaiveTime::MIN),
    ))
}
