//! Time-card reconciliation.
//!
//! Turns an unordered stream of entry/exit punches into work intervals and
//! classifies every person as correctly or incorrectly punched.
//!
//! # Algorithm Summary
//!
//! 1. Group events by person
//! 2. Stable-sort each group by timestamp (ties keep input order)
//! 3. Walk the group with a single open-entry slot:
//!    - a second entry replaces the open one
//!    - an exit closes the slot, emitting an interval when `0 < exit - entry <= 24h`
//!    - an exit with nothing open is dropped
//! 4. A person is correctly punched iff they have at least one entry and at
//!    least one exit anywhere in the window, whether or not any pair matched

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::calendar::month_bounds;
use crate::error::ContractViolation;
use crate::record::PunchEvent;
use crate::types::{PersonName, PunchAction, PunchStatus};

/// Longest span accepted between an entry and its exit.
pub const MAX_SHIFT_HOURS: i64 = 24;

#[allow(clippy::cast_precision_loss)]
fn minutes(span: Duration) -> f64 {
    span.num_seconds() as f64 / 60.0
}

/// A matched entry/exit pair.
///
/// `exit > entry` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkInterval {
    pub person: PersonName,
    pub entry: NaiveDateTime,
    pub exit: NaiveDateTime,
    pub duration_minutes: f64,
}

impl WorkInterval {
    /// Whether the interval ends on a later calendar day than it starts.
    pub fn crosses_midnight(&self) -> bool {
        self.exit.date() > self.entry.date()
    }
}

/// A punch the reconciler discarded while walking a person's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PunchAnomaly {
    /// An entry was superseded by a later entry before any exit.
    ReplacedEntry {
        person: PersonName,
        discarded: NaiveDateTime,
        replacement: NaiveDateTime,
    },
    /// An exit arrived with no open entry.
    OrphanExit { person: PersonName, at: NaiveDateTime },
    /// The pair spanned zero time or more than [`MAX_SHIFT_HOURS`].
    RejectedPair {
        person: PersonName,
        entry: NaiveDateTime,
        exit: NaiveDateTime,
    },
    /// The stream ended with an entry still open.
    UnclosedEntry { person: PersonName, entry: NaiveDateTime },
}

impl PunchAnomaly {
    pub const fn person(&self) -> &PersonName {
        match self {
            Self::ReplacedEntry { person, .. }
            | Self::OrphanExit { person, .. }
            | Self::RejectedPair { person, .. }
            | Self::UnclosedEntry { person, .. } => person,
        }
    }
}

/// Result of reconciling one reporting window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconciliation {
    /// Matched intervals, ordered by person then entry time.
    pub intervals: Vec<WorkInterval>,
    pub correctly_punched: BTreeSet<PersonName>,
    pub incorrectly_punched: BTreeSet<PersonName>,
    pub anomalies: Vec<PunchAnomaly>,
}

impl Reconciliation {
    /// Sum of interval durations per person.
    pub fn total_minutes_by_person(&self) -> BTreeMap<&PersonName, f64> {
        let mut totals = BTreeMap::new();
        for interval in &self.intervals {
            *totals.entry(&interval.person).or_insert(0.0) += interval.duration_minutes;
        }
        totals
    }
}

/// Groups events by person, each group stable-sorted by timestamp.
fn group_by_person(events: &[PunchEvent]) -> BTreeMap<&PersonName, Vec<&PunchEvent>> {
    let mut groups: BTreeMap<&PersonName, Vec<&PunchEvent>> = BTreeMap::new();
    for event in events {
        groups.entry(&event.person).or_default().push(event);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|e| e.timestamp);
    }
    groups
}

/// Events whose timestamp falls within `year`/`month`.
pub fn in_month(
    events: &[PunchEvent],
    year: i32,
    month: u32,
) -> Result<Vec<PunchEvent>, ContractViolation> {
    let (start, end) = month_bounds(year, month)?;
    Ok(events
        .iter()
        .filter(|e| e.timestamp >= start && e.timestamp < end)
        .cloned()
        .collect())
}

/// Pairs entries with exits and classifies each person.
///
/// The result depends only on the multiset of events and their relative input
/// order for equal timestamps, so re-running on the same input is idempotent.
pub fn reconcile(events: &[PunchEvent]) -> Reconciliation {
    let max_span = Duration::hours(MAX_SHIFT_HOURS);
    let mut result = Reconciliation::default();

    for (person, group) in group_by_person(events) {
        let mut open: Option<NaiveDateTime> = None;
        let mut has_entry = false;
        let mut has_exit = false;

        for event in group {
            match event.action {
                PunchAction::EntryPunch => {
                    has_entry = true;
                    if let Some(discarded) = open.replace(event.timestamp) {
                        result.anomalies.push(PunchAnomaly::ReplacedEntry {
                            person: person.clone(),
                            discarded,
                            replacement: event.timestamp,
                        });
                    }
                }
                PunchAction::ExitPunch => {
                    has_exit = true;
                    let Some(entry) = open.take() else {
                        result.anomalies.push(PunchAnomaly::OrphanExit {
                            person: person.clone(),
                            at: event.timestamp,
                        });
                        continue;
                    };
                    let span = event.timestamp - entry;
                    if span <= Duration::zero() || span > max_span {
                        result.anomalies.push(PunchAnomaly::RejectedPair {
                            person: person.clone(),
                            entry,
                            exit: event.timestamp,
                        });
                        continue;
                    }
                    result.intervals.push(WorkInterval {
                        person: person.clone(),
                        entry,
                        exit: event.timestamp,
                        duration_minutes: minutes(span),
                    });
                }
            }
        }

        if let Some(entry) = open {
            result.anomalies.push(PunchAnomaly::UnclosedEntry {
                person: person.clone(),
                entry,
            });
        }

        if has_entry && has_exit {
            result.correctly_punched.insert(person.clone());
        } else {
            result.incorrectly_punched.insert(person.clone());
        }
    }

    tracing::debug!(
        events = events.len(),
        intervals = result.intervals.len(),
        anomalies = result.anomalies.len(),
        "reconciled punch window"
    );
    result
}

/// Duration between a person's first entry and first exit in a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstPairDuration {
    pub person: PersonName,
    pub entry: NaiveDateTime,
    /// The exit as recorded, before any overnight adjustment.
    pub exit: NaiveDateTime,
    /// Whether a day was added to the exit because it preceded the entry.
    pub wrapped: bool,
    pub duration_minutes: f64,
}

/// Single first-entry/first-exit duration per person.
///
/// When the first exit precedes the first entry, one day is added to the exit.
/// This covers a single overnight shift and nothing longer. People lacking
/// either kind of punch are omitted.
pub fn first_pair_durations(events: &[PunchEvent]) -> Vec<FirstPairDuration> {
    group_by_person(events)
        .into_iter()
        .filter_map(|(person, group)| {
            let entry = group
                .iter()
                .find(|e| e.action == PunchAction::EntryPunch)?
                .timestamp;
            let exit = group
                .iter()
                .find(|e| e.action == PunchAction::ExitPunch)?
                .timestamp;
            let wrapped = exit < entry;
            let effective_exit = if wrapped { exit + Duration::days(1) } else { exit };
            Some(FirstPairDuration {
                person: person.clone(),
                entry,
                exit,
                wrapped,
                duration_minutes: minutes(effective_exit - entry),
            })
        })
        .collect()
}

/// Number of punches recorded on each calendar day.
pub fn daily_punch_counts(events: &[PunchEvent]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.date()).or_insert(0) += 1;
    }
    counts
}

/// Percentage (0 to 100) of successful punches. Zero for an empty window.
#[allow(clippy::cast_precision_loss)]
pub fn success_rate(events: &[PunchEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let successes = events
        .iter()
        .filter(|e| e.status == PunchStatus::Success)
        .count();
    successes as f64 / events.len() as f64 * 100.0
}

/// A calendar day and its punch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Day with the most punches; ties go to the earliest date.
pub fn busiest_day(counts: &BTreeMap<NaiveDate, usize>) -> Option<DayCount> {
    counts
        .iter()
        .fold(None, |best: Option<DayCount>, (&date, &count)| match best {
            Some(b) if b.count >= count => Some(b),
            _ => Some(DayCount { date, count }),
        })
}

/// Day with the fewest punches; ties go to the earliest date.
pub fn quietest_day(counts: &BTreeMap<NaiveDate, usize>) -> Option<DayCount> {
    counts
        .iter()
        .fold(None, |best: Option<DayCount>, (&date, &count)| match best {
            Some(b) if b.count <= count => Some(b),
            _ => Some(DayCount { date, count }),
        })
}

/// Aggregate figures for a punch window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PunchSummary {
    pub total_events: usize,
    pub unique_people: usize,
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    pub success_rate: f64,
    pub busiest_day: Option<DayCount>,
    pub quietest_day: Option<DayCount>,
}

pub fn summarize(events: &[PunchEvent]) -> PunchSummary {
    let daily_counts = daily_punch_counts(events);
    let unique_people = events
        .iter()
        .map(|e| &e.person)
        .collect::<BTreeSet<_>>()
        .len();
    PunchSummary {
        total_events: events.len(),
        unique_people,
        busiest_day: busiest_day(&daily_counts),
        quietest_day: quietest_day(&daily_counts),
        success_rate: success_rate(events),
        daily_counts,
    }
}
