//! Recurrence advance -- computes concrete occurrences of recurring meetings.
//!
//! Occurrences are produced one at a time: [`advance`] either steps an
//! occurrence to its successor or projects a template onto a reference day.
//! Nothing here performs I/O or keeps state between calls.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Result, ScheduleError};
use crate::model::{overlaps, truncate_to_minute, Meeting, Recurrence};

/// Compute the next occurrence of a recurring meeting.
///
/// # Arguments
/// - `template` -- a stored recurring meeting, or an occurrence previously
///   computed from one
/// - `reference_day` -- `None` to step to the occurrence after `template`;
///   `Some(day)` to get the first occurrence that starts no earlier than `day`
///
/// With a reference day, the template's start clock time (seconds zeroed) is
/// placed on `day`'s calendar date and the end follows after the template's
/// duration, so a meeting that runs past midnight keeps ending on the next
/// date. If that start falls before `day`, the occurrence moves one day later.
///
/// The returned occurrence never carries the template's store id, and
/// `end - start` always equals the template's duration.
///
/// # Errors
/// Returns `ScheduleError::UnsupportedRecurrence` for every cadence other than
/// `Daily`, including `Recurrence::None`.
pub fn advance(template: &Meeting, reference_day: Option<DateTime<Utc>>) -> Result<Meeting> {
    match template.recurrence {
        Recurrence::Daily => Ok(advance_daily(template, reference_day)),
        kind @ (Recurrence::None
        | Recurrence::WorkingDays
        | Recurrence::Weekly
        | Recurrence::Monthly
        | Recurrence::Yearly) => Err(ScheduleError::UnsupportedRecurrence(kind)),
    }
}

fn advance_daily(template: &Meeting, reference_day: Option<DateTime<Utc>>) -> Meeting {
    let day = TimeDelta::days(1);
    let mut next = template.clone();
    next.id = None;

    match reference_day {
        None => {
            next.start += day;
            next.end += day;
        }
        Some(reference) => {
            let duration = template.duration();
            let projected = reference.date_naive().and_time(template.start.time()).and_utc();
            let mut start = truncate_to_minute(projected);
            if start < reference {
                start += day;
            }
            next.start = start;
            next.end = start + duration;
        }
    }

    next
}

/// Expand every occurrence of `template` that overlaps `[start, end)`.
///
/// The stored row itself is the first occurrence. One-off meetings yield at
/// most themselves.
///
/// This is a bounded reference expansion: it walks the series from the
/// template's own start and materializes every instance up to `end`, so its
/// cost grows with the distance from the stored row. Queries go through
/// [`crate::merger::ScheduleMerger`] instead, which never calls it; use this
/// for small ranges or to cross-check merged output.
///
/// # Errors
/// Returns `ScheduleError::UnsupportedRecurrence` for recurring templates
/// whose cadence is not `Daily`.
pub fn expand(template: &Meeting, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Meeting>> {
    let (start, end) = (truncate_to_minute(start), truncate_to_minute(end));
    let mut occurrences = Vec::new();
    if overlaps(template, start, Some(end)) {
        occurrences.push(template.clone());
    }
    if !template.is_recurring() {
        return Ok(occurrences);
    }

    let mut current = advance(template, None)?;
    while current.start < end {
        if overlaps(&current, start, Some(end)) {
            occurrences.push(current.clone());
        }
        current = advance(&current, None)?;
    }
    Ok(occurrences)
}
