//! Earliest free slot search over a time-ordered occurrence sequence.
//!
//! Walks occurrences in start order while tracking the end of the latest busy
//! interval seen so far. The first gap between that end and the next
//! occurrence that is long enough is the answer.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::model::{truncate_to_minute, Meeting};

/// Find the earliest instant at or after `earliest_start` that is followed
/// by at least `duration_minutes` of free time.
///
/// `occurrences` must be ordered by non-decreasing start, as produced by
/// [`crate::merger::ScheduleMerger`]. Overlapping and nested occurrences are
/// fine: the busy horizon only ever moves forward. A gap qualifies when it is
/// at least as long as the requested duration.
///
/// Once `occurrences` is exhausted, the space between the busy horizon and
/// `horizon_end` is the last candidate.
///
/// # Errors
/// Returns the first error yielded by `occurrences`, or
/// `ScheduleError::NoSlotFound` when no gap fits before `horizon_end`.
pub fn find_slot<I>(
    occurrences: I,
    earliest_start: DateTime<Utc>,
    duration_minutes: u32,
    horizon_end: DateTime<Utc>,
) -> Result<DateTime<Utc>>
where
    I: IntoIterator<Item = Result<Meeting>>,
{
    let duration = TimeDelta::minutes(i64::from(duration_minutes));
    let mut busy_until = truncate_to_minute(earliest_start);

    for occurrence in occurrences {
        let occurrence = occurrence?;
        if occurrence.start > busy_until && occurrence.start - busy_until >= duration {
            debug!(slot = %busy_until, next_busy = %occurrence.start, "found free slot");
            return Ok(busy_until);
        }
        if occurrence.end > busy_until {
            busy_until = occurrence.end;
        }
    }

    if horizon_end - busy_until >= duration {
        debug!(slot = %busy_until, "free slot after last occurrence");
        return Ok(busy_until);
    }

    warn!(%horizon_end, duration_minutes, "no free slot within search horizon");
    Err(ScheduleError::NoSlotFound { horizon_end })
}
