//! Pending occurrences of recurring meetings, ordered by start time.
//!
//! The frontier holds at most one not-yet-emitted occurrence per recurring
//! template. Popping an occurrence schedules its successor, so a series is
//! expanded one step at a time for as long as the query needs it.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};

use crate::error::Result;
use crate::model::Meeting;
use crate::recurrence::advance;

/// Heap entry. Ordered by start, then by insertion sequence so that equal
/// starts pop in the order they were pushed.
#[derive(Debug)]
struct Pending {
    start: DateTime<Utc>,
    seq: u64,
    occurrence: Meeting,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start, self.seq).cmp(&(other.start, other.seq))
    }
}

/// Min-priority queue of the next due occurrence of each active series.
#[derive(Debug, Default)]
pub struct OccurrenceFrontier {
    heap: BinaryHeap<Reverse<Pending>>,
    next_seq: u64,
}

impl OccurrenceFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frontier from the recurring templates of a query.
    ///
    /// Only templates stored before `query_start` are considered; later ones
    /// come through the base stream. For each, the first occurrence starting
    /// at or after `query_start` is queued, unless an earlier occurrence is
    /// still running at `query_start`, in which case that one is queued
    /// instead. Templates whose stored row still runs at `query_start` are
    /// skipped: the base stream yields that row and the merger schedules its
    /// successor from there.
    ///
    /// # Errors
    /// Returns `ScheduleError::UnsupportedRecurrence` if any template has a
    /// cadence other than `Daily`.
    pub fn seed<I>(
        templates: I,
        query_start: DateTime<Utc>,
        upper_bound: Option<DateTime<Utc>>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Meeting>,
    {
        let mut frontier = Self::new();
        let day = TimeDelta::days(1);

        for template in templates {
            if !template.is_recurring() || template.start >= query_start {
                continue;
            }
            if template.end > query_start {
                trace!(id = ?template.id, "stored row overlaps query start; left to the stream");
                continue;
            }

            let mut occurrence = advance(&template, Some(query_start))?;
            while occurrence.end - day > query_start && occurrence.start - day > template.start {
                occurrence.start -= day;
                occurrence.end -= day;
            }
            frontier.push(occurrence, upper_bound);
        }

        debug!(pending = frontier.len(), %query_start, "seeded occurrence frontier");
        Ok(frontier)
    }

    /// Queue `occurrence` if it starts before `upper_bound`. Returns whether
    /// it was queued.
    pub fn push(&mut self, occurrence: Meeting, upper_bound: Option<DateTime<Utc>>) -> bool {
        if upper_bound.is_some_and(|bound| occurrence.start >= bound) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Pending {
            start: occurrence.start,
            seq,
            occurrence,
        }));
        true
    }

    /// Queue the occurrence that follows `occurrence`, subject to `upper_bound`.
    ///
    /// # Errors
    /// Returns `ScheduleError::UnsupportedRecurrence` if `occurrence` is not
    /// a `Daily` meeting.
    pub fn push_successor(
        &mut self,
        occurrence: &Meeting,
        upper_bound: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let successor = advance(occurrence, None)?;
        self.push(successor, upper_bound);
        Ok(())
    }

    pub fn peek_min(&self) -> Option<&Meeting> {
        self.heap.peek().map(|Reverse(pending)| &pending.occurrence)
    }

    /// Remove the earliest occurrence and queue its successor if the
    /// successor starts before `upper_bound`.
    ///
    /// On error the frontier is left unchanged.
    pub fn pop_and_advance(&mut self, upper_bound: Option<DateTime<Utc>>) -> Result<Option<Meeting>> {
        let Some(next) = self.peek_min() else {
            return Ok(None);
        };
        let successor = advance(next, None)?;
        let popped = self.heap.pop().map(|Reverse(pending)| pending.occurrence);
        self.push(successor, upper_bound);
        Ok(popped)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
