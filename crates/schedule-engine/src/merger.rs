//! Lazy two-way merge of stored rows and computed recurring occurrences.
//!
//! The base stream yields stored rows in start order; the occurrence frontier
//! yields computed occurrences of recurring meetings in start order. The merger
//! interleaves the two into one ascending sequence without ever materializing
//! or sorting the full result. Each step consumes exactly one item and queues
//! at most one successor, so memory stays proportional to the number of active
//! recurring series.

use std::iter::{Fuse, FusedIterator};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::error::{Result, ScheduleError};
use crate::frontier::OccurrenceFrontier;
use crate::model::Meeting;
use crate::store::MeetingStream;

/// Time-ordered sequence of every busy occurrence for one query.
///
/// Iterating yields `Ok(occurrence)` with non-decreasing start times. The
/// first error (a stream fault or an unsupported recurrence) is yielded once,
/// after which the iterator is exhausted. Dropping the merger drops the base
/// stream, whether or not it was drained.
pub struct ScheduleMerger<'a> {
    frontier: OccurrenceFrontier,
    stream: Fuse<MeetingStream<'a>>,
    pending: Option<Meeting>,
    upper_bound: Option<DateTime<Utc>>,
    fault: Option<ScheduleError>,
    done: bool,
}

impl<'a> ScheduleMerger<'a> {
    /// Combine a seeded frontier with an open base stream. Successors that
    /// start at or after `upper_bound` are never queued.
    pub fn new(
        frontier: OccurrenceFrontier,
        stream: MeetingStream<'a>,
        upper_bound: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            frontier,
            stream: stream.fuse(),
            pending: None,
            upper_bound,
            fault: None,
            done: false,
        }
    }

    /// True while another occurrence (or a recorded fault) is available.
    ///
    /// May pull one row from the base stream and buffer it. A failed pull is
    /// remembered and surfaced by the next call to `next`.
    pub fn has_next(&mut self) -> bool {
        if self.done {
            return false;
        }
        if self.fault.is_some() || self.pending.is_some() {
            return true;
        }
        match self.stream.next() {
            Some(Ok(row)) => {
                self.pending = Some(row);
                true
            }
            Some(Err(err)) => {
                debug!(error = %err, "base stream failed");
                self.fault = Some(err.into());
                true
            }
            None => !self.frontier.is_empty(),
        }
    }

    /// Number of computed occurrences currently queued in the frontier.
    pub fn pending_occurrences(&self) -> usize {
        self.frontier.len()
    }

    fn step(&mut self) -> Result<Option<Meeting>> {
        if !self.has_next() {
            return Ok(None);
        }
        if let Some(fault) = self.fault.take() {
            return Err(fault);
        }

        let frontier_first = match (&self.pending, self.frontier.peek_min()) {
            (None, _) => true,
            (Some(row), Some(computed)) => computed.start < row.start,
            (Some(_), None) => false,
        };
        if frontier_first {
            let occurrence = self.frontier.pop_and_advance(self.upper_bound)?;
            if let Some(occurrence) = &occurrence {
                trace!(start = %occurrence.start, "emitting computed occurrence");
            }
            return Ok(occurrence);
        }

        let Some(row) = self.pending.take() else {
            return Ok(None);
        };
        if row.is_recurring() {
            self.frontier.push_successor(&row, self.upper_bound)?;
        }
        trace!(id = ?row.id, start = %row.start, "emitting stored row");
        Ok(Some(row))
    }
}

impl Iterator for ScheduleMerger<'_> {
    type Item = Result<Meeting>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(occurrence)) => Some(Ok(occurrence)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for ScheduleMerger<'_> {}
