//! List and slot queries over a [`MeetingStore`].

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::SchedulerConfig;
use crate::error::{Result, ScheduleError};
use crate::frontier::OccurrenceFrontier;
use crate::merger::ScheduleMerger;
use crate::model::{truncate_to_minute, Meeting, QueryWindow};
use crate::slot;
use crate::store::MeetingStore;

/// Entry point for the two schedule queries.
///
/// Every query opens its own merger; nothing is shared between calls.
#[derive(Debug, Clone)]
pub struct Scheduler<S> {
    store: S,
    config: SchedulerConfig,
}

impl<S: MeetingStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: SchedulerConfig::default(),
        }
    }

    /// # Errors
    /// Returns `ScheduleError::InvalidConfig` if `config` fails validation.
    pub fn with_config(store: S, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Open the merged occurrence sequence for `window`.
    ///
    /// The frontier is seeded from recurring templates stored before the
    /// window start; the base stream covers every stored row overlapping the
    /// window. Computed occurrences never extend past `window.end`.
    pub fn schedule(&self, window: &QueryWindow) -> Result<ScheduleMerger<'_>> {
        let templates = self
            .store
            .find_recurring_templates_starting_before(&window.participants, window.start)?;
        let frontier = OccurrenceFrontier::seed(templates, window.start, window.end)?;
        let stream = self.store.find_participant_meetings(window)?;
        Ok(ScheduleMerger::new(frontier, stream, window.end))
    }

    /// Every occurrence involving `participants` that overlaps `[start, end)`,
    /// in start order. An empty window yields no occurrences.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidWindow` if `end` is before `start`
    /// once both are truncated to the minute.
    pub fn list_occurrences<I, P>(
        &self,
        participants: I,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Meeting>>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let window = QueryWindow::new(participants, start, Some(end));
        if window.participants.is_empty() {
            return Err(ScheduleError::NoParticipants);
        }
        let end = truncate_to_minute(end);
        match end.cmp(&window.start) {
            Ordering::Less => {
                return Err(ScheduleError::InvalidWindow {
                    start: window.start,
                    end,
                })
            }
            Ordering::Equal => return Ok(Vec::new()),
            Ordering::Greater => {}
        }

        let occurrences = self
            .schedule(&window)?
            .filter(|item| item.as_ref().map_or(true, |m| self.is_busy(m, &window)))
            .collect::<Result<Vec<_>>>()?;

        info!(
            participants = ?window.participants,
            start = %window.start,
            end = ?window.end,
            count = occurrences.len(),
            "listed occurrences"
        );
        Ok(occurrences)
    }

    /// The earliest instant at or after `earliest_start` at which every
    /// participant is free for `duration_minutes`.
    ///
    /// The search looks at most `slot_search.horizon_days` past its start.
    ///
    /// # Errors
    /// Returns `ScheduleError::NoSlotFound` when the horizon is exhausted,
    /// `ScheduleError::UnknownParticipants` if any participant does not
    /// exist in the store, and `ScheduleError::InvalidConfig` if the horizon
    /// end is not representable.
    pub fn find_slot<I, P>(
        &self,
        participants: I,
        earliest_start: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Result<DateTime<Utc>>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut window = QueryWindow::new(participants, earliest_start, None);
        self.validate_participants(&window.participants)?;
        let horizon_end = window
            .start
            .checked_add_signed(self.config.slot_search.horizon())
            .ok_or_else(|| {
                ScheduleError::InvalidConfig(format!(
                    "slot search horizon from {} is out of range",
                    window.start
                ))
            })?;
        window.end = Some(horizon_end);

        let busy = self
            .schedule(&window)?
            .filter(|item| item.as_ref().map_or(true, |m| self.is_busy(m, &window)));
        let slot = slot::find_slot(busy, window.start, duration_minutes, horizon_end)?;

        info!(
            participants = ?window.participants,
            from = %window.start,
            duration_minutes,
            %slot,
            "found slot"
        );
        Ok(slot)
    }

    /// Check that `participants` is non-empty and names only existing users.
    pub fn validate_participants(&self, participants: &BTreeSet<String>) -> Result<()> {
        if participants.is_empty() {
            return Err(ScheduleError::NoParticipants);
        }
        let found = self.store.count_existing_users(participants)?;
        if found != participants.len() {
            return Err(ScheduleError::UnknownParticipants {
                expected: participants.len(),
                found,
            });
        }
        Ok(())
    }

    fn is_busy(&self, occurrence: &Meeting, window: &QueryWindow) -> bool {
        self.config.declined_is_busy || occurrence.involves_attending(&window.participants)
    }
}
