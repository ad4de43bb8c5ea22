//! Meeting, invitation and query-window types.
//!
//! All instants are UTC and carry minute granularity: seconds and sub-second
//! components are discarded whenever a meeting is written or a window is built.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Recurrence cadence of a stored meeting.
///
/// Only `Daily` has defined semantics; the remaining cadences are accepted in
/// stored data but fail when an occurrence has to be computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    WorkingDays,
    Weekly,
    Monthly,
    Yearly,
}

/// Invitee's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AcceptanceState {
    #[default]
    NotReviewed,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub invitee: String,
    #[serde(default)]
    pub accepted: AcceptanceState,
}

impl Invitation {
    pub fn new(invitee: impl Into<String>) -> Self {
        Self {
            invitee: invitee.into(),
            accepted: AcceptanceState::NotReviewed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub login: String,
}

/// A stored meeting, or one synthesized occurrence of a recurring meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// Store identity. Absent until persisted, and always absent on
    /// occurrences computed from a recurring template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner: String,
    #[serde(default)]
    pub invited: Vec<Invitation>,
    #[serde(rename = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub description: String,
}

impl Meeting {
    /// Creates a one-off meeting with no invitees. Both instants are
    /// truncated to the minute.
    pub fn new(owner: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            owner: owner.into(),
            invited: Vec::new(),
            start: truncate_to_minute(start),
            end: truncate_to_minute(end),
            recurrence: Recurrence::None,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_invitee(mut self, invitee: impl Into<String>) -> Self {
        self.invited.push(Invitation::new(invitee));
        self
    }

    #[must_use]
    pub fn with_invitation(mut self, invitation: Invitation) -> Self {
        self.invited.push(invitation);
        self
    }

    #[must_use]
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the meeting with both instants truncated to the minute.
    #[must_use]
    pub fn truncated(mut self) -> Self {
        self.start = truncate_to_minute(self.start);
        self.end = truncate_to_minute(self.end);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence != Recurrence::None
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Owner followed by every invitee, in invitation order.
    pub fn logins(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.owner.as_str()).chain(self.invited.iter().map(|i| i.invitee.as_str()))
    }

    /// True when the owner or any invitee, whatever their answer, is in `participants`.
    pub fn involves(&self, participants: &BTreeSet<String>) -> bool {
        self.logins().any(|login| participants.contains(login))
    }

    /// Like [`Meeting::involves`], but invitees who declined do not count.
    pub fn involves_attending(&self, participants: &BTreeSet<String>) -> bool {
        participants.contains(&self.owner)
            || self
                .invited
                .iter()
                .any(|i| i.accepted != AcceptanceState::Declined && participants.contains(&i.invitee))
    }
}

/// Participants and time range of one list or slot query.
///
/// Bounds are truncated to the minute on construction; `end == None` means
/// the window is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    pub participants: BTreeSet<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl QueryWindow {
    pub fn new<I, S>(participants: I, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            participants: participants.into_iter().map(Into::into).collect(),
            start: truncate_to_minute(start),
            end: end.map(truncate_to_minute),
        }
    }

    /// Window overlap as the base stream applies it.
    ///
    /// A row overlaps `[start, end)` when it starts before `end` and either
    /// starts at or after `start` or ends after it. Zero-length rows placed
    /// exactly at `start` are included.
    pub fn overlaps(&self, meeting: &Meeting) -> bool {
        overlaps(meeting, self.start, self.end)
    }
}

/// True when `meeting` overlaps `[start, end)`; see [`QueryWindow::overlaps`].
pub fn overlaps(meeting: &Meeting, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
    end.is_none_or(|end| meeting.start < end) && (meeting.start >= start || meeting.end > start)
}

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    let secs = instant.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(60), 0).unwrap_or(instant)
}
