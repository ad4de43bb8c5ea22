//! Persistence collaborator contract and an in-memory implementation.
//!
//! The engine reads stored meetings only through [`MeetingStore`]. The
//! [`InMemoryStore`] backs the CLI and the test suites.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StreamError};
use crate::model::{truncate_to_minute, Meeting, QueryWindow, User};

/// A lazy, ascending-by-start sequence of stored meeting rows.
///
/// Not restartable. Dropping the stream releases the underlying cursor, which
/// happens on every exit path of the query that owns it.
pub type MeetingStream<'a> = Box<dyn Iterator<Item = Result<Meeting, StreamError>> + 'a>;

pub trait MeetingStore {
    /// Stored rows that involve any of `window.participants` (as owner or
    /// invitee) and overlap the window, sorted ascending by start.
    fn find_participant_meetings(&self, window: &QueryWindow) -> Result<MeetingStream<'_>, StoreError>;

    /// Recurring rows that involve any of `participants` and start strictly
    /// before `instant`.
    fn find_recurring_templates_starting_before(
        &self,
        participants: &BTreeSet<String>,
        instant: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, StoreError>;

    /// Number of `logins` that belong to existing users.
    fn count_existing_users(&self, logins: &BTreeSet<String>) -> Result<usize, StoreError>;
}

/// Serialized form of an [`InMemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: Vec<User>,
    meetings: Vec<Meeting>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load users first, then meetings, applying the same checks as
    /// [`InMemoryStore::add_user`] and [`InMemoryStore::add_meeting`].
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for login in snapshot.users {
            store.add_user(login)?;
        }
        for meeting in snapshot.meetings {
            store.add_meeting(meeting)?;
        }
        debug!(
            users = store.users.len(),
            meetings = store.meetings.len(),
            "loaded snapshot"
        );
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    pub fn add_user(&mut self, login: impl Into<String>) -> Result<User, StoreError> {
        let login = login.into();
        if self.users.iter().any(|u| u.login == login) {
            return Err(StoreError::DuplicateUser(login));
        }
        let user = User {
            id: Some(Uuid::new_v4().to_string()),
            login,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    /// Store a meeting after checking that its owner and invitees exist.
    ///
    /// Both instants are truncated to the minute. A meeting without an id is
    /// given a fresh one.
    pub fn add_meeting(&mut self, meeting: Meeting) -> Result<Meeting, StoreError> {
        let unknown: Vec<String> = meeting
            .logins()
            .filter(|login| !self.users.iter().any(|u| u.login == *login))
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(StoreError::UnknownUsers(unknown));
        }

        let mut meeting = meeting.truncated();
        if meeting.id.is_none() {
            meeting.id = Some(Uuid::new_v4().to_string());
        }
        self.meetings.push(meeting.clone());
        Ok(meeting)
    }

    pub fn get_meeting(&self, id: &str) -> Result<&Meeting, StoreError> {
        self.meetings
            .iter()
            .find(|m| m.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::MeetingNotFound(id.to_string()))
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }
}

impl MeetingStore for InMemoryStore {
    fn find_participant_meetings(&self, window: &QueryWindow) -> Result<MeetingStream<'_>, StoreError> {
        let mut rows: Vec<&Meeting> = self
            .meetings
            .iter()
            .filter(|m| m.involves(&window.participants) && window.overlaps(m))
            .collect();
        rows.sort_by_key(|m| m.start);
        Ok(Box::new(rows.into_iter().cloned().map(Ok)))
    }

    fn find_recurring_templates_starting_before(
        &self,
        participants: &BTreeSet<String>,
        instant: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, StoreError> {
        let instant = truncate_to_minute(instant);
        Ok(self
            .meetings
            .iter()
            .filter(|m| m.is_recurring() && m.start < instant && m.involves(participants))
            .cloned()
            .collect())
    }

    fn count_existing_users(&self, logins: &BTreeSet<String>) -> Result<usize, StoreError> {
        Ok(self
            .users
            .iter()
            .filter(|u| logins.contains(&u.login))
            .count())
    }
}
