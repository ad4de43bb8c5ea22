//! Error types for schedule-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::Recurrence;

/// A failure while pulling the next row from a base stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stream fault: {message}")]
pub struct StreamError {
    pub message: String,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("user already exists: {0}")]
    DuplicateUser(String),

    #[error("unknown users: {}", .0.join(", "))]
    UnknownUsers(Vec<String>),

    #[error("meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A recurrence kind with no defined cadence reached the advance function.
    #[error("unsupported recurrence: {0:?}")]
    UnsupportedRecurrence(Recurrence),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no slot found before {horizon_end}")]
    NoSlotFound { horizon_end: DateTime<Utc> },

    #[error("query window ends before it starts: [{start}, {end})")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("query has no participants")]
    NoParticipants,

    #[error("unknown participants: expected {expected} existing users, found {found}")]
    UnknownParticipants { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
