//! # schedule-engine
//!
//! Resolves the time-ordered busy occurrences of a group of participants,
//! including occurrences of recurring meetings that have no stored row of
//! their own, and answers two queries over them: "list my meetings in a
//! window" and "find the earliest common free slot".
//!
//! Occurrences are computed on demand and never stored. A query merges two
//! ascending sources lazily: stored rows pulled from a [`MeetingStore`], and
//! a frontier holding the next computed occurrence of each recurring series.
//!
//! ## Modules
//!
//! - [`model`] -- meetings, invitations, query windows, minute truncation
//! - [`recurrence`] -- recurrence advance (daily cadence)
//! - [`frontier`] -- pending recurring occurrences, ordered by start
//! - [`merger`] -- lazy ordered merge of stored rows and computed occurrences
//! - [`slot`] -- earliest free slot over a merged sequence
//! - [`store`] -- persistence contract and in-memory store
//! - [`scheduler`] -- list and slot queries wired over a store
//! - [`config`] -- search horizon and busy policy
//! - [`error`] -- error types

pub mod config;
pub mod error;
pub mod frontier;
pub mod merger;
pub mod model;
pub mod recurrence;
pub mod scheduler;
pub mod slot;
pub mod store;

pub use config::{SchedulerConfig, SlotSearchConfig};
pub use error::{ScheduleError, StoreError, StreamError};
pub use frontier::OccurrenceFrontier;
pub use merger::ScheduleMerger;
pub use model::{truncate_to_minute, AcceptanceState, Invitation, Meeting, QueryWindow, Recurrence, User};
pub use recurrence::{advance, expand};
pub use scheduler::Scheduler;
pub use slot::find_slot;
pub use store::{InMemoryStore, MeetingStore, MeetingStream, Snapshot};
