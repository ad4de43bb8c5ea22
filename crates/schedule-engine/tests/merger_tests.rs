//! Tests for the lazy schedule merger.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use schedule_engine::{
    Meeting, MeetingStream, OccurrenceFrontier, Recurrence, ScheduleError, ScheduleMerger,
    StreamError,
};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn one_off(description: &str, start: &str, end: &str) -> Meeting {
    Meeting::new("bob", at(start), at(end)).with_description(description)
}

fn daily(description: &str, start: &str, end: &str) -> Meeting {
    one_off(description, start, end).with_recurrence(Recurrence::Daily)
}

fn stream(rows: Vec<Meeting>) -> MeetingStream<'static> {
    Box::new(rows.into_iter().map(Ok))
}

fn descriptions(merger: ScheduleMerger<'_>) -> Vec<String> {
    merger.map(|m| m.unwrap().description).collect()
}

/// Stream that records when it is dropped.
struct TrackedStream {
    rows: std::vec::IntoIter<Meeting>,
    dropped: Rc<Cell<bool>>,
}

impl Iterator for TrackedStream {
    type Item = Result<Meeting, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(Ok)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn interleaves_stored_rows_and_computed_occurrences() {
    let frontier = OccurrenceFrontier::seed(
        vec![daily("A", "2023-03-01T16:20:00Z", "2023-03-01T16:40:00Z")],
        at("2023-03-07T16:00:00Z"),
        Some(at("2023-03-08T18:00:00Z")),
    )
    .unwrap();
    let rows = vec![
        one_off("B", "2023-03-07T17:00:00Z", "2023-03-07T17:30:00Z"),
        one_off("C", "2023-03-07T20:00:00Z", "2023-03-07T20:30:00Z"),
    ];

    let merger = ScheduleMerger::new(frontier, stream(rows), Some(at("2023-03-08T18:00:00Z")));

    assert_eq!(descriptions(merger), vec!["A", "B", "C", "A"]);
}

#[test]
fn stored_row_wins_ties_with_frontier() {
    let mut frontier = OccurrenceFrontier::new();
    frontier.push(daily("computed", "2023-03-07T10:00:00Z", "2023-03-07T11:00:00Z"), None);
    let rows = vec![one_off("stored", "2023-03-07T10:00:00Z", "2023-03-07T10:30:00Z")];

    let merger = ScheduleMerger::new(frontier, stream(rows), Some(at("2023-03-07T12:00:00Z")));

    assert_eq!(descriptions(merger), vec!["stored", "computed"]);
}

#[test]
fn recurring_stored_row_schedules_its_series() {
    let rows = vec![daily("standup", "2023-03-07T16:20:00Z", "2023-03-07T16:40:00Z")];

    let merger = ScheduleMerger::new(
        OccurrenceFrontier::new(),
        stream(rows),
        Some(at("2023-03-10T00:00:00Z")),
    );
    let starts: Vec<_> = merger.map(|m| m.unwrap().start).collect();

    assert_eq!(
        starts,
        vec![
            at("2023-03-07T16:20:00Z"),
            at("2023-03-08T16:20:00Z"),
            at("2023-03-09T16:20:00Z"),
        ]
    );
}

#[test]
fn computed_occurrences_drop_stored_id() {
    let mut row = daily("standup", "2023-03-07T16:20:00Z", "2023-03-07T16:40:00Z");
    row.id = Some("standup-id".to_string());

    let merger = ScheduleMerger::new(
        OccurrenceFrontier::new(),
        stream(vec![row]),
        Some(at("2023-03-09T00:00:00Z")),
    );
    let ids: Vec<_> = merger.map(|m| m.unwrap().id).collect();

    assert_eq!(ids, vec![Some("standup-id".to_string()), None]);
}

#[test]
fn zero_length_recurring_meeting_terminates() {
    let rows = vec![daily("blip", "2023-03-07T12:00:00Z", "2023-03-07T12:00:00Z")];

    let merger = ScheduleMerger::new(
        OccurrenceFrontier::new(),
        stream(rows),
        Some(at("2023-03-17T00:00:00Z")),
    );

    assert_eq!(merger.count(), 10);
}

#[test]
fn unbounded_merge_keeps_producing() {
    let rows = vec![daily("standup", "2023-03-07T16:20:00Z", "2023-03-07T16:40:00Z")];
    let mut merger = ScheduleMerger::new(OccurrenceFrontier::new(), stream(rows), None);

    let thousandth = merger.nth(999).unwrap().unwrap();

    assert_eq!(thousandth.start, at("2025-11-30T16:20:00Z"));
    assert_eq!(merger.pending_occurrences(), 1);
}

// ---------------------------------------------------------------------------
// has_next
// ---------------------------------------------------------------------------

#[test]
fn has_next_is_false_for_empty_sources() {
    let mut merger = ScheduleMerger::new(OccurrenceFrontier::new(), stream(vec![]), None);

    assert!(!merger.has_next());
    assert!(merger.next().is_none());
}

#[test]
fn has_next_buffers_without_consuming() {
    let rows = vec![one_off("B", "2023-03-07T17:00:00Z", "2023-03-07T17:30:00Z")];
    let mut merger = ScheduleMerger::new(OccurrenceFrontier::new(), stream(rows), None);

    assert!(merger.has_next());
    assert!(merger.has_next());
    assert_eq!(merger.next().unwrap().unwrap().description, "B");
    assert!(!merger.has_next());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn stream_fault_is_surfaced_once_and_stops_the_merge() {
    let rows: Vec<Result<Meeting, StreamError>> = vec![
        Ok(one_off("B", "2023-03-07T17:00:00Z", "2023-03-07T17:30:00Z")),
        Err(StreamError::new("cursor lost")),
        Ok(one_off("C", "2023-03-07T20:00:00Z", "2023-03-07T20:30:00Z")),
    ];
    let mut merger = ScheduleMerger::new(OccurrenceFrontier::new(), Box::new(rows.into_iter()), None);

    assert_eq!(merger.next().unwrap().unwrap().description, "B");
    assert!(merger.has_next());
    match merger.next() {
        Some(Err(ScheduleError::Stream(err))) => assert_eq!(err.message, "cursor lost"),
        other => panic!("expected stream fault, got {other:?}"),
    }
    assert!(merger.next().is_none());
}

#[test]
fn unsupported_recurring_row_fails_the_merge() {
    let rows = vec![
        daily("weekly", "2023-03-07T09:00:00Z", "2023-03-07T10:00:00Z").with_recurrence(Recurrence::Weekly),
    ];
    let mut merger = ScheduleMerger::new(OccurrenceFrontier::new(), stream(rows), None);

    assert!(matches!(
        merger.next(),
        Some(Err(ScheduleError::UnsupportedRecurrence(Recurrence::Weekly)))
    ));
    assert!(merger.next().is_none());
}

#[test]
fn dropping_merger_releases_undrained_stream() {
    let dropped = Rc::new(Cell::new(false));
    let tracked = TrackedStream {
        rows: vec![
            one_off("B", "2023-03-07T17:00:00Z", "2023-03-07T17:30:00Z"),
            one_off("C", "2023-03-07T20:00:00Z", "2023-03-07T20:30:00Z"),
        ]
        .into_iter(),
        dropped: Rc::clone(&dropped),
    };
    let mut merger = ScheduleMerger::new(OccurrenceFrontier::new(), Box::new(tracked), None);

    assert!(merger.next().is_some());
    assert!(!dropped.get());
    drop(merger);

    assert!(dropped.get());
}
