//! Append-only, ordered notification log.
//!
//! Observers keep a cursor (the last `seq` they processed) and call
//! [`EventLog::since`] to catch up. Records are never removed, so a
//! consumer that crashes before advancing its cursor simply sees the same
//! records again (at-least-once delivery).

use chrono::Utc;
use coa_types::{CoaEvent, EventRecord, RequestNumber, constants};

/// Ordered log of every notification the exchange has emitted.
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and return its sequence number.
    pub fn append(&mut self, event: CoaEvent) -> u64 {
        let seq = self.next_seq();
        tracing::debug!(
            seq,
            kind = event.kind(),
            request = %event.request_number(),
            "Event emitted"
        );
        self.records.push(EventRecord {
            seq,
            emitted_at: Utc::now(),
            event,
        });
        seq
    }

    /// Every record with `seq > cursor`, oldest first. Pass `0` for all.
    #[must_use]
    pub fn since(&self, cursor: u64) -> &[EventRecord] {
        // seq is dense from 1, so the cursor is also the start index.
        let start = usize::try_from(cursor)
            .map_or(self.records.len(), |c| c.min(self.records.len()));
        &self.records[start..]
    }

    /// Every record about request `n`, oldest first.
    pub fn for_request(&self, n: RequestNumber) -> impl Iterator<Item = &EventRecord> {
        self.records
            .iter()
            .filter(move |r| r.event.request_number() == n)
    }

    /// Sequence number of the newest record, or `0` when empty.
    #[must_use]
    pub fn last_seq(&self) -> u64 {
        self.records.last().map_or(0, |r| r.seq)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn next_seq(&self) -> u64 {
        self.records
            .last()
            .map_or(constants::FIRST_EVENT_SEQ, |r| r.seq + 1)
    }
}
