//! Event sink port and in-process implementations

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::EventLogError;
use crate::events::models::{Event, EventRecord};

/// Destination for emitted events
///
/// A batch holds every event of one operation, in emission order. The
/// sink appends the whole batch or nothing.
pub trait EventSink: Send + Sync {
    fn publish(&self, events: &[Event]) -> Result<(), EventLogError>;
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _events: &[Event]) -> Result<(), EventLogError> {
        Ok(())
    }
}

/// Ordered in-memory event log
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl InMemoryEventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in sequence order
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.read().clone()
    }

    /// All events in sequence order
    pub fn events(&self) -> Vec<Event> {
        self.records
            .read()
            .iter()
            .map(|record| record.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl EventSink for InMemoryEventLog {
    fn publish(&self, events: &[Event]) -> Result<(), EventLogError> {
        let mut records = self.records.write();
        let mut sequence = records.len() as u64;
        for event in events {
            tracing::trace!(sequence, kind = event.kind(), "Event recorded");
            records.push(EventRecord::new(sequence, event.clone()));
            sequence += 1;
        }
        Ok(())
    }
}
