//! Event log module

pub mod file;
pub mod models;
pub mod sink;

pub use file::FileEventLog;
pub use models::{Event, EventRecord};
pub use sink::{EventSink, InMemoryEventLog, NullEventSink};
