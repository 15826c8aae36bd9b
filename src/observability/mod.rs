//! Observability for the custody ledger
//!
//! - Structured logging (one JSON object per line, stderr)
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here affects ledger contents or
//! command results.
//!
//! ```ignore
//! use bchoc::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RecordsAppended, &[("records", "2")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
