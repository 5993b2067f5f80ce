//! Alert Module
//!
//! Immutable alert records cho human review, plus the append-only sinks the
//! scorers emit into.
//!
//! ## Structure
//! - `types`: `SecurityAlert`, `AlertType`, `AlertSeverity`
//! - `emitter`: `AlertSink` trait, `MemorySink`, `DiskSink`
//! - `writer`: JSONL disk log with rotation

pub mod types;
pub mod emitter;
pub mod writer;

pub use types::{AlertError, AlertSeverity, AlertType, NewAlert, SecurityAlert};
pub use emitter::{AlertSink, DiskSink, MemorySink};
pub use writer::AlertLog;
