//! Viewer Session Module
//!
//! Live monitoring của document-viewing sessions. Đây là CORE STEP - nơi
//! quyết định suspicious/blocked cho từng session.
//!
//! ## Structure
//! - `types`: `ViewerSession`, `ViewerEvent`, `EventType`, counters
//! - `policy`: per-session permission snapshots with TTL
//! - `pattern`: reading-pattern anomaly sub-score (pure)
//! - `monitor`: event ingestion state machine + composite suspicion score
//!
//! ## Usage
//! ```ignore
//! use crate::logic::session::{SessionMonitor, SessionPolicySnapshot, EventType};
//!
//! let monitor = SessionMonitor::new(sink);
//! let id = monitor.start_session(file_id, Some(viewer), 120, SessionPolicySnapshot::restrictive());
//! let outcome = monitor.ingest(&id, EventType::ScreenshotAttempt, None, None, &config)?;
//! if outcome.blocked {
//!     // stop rendering
//! }
//! ```

pub mod types;
pub mod policy;
pub mod pattern;
pub mod monitor;

#[cfg(test)]
mod tests;

pub use types::{
    EventType, IngestOutcome, SessionCounters, TracePoint, ViewerEvent, ViewerSession,
};
pub use policy::{PolicyCache, SessionPolicySnapshot};
pub use pattern::reading_pattern_score;
pub use monitor::{suspicion_score, SessionMonitor};
