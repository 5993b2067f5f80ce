//! Alert Emitter
//!
//! Shared sink all three scorers call into when a score crosses an alert
//! threshold. Pure append: no deduplication, no rate limiting - each scorer
//! decides independently when to call, and a burst of triggering events
//! produces multiple alerts, one per detection instant.
//!
//! Persistence failures are surfaced to the caller: the scoring decision and
//! its durable record are a single unit of work (a score whose alert silently
//! failed to persist is a correctness bug, not a recoverable condition).

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::types::{AlertError, NewAlert, SecurityAlert};
use super::writer::AlertLog;

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Append-only alert sink. Returns the id of the created record.
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: NewAlert) -> Result<Uuid, AlertError>;
}

// ============================================================================
// IN-MEMORY SINK
// ============================================================================

/// In-memory append-only sink. Used by tests and as the in-process queue
/// the review workflow drains.
#[derive(Default)]
pub struct MemorySink {
    alerts: Mutex<Vec<SecurityAlert>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all alerts emitted so far, in emission order
    pub fn snapshot(&self) -> Vec<SecurityAlert> {
        self.alerts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

impl AlertSink for MemorySink {
    fn emit(&self, alert: NewAlert) -> Result<Uuid, AlertError> {
        let record = SecurityAlert::from_new(alert, Utc::now());
        let id = record.alert_id;
        log::info!(
            "Alert emitted: {} severity={} user={} confidence={:.2}",
            record.alert_type,
            record.severity,
            record.user_id,
            record.confidence
        );
        self.alerts.lock().push(record);
        Ok(id)
    }
}

// ============================================================================
// DISK SINK
// ============================================================================

/// Sink that appends every alert to the JSONL disk log and keeps an
/// in-memory copy for the review workflow.
pub struct DiskSink {
    log: AlertLog,
    memory: MemorySink,
}

impl DiskSink {
    pub fn new() -> Self {
        Self {
            log: AlertLog::new(),
            memory: MemorySink::new(),
        }
    }

    pub fn from_path(base_dir: std::path::PathBuf) -> Self {
        Self {
            log: AlertLog::from_path(base_dir),
            memory: MemorySink::new(),
        }
    }

    pub fn snapshot(&self) -> Vec<SecurityAlert> {
        self.memory.snapshot()
    }
}

impl AlertSink for DiskSink {
    fn emit(&self, alert: NewAlert) -> Result<Uuid, AlertError> {
        let record = SecurityAlert::from_new(alert, Utc::now());
        let id = record.alert_id;

        // Disk write first: if durability fails, the caller must know
        self.log.append(&record)?;

        log::info!(
            "Alert emitted: {} severity={} user={} confidence={:.2}",
            record.alert_type,
            record.severity,
            record.user_id,
            record.confidence
        );
        self.memory.alerts.lock().push(record);
        Ok(id)
    }
}

impl Default for DiskSink {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
