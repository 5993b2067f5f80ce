//! Portal-Sentinel - Heuristic Security Engine
//!
//! Deterministic scoring engine for a confidential file-sharing portal.
//! Turns raw activity signals (an uploaded file, a user's history, a live
//! document-viewing session) into bounded risk values, decides whether to
//! escalate or auto-block, and emits auditable alerts.
//!
//! All scoring is deterministic weighted-sum heuristics over configurable
//! thresholds - no trained models, no probabilistic calibration. Every score
//! and probability is clamped to [0,1].
//!
//! The surrounding portal (storage, identity, transport, review UI) supplies
//! inputs through the collaborator seams (`ActivityProvider`, policy
//! snapshots, event postings) and consumes assessments, profiles, ingest
//! outcomes, and alerts.

pub mod constants;
pub mod logic;

pub use logic::alert::{
    AlertError, AlertSeverity, AlertSink, AlertType, DiskSink, MemorySink, NewAlert, SecurityAlert,
};
pub use logic::behavior::{
    ActivityProvider, BehaviorAnalysis, BehaviorAnomaly, BehaviorError, BehaviorProfiler,
    FileActivity, RiskLevel, UserBehaviorProfile,
};
pub use logic::config::{ConfigError, ScoringConfig};
pub use logic::file_threat::{
    assess_upload, score_upload, FileThreatAssessment, FileUploadFact, Recommendation,
    ThreatLabel, UploaderContext,
};
pub use logic::session::{
    suspicion_score, EventType, IngestOutcome, SessionMonitor, SessionPolicySnapshot,
    ViewerEvent, ViewerSession,
};
