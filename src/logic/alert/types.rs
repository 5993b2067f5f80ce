//! Alert Types
//!
//! Core types cho security alerts.
//! KHÔNG chứa logic - chỉ data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ALERT TYPE
// ============================================================================

/// What kind of detection produced the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    /// File Threat Scorer crossed its alert threshold on an upload
    SuspiciousFile,
    /// User Behavior Profiler detected a high-risk deviation from baseline
    BehavioralAnomaly,
    /// Viewer session became suspicious (composite score threshold)
    SuspiciousSession,
    /// Viewer session was blocked (hard trigger or composite score)
    SessionBlocked,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::SuspiciousFile => "suspicious_file",
            AlertType::BehavioralAnomaly => "behavioral_anomaly",
            AlertType::SuspiciousSession => "suspicious_session",
            AlertType::SessionBlocked => "session_blocked",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity of the alert (separate from the triggering score)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.9 {
            AlertSeverity::Critical
        } else if score >= 0.7 {
            AlertSeverity::High
        } else if score >= 0.4 {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, AlertSeverity::High | AlertSeverity::Critical)
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ALERT RECORDS
// ============================================================================

/// Input to the emitter. The emitter mints the id and timestamps it.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub user_id: Uuid,
    pub file_id: Option<Uuid>,
    pub session_id: Option<String>,
    /// Confidence of the detection, clamped to [0,1] on construction
    pub confidence: f32,
    pub description: String,
    /// Short machine-readable tag for the pattern that fired
    pub detected_pattern: String,
}

impl NewAlert {
    pub fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        user_id: Uuid,
        confidence: f32,
        description: impl Into<String>,
        detected_pattern: impl Into<String>,
    ) -> Self {
        Self {
            alert_type,
            severity,
            user_id,
            file_id: None,
            session_id: None,
            confidence: confidence.clamp(0.0, 1.0),
            description: description.into(),
            detected_pattern: detected_pattern.into(),
        }
    }

    pub fn with_file(mut self, file_id: Uuid) -> Self {
        self.file_id = Some(file_id);
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Immutable alert record for human review.
///
/// Scorers only ever create these; the review workflow (an external
/// collaborator) owns every field in the `review` block afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub alert_id: Uuid,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub user_id: Uuid,
    pub file_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub confidence: f32,
    pub description: String,
    pub detected_pattern: String,
    pub detected_at: DateTime<Utc>,
    pub escalation_level: u8,

    // Review workflow fields - never touched by the scorers
    pub reviewed: bool,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
    pub action_taken: Option<String>,
}

impl SecurityAlert {
    pub fn from_new(new: NewAlert, detected_at: DateTime<Utc>) -> Self {
        Self {
            alert_id: Uuid::new_v4(),
            alert_type: new.alert_type,
            severity: new.severity,
            user_id: new.user_id,
            file_id: new.file_id,
            session_id: new.session_id,
            confidence: new.confidence.clamp(0.0, 1.0),
            description: new.description,
            detected_pattern: new.detected_pattern,
            detected_at,
            escalation_level: 0,
            reviewed: false,
            reviewed_by: None,
            review_notes: None,
            action_taken: None,
        }
    }
}

// ============================================================================
// ALERT ERROR
// ============================================================================

#[derive(Debug)]
pub enum AlertError {
    IoError(std::io::Error),
    SerializationError(serde_json::Error),
    Other(String),
}

impl std::fmt::Display for AlertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertError::IoError(e) => write!(f, "IO Error: {}", e),
            AlertError::SerializationError(e) => write!(f, "Serialization Error: {}", e),
            AlertError::Other(msg) => write!(f, "Alert Error: {}", msg),
        }
    }
}

impl std::error::Error for AlertError {}

impl From<std::io::Error> for AlertError {
    fn from(err: std::io::Error) -> Self {
        AlertError::IoError(err)
    }
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        AlertError::SerializationError(err)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_score() {
        assert_eq!(AlertSeverity::from_score(0.95), AlertSeverity::Critical);
        assert_eq!(AlertSeverity::from_score(0.7), AlertSeverity::High);
        assert_eq!(AlertSeverity::from_score(0.5), AlertSeverity::Medium);
        assert_eq!(AlertSeverity::from_score(0.1), AlertSeverity::Low);
    }

    #[test]
    fn test_confidence_clamped_on_construction() {
        let alert = NewAlert::new(
            AlertType::SuspiciousFile,
            AlertSeverity::High,
            Uuid::new_v4(),
            3.0,
            "test",
            "test",
        );
        assert_eq!(alert.confidence, 1.0);

        let record = SecurityAlert::from_new(alert, Utc::now());
        assert_eq!(record.confidence, 1.0);
        assert!(!record.reviewed);
        assert_eq!(record.escalation_level, 0);
    }
}
