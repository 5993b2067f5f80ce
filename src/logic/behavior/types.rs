//! Behavior Types
//!
//! Core types cho user behavior profiling.
//! KHÔNG chứa logic - chỉ data structures và collaborator traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::alert::AlertError;
use crate::logic::config::ScoringConfig;

// ============================================================================
// ACTIVITY INPUTS (external collaborators)
// ============================================================================

/// One historical file upload, as reported by the file catalog
#[derive(Debug, Clone)]
pub struct FileActivity {
    pub size_bytes: u64,
    pub extension: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Supplies a user's historical activity. Implemented by the identity/audit
/// services; the engine only reads through this seam.
pub trait ActivityProvider: Send + Sync {
    fn file_history(&self, user_id: Uuid) -> Result<Vec<FileActivity>, BehaviorError>;
    fn access_times(&self, user_id: Uuid) -> Result<Vec<DateTime<Utc>>, BehaviorError>;
}

// ============================================================================
// PROFILE
// ============================================================================

/// Rolling per-user activity baseline. Created lazily on first analysis,
/// mutated in place on every re-analysis, never deleted while the user exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBehaviorProfile {
    pub user_id: Uuid,
    pub average_files_per_day: f32,
    pub average_file_size_mb: f32,
    /// Typical active-hours window [start, end) from observed access times
    pub active_hours_start: u32,
    pub active_hours_end: u32,
    /// Top-5 file extensions by frequency
    pub top_extensions: Vec<String>,
    /// Sticky strike counter - never decays
    pub unusual_activity_count: u32,
    pub last_unusual_activity: Option<DateTime<Utc>>,
    pub current_risk_score: f32,
    pub last_updated: DateTime<Utc>,
}

impl UserBehaviorProfile {
    pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            average_files_per_day: 0.0,
            average_file_size_mb: 0.0,
            // No observed accesses yet: whole day counts as typical
            active_hours_start: 0,
            active_hours_end: 24,
            top_extensions: Vec::new(),
            unusual_activity_count: 0,
            last_unusual_activity: None,
            current_risk_score: 0.0,
            last_updated: now,
        }
    }

    pub fn within_active_hours(&self, hour: u32) -> bool {
        hour >= self.active_hours_start && hour < self.active_hours_end
    }
}

// ============================================================================
// ANALYSIS RESULT
// ============================================================================

/// Which deviation from baseline fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorAnomaly {
    UnusualUploadVolume,
    UnusualFileSize,
    OffHoursActivity,
}

impl BehaviorAnomaly {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorAnomaly::UnusualUploadVolume => "unusual_upload_volume",
            BehaviorAnomaly::UnusualFileSize => "unusual_file_size",
            BehaviorAnomaly::OffHoursActivity => "off_hours_activity",
        }
    }
}

/// Three-tier risk level step function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f32, config: &ScoringConfig) -> Self {
        if score >= config.high_risk_threshold {
            RiskLevel::High
        } else if score >= config.medium_risk_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of one analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorAnalysis {
    pub user_id: Uuid,
    pub risk_score: f32,
    pub risk_level: RiskLevel,
    pub anomalies: Vec<BehaviorAnomaly>,
    pub analyzed_at: DateTime<Utc>,
}

// ============================================================================
// BEHAVIOR ERROR
// ============================================================================

#[derive(Debug)]
pub enum BehaviorError {
    /// The activity provider (identity/audit service) failed
    Provider(String),
    /// Alert persistence failed - surfaced, not swallowed
    Alert(AlertError),
}

impl std::fmt::Display for BehaviorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BehaviorError::Provider(msg) => write!(f, "Activity provider error: {}", msg),
            BehaviorError::Alert(e) => write!(f, "Alert error: {}", e),
        }
    }
}

impl std::error::Error for BehaviorError {}

impl From<AlertError> for BehaviorError {
    fn from(err: AlertError) -> Self {
        BehaviorError::Alert(err)
    }
}
