//! File Threat Types
//!
//! Core types cho file threat scoring.
//! KHÔNG chứa logic - chỉ data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::config::ScoringConfig;

// ============================================================================
// INPUT FACTS
// ============================================================================

/// Ephemeral input describing one uploaded file. Owned by the file store;
/// the engine never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUploadFact {
    pub file_id: Uuid,
    pub filename: String,
    /// Extension as reported by the catalog; may be absent or garbage.
    /// A missing/malformed extension is treated as "no match", never an error.
    pub extension: Option<String>,
    pub size_bytes: u64,
    pub uploader_id: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl FileUploadFact {
    /// Normalized lowercase extension without the leading dot.
    /// Falls back to the filename when the catalog field is absent.
    pub fn normalized_extension(&self) -> Option<String> {
        let raw = match &self.extension {
            Some(ext) if !ext.trim().is_empty() => ext.trim(),
            _ => self.filename.rsplit_once('.').map(|(_, ext)| ext)?,
        };
        let ext = raw.trim_start_matches('.').to_lowercase();
        if ext.is_empty() || ext.chars().any(|c| !c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext)
    }
}

/// The uploader's recent activity, supplied by the catalog + profiler
/// collaborators at scoring time.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploaderContext {
    /// Files this user uploaded today, counting the one being scored
    pub files_uploaded_today: u32,
    /// Rolling baseline from the behavior profile; 0.0 for brand-new users
    pub average_files_per_day: f32,
}

// ============================================================================
// THREAT LABELS
// ============================================================================

/// Which heuristic factors fired, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLabel {
    SuspiciousExtension,
    LargeFile,
    OffHoursUpload,
    UnusualUploadVolume,
    MalwareNamePattern,
    ExecutableFile,
    ExfiltrationSize,
    ArchiveBundle,
}

impl ThreatLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLabel::SuspiciousExtension => "suspicious_extension",
            ThreatLabel::LargeFile => "large_file",
            ThreatLabel::OffHoursUpload => "off_hours_upload",
            ThreatLabel::UnusualUploadVolume => "unusual_upload_volume",
            ThreatLabel::MalwareNamePattern => "malware_name_pattern",
            ThreatLabel::ExecutableFile => "executable_file",
            ThreatLabel::ExfiltrationSize => "exfiltration_size",
            ThreatLabel::ArchiveBundle => "archive_bundle",
        }
    }
}

impl std::fmt::Display for ThreatLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RECOMMENDATION
// ============================================================================

/// Discrete action derived from the final score via threshold steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Allow,
    Monitor,
    Review,
    Block,
}

impl Recommendation {
    /// Step function against block > review > monitor thresholds
    pub fn from_score(score: f32, config: &ScoringConfig) -> Self {
        if score >= config.recommendation_block_threshold {
            Recommendation::Block
        } else if score >= config.recommendation_review_threshold {
            Recommendation::Review
        } else if score >= config.recommendation_monitor_threshold {
            Recommendation::Monitor
        } else {
            Recommendation::Allow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Allow => "allow",
            Recommendation::Monitor => "monitor",
            Recommendation::Review => "review",
            Recommendation::Block => "block",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ASSESSMENT
// ============================================================================

/// Output of the File Threat Scorer. Created once per upload and immutable
/// afterwards - a re-scan creates a new assessment, it does not mutate this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileThreatAssessment {
    pub assessment_id: Uuid,
    pub file_id: Uuid,
    pub uploader_id: Uuid,
    /// Final composite threat score, clamped to [0,1]
    pub threat_score: f32,
    /// Triggered factors in evaluation order
    pub labels: Vec<ThreatLabel>,
    pub malware_probability: f32,
    pub exfiltration_probability: f32,
    pub recommendation: Recommendation,
    pub assessed_at: DateTime<Utc>,
    /// Config snapshot version the score was computed against
    pub config_version: u32,
}
