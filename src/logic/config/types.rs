//! Scoring Config Types
//!
//! Core types cho scoring configuration.
//! KHÔNG chứa logic scoring - chỉ weights, thresholds, và validation.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};

// ============================================================================
// SCORING CONFIG
// ============================================================================

/// Versioned, admin-editable set of weights and thresholds consumed by all
/// three scorers. Scorers receive an immutable snapshot (`Arc<ScoringConfig>`);
/// admin updates install a new snapshot, they never mutate fields in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Monotonic snapshot counter, bumped on every admin update
    pub version: u32,

    // --- File threat scoring ---
    /// Extensions that contribute `extension_score` on upload
    pub suspicious_extensions: HashSet<String>,
    /// Extensions that contribute to the exfiltration sub-score
    pub archive_extensions: HashSet<String>,
    pub extension_score: f32,
    pub large_file_score: f32,
    pub off_hours_score: f32,
    pub unusual_uploads_score: f32,
    /// Above this size the structural large-file increment applies
    pub max_file_size_bytes: u64,
    /// Exfiltration tiers: large adds `0.4`, huge adds another `0.3`
    pub exfil_large_bytes: u64,
    pub exfil_huge_bytes: u64,
    pub exfil_archive_score: f32,
    /// Blend weight of the malware probability sub-score
    pub malware_probability_weight: f32,
    /// Blend weight of the exfiltration probability sub-score
    pub data_exfiltration_weight: f32,
    /// Files-today > multiplier x average/day counts as an upload anomaly
    pub upload_anomaly_multiplier: f32,
    /// Business hours window [start, end) in local hours
    pub business_hours_start: u32,
    pub business_hours_end: u32,

    // --- Shared thresholds ---
    /// At or above this score a scorer emits an alert
    pub suspicious_threshold: f32,
    /// At or above this score the alert is High severity
    pub high_risk_threshold: f32,
    pub medium_risk_threshold: f32,
    /// Recommendation steps, must satisfy block > review > monitor
    pub recommendation_block_threshold: f32,
    pub recommendation_review_threshold: f32,
    pub recommendation_monitor_threshold: f32,
    /// Sticky habituation weight per accumulated unusual-activity strike
    pub unusual_activity_increment: f32,

    // --- Session limits (hard-block triggers) ---
    pub screenshot_block_count: u32,
    pub print_block_count: u32,
    pub clipboard_block_count: u32,
    pub visibility_block_count: u32,
    pub fullscreen_block_count: u32,
    pub rapid_page_block_count: u32,
    /// A page view counts as rapid when `rapid_page_event_count` page views
    /// landed within the trailing `rapid_page_window_secs`
    pub rapid_page_window_secs: i64,
    pub rapid_page_event_count: usize,
    /// Composite score at which the session is flagged suspicious
    pub session_suspicious_score: f32,
    /// Composite score at which the session auto-blocks
    pub session_block_score: f32,
    /// Reading-pattern trace keeps only the most recent N entries
    pub trace_cap: usize,

    // --- Reading pattern anomaly ---
    pub pattern_min_trace: usize,
    pub pattern_jump_pages: i64,
    pub pattern_jump_fraction: f32,
    pub pattern_jump_score: f32,
    pub pattern_coverage_fraction: f32,
    pub pattern_coverage_secs: i64,
    pub pattern_coverage_score: f32,
    /// Blend weight of the reading-pattern anomaly in the composite score
    pub pattern_weight: f32,
    /// Below this average seconds-per-page the view-time anomaly fires
    pub fast_page_secs: f32,
    pub view_time_anomaly_score: f32,
}

fn string_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: 1,

            suspicious_extensions: string_set(&[
                "exe", "dll", "bat", "cmd", "scr", "ps1", "vbs", "js", "jar", "msi", "com", "pif",
            ]),
            archive_extensions: string_set(&["zip", "rar", "7z", "tar", "gz"]),
            extension_score: 0.3,
            large_file_score: 0.2,
            off_hours_score: 0.15,
            unusual_uploads_score: 0.2,
            max_file_size_bytes: 50 * 1024 * 1024,
            exfil_large_bytes: 100 * 1024 * 1024,
            exfil_huge_bytes: 500 * 1024 * 1024,
            exfil_archive_score: 0.3,
            malware_probability_weight: 0.4,
            data_exfiltration_weight: 0.3,
            upload_anomaly_multiplier: 3.0,
            business_hours_start: 8,
            business_hours_end: 18,

            suspicious_threshold: 0.5,
            high_risk_threshold: 0.7,
            medium_risk_threshold: 0.4,
            recommendation_block_threshold: 0.8,
            recommendation_review_threshold: 0.6,
            recommendation_monitor_threshold: 0.4,
            unusual_activity_increment: 0.05,

            screenshot_block_count: 3,
            print_block_count: 2,
            clipboard_block_count: 5,
            visibility_block_count: 6,
            fullscreen_block_count: 3,
            rapid_page_block_count: 3,
            rapid_page_window_secs: 10,
            rapid_page_event_count: 10,
            session_suspicious_score: 0.6,
            session_block_score: 0.8,
            trace_cap: 100,

            pattern_min_trace: 5,
            pattern_jump_pages: 10,
            pattern_jump_fraction: 0.5,
            pattern_jump_score: 0.3,
            pattern_coverage_fraction: 0.8,
            pattern_coverage_secs: 120,
            pattern_coverage_score: 0.4,
            pattern_weight: 0.15,
            fast_page_secs: 5.0,
            view_time_anomaly_score: 0.2,
        }
    }
}

impl ScoringConfig {
    /// Validate that every weight and threshold is usable.
    ///
    /// Invalid configs are rejected outright - the engine never "fixes up"
    /// a bad value, because a silently clamped weight is a different policy
    /// than the admin asked for.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields: [(&str, f32); 15] = [
            ("extension_score", self.extension_score),
            ("large_file_score", self.large_file_score),
            ("off_hours_score", self.off_hours_score),
            ("unusual_uploads_score", self.unusual_uploads_score),
            ("exfil_archive_score", self.exfil_archive_score),
            ("malware_probability_weight", self.malware_probability_weight),
            ("data_exfiltration_weight", self.data_exfiltration_weight),
            ("suspicious_threshold", self.suspicious_threshold),
            ("high_risk_threshold", self.high_risk_threshold),
            ("medium_risk_threshold", self.medium_risk_threshold),
            ("unusual_activity_increment", self.unusual_activity_increment),
            ("session_suspicious_score", self.session_suspicious_score),
            ("session_block_score", self.session_block_score),
            ("pattern_weight", self.pattern_weight),
            ("view_time_anomaly_score", self.view_time_anomaly_score),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::OutOfRange {
                    field: name,
                    value,
                });
            }
        }

        if !(self.recommendation_block_threshold > self.recommendation_review_threshold
            && self.recommendation_review_threshold > self.recommendation_monitor_threshold)
        {
            return Err(ConfigError::Invalid(format!(
                "recommendation thresholds must be ordered block > review > monitor (got {:.2} / {:.2} / {:.2})",
                self.recommendation_block_threshold,
                self.recommendation_review_threshold,
                self.recommendation_monitor_threshold
            )));
        }

        if self.business_hours_start >= 24
            || self.business_hours_end > 24
            || self.business_hours_start >= self.business_hours_end
        {
            return Err(ConfigError::Invalid(format!(
                "business hours window [{}, {}) is not a valid hour range",
                self.business_hours_start, self.business_hours_end
            )));
        }

        if self.upload_anomaly_multiplier < 1.0 || !self.upload_anomaly_multiplier.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "upload_anomaly_multiplier must be >= 1.0 (got {})",
                self.upload_anomaly_multiplier
            )));
        }

        if self.trace_cap == 0 || self.pattern_min_trace == 0 {
            return Err(ConfigError::Invalid(
                "trace_cap and pattern_min_trace must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Hour-of-day check against the configured business window
    pub fn within_business_hours(&self, hour: u32) -> bool {
        hour >= self.business_hours_start && hour < self.business_hours_end
    }
}

// ============================================================================
// CONFIG ERROR
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    SerializationError(serde_json::Error),
    OutOfRange { field: &'static str, value: f32 },
    Invalid(String),
    /// No config snapshot installed - the engine refuses to score (fail closed)
    NotInstalled,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO Error: {}", e),
            ConfigError::SerializationError(e) => write!(f, "Serialization Error: {}", e),
            ConfigError::OutOfRange { field, value } => {
                write!(f, "Config field '{}' out of [0,1] range: {}", field, value)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
            ConfigError::NotInstalled => write!(f, "No scoring config installed"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::SerializationError(err)
    }
}

// ============================================================================
// TESTS
// ============================================================================
