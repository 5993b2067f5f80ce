//! User Behavior Profiler
//!
//! Maintains a rolling per-user activity baseline and converts live
//! deviations from it into a risk score.
//!
//! `update_profile` is a full recomputation from history (idempotent,
//! overwrites the stored baseline). `analyze` compares *today's* activity
//! against the stored baseline and only triggers the recompute on the
//! first-ever analysis for a user - the baseline is a historical average,
//! and recomputing it on every call would fold today's anomaly into the
//! baseline and erase the very signal the check relies on.

use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Timelike, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::types::{
    ActivityProvider, BehaviorAnalysis, BehaviorAnomaly, BehaviorError, FileActivity, RiskLevel,
    UserBehaviorProfile,
};
use crate::logic::alert::{AlertSeverity, AlertSink, AlertType, NewAlert};
use crate::logic::config::ScoringConfig;

// Anomaly contributions (deviations from baseline)
const UPLOAD_VOLUME_SCORE: f32 = 0.3;
const FILE_SIZE_SCORE: f32 = 0.2;
const OFF_HOURS_SCORE: f32 = 0.2;
/// Today's average size must exceed this multiple of baseline to fire
const SIZE_ANOMALY_MULTIPLIER: f32 = 2.0;

const BYTES_PER_MB: f32 = 1024.0 * 1024.0;
const TOP_EXTENSION_COUNT: usize = 5;

// ============================================================================
// PROFILER
// ============================================================================

pub struct BehaviorProfiler {
    provider: Arc<dyn ActivityProvider>,
    sink: Arc<dyn AlertSink>,
    // Per-user Mutex entries serialize concurrent analyses of the same user;
    // the outer RwLock only guards registry lookup, never held during scoring
    profiles: RwLock<HashMap<Uuid, Arc<Mutex<UserBehaviorProfile>>>>,
}

impl BehaviorProfiler {
    pub fn new(provider: Arc<dyn ActivityProvider>, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            provider,
            sink,
            profiles: RwLock::new(HashMap::new()),
        }
    }

    fn profile_entry(&self, user_id: Uuid, now: DateTime<Utc>) -> (Arc<Mutex<UserBehaviorProfile>>, bool) {
        if let Some(entry) = self.profiles.read().get(&user_id) {
            return (entry.clone(), false);
        }

        let mut profiles = self.profiles.write();
        // Re-check under the write lock
        if let Some(entry) = profiles.get(&user_id) {
            return (entry.clone(), false);
        }
        let entry = Arc::new(Mutex::new(UserBehaviorProfile::empty(user_id, now)));
        profiles.insert(user_id, entry.clone());
        (entry, true)
    }

    /// Dashboard read: a copy of the stored profile, if any
    pub fn profile_snapshot(&self, user_id: Uuid) -> Option<UserBehaviorProfile> {
        self.profiles
            .read()
            .get(&user_id)
            .map(|entry| entry.lock().clone())
    }

    // ------------------------------------------------------------------
    // UPDATE PROFILE
    // ------------------------------------------------------------------

    /// Recompute the rolling baseline from full history.
    ///
    /// Safe to call repeatedly: overwrites the computed fields, preserves
    /// the strike counter and timestamps of unusual activity.
    pub fn update_profile(&self, user_id: Uuid) -> Result<UserBehaviorProfile, BehaviorError> {
        let now = Utc::now();
        let files = self.provider.file_history(user_id)?;
        let accesses = self.provider.access_times(user_id)?;

        let (entry, _) = self.profile_entry(user_id, now);
        let mut profile = entry.lock();

        recompute_baseline(&mut profile, &files, &accesses, now);
        log::debug!(
            "Profile updated for {}: {:.2} files/day, {:.2} MB avg",
            user_id,
            profile.average_files_per_day,
            profile.average_file_size_mb
        );
        Ok(profile.clone())
    }

    // ------------------------------------------------------------------
    // ANALYZE
    // ------------------------------------------------------------------

    /// Compare today's activity against the stored baseline.
    ///
    /// Lazy-creates (and baselines) the profile on the first analysis only.
    /// Emits a High BehavioralAnomaly alert when risk crosses the high-risk
    /// threshold; alert failures are surfaced.
    pub fn analyze(
        &self,
        user_id: Uuid,
        config: &ScoringConfig,
    ) -> Result<BehaviorAnalysis, BehaviorError> {
        let now = Utc::now();
        let files = self.provider.file_history(user_id)?;

        let (entry, created) = self.profile_entry(user_id, now);
        if created {
            let accesses = self.provider.access_times(user_id)?;
            let mut profile = entry.lock();
            recompute_baseline(&mut profile, &files, &accesses, now);
        }

        let mut profile = entry.lock();
        let mut anomalies = Vec::new();
        let mut risk = 0.0f32;

        // Today's slice of activity
        let today = now.date_naive();
        let todays: Vec<&FileActivity> = files
            .iter()
            .filter(|f| f.uploaded_at.date_naive() == today)
            .collect();

        if profile.average_files_per_day > 0.0
            && todays.len() as f32
                > config.upload_anomaly_multiplier * profile.average_files_per_day
        {
            risk += UPLOAD_VOLUME_SCORE;
            anomalies.push(BehaviorAnomaly::UnusualUploadVolume);
        }

        if !todays.is_empty() && profile.average_file_size_mb > 0.0 {
            let todays_avg_mb = todays.iter().map(|f| f.size_bytes as f32).sum::<f32>()
                / todays.len() as f32
                / BYTES_PER_MB;
            if todays_avg_mb > SIZE_ANOMALY_MULTIPLIER * profile.average_file_size_mb {
                risk += FILE_SIZE_SCORE;
                anomalies.push(BehaviorAnomaly::UnusualFileSize);
            }
        }

        if !profile.within_active_hours(now.hour()) {
            risk += OFF_HOURS_SCORE;
            anomalies.push(BehaviorAnomaly::OffHoursActivity);
        }

        // Sticky habituation term: accumulated strikes never decay
        risk += profile.unusual_activity_count as f32 * config.unusual_activity_increment;
        let risk = risk.clamp(0.0, 1.0);

        if !anomalies.is_empty() {
            profile.unusual_activity_count += 1;
            profile.last_unusual_activity = Some(now);
        }
        profile.current_risk_score = risk;
        profile.last_updated = now;

        let risk_level = RiskLevel::from_score(risk, config);

        if risk >= config.high_risk_threshold {
            let pattern = anomalies
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(",");
            self.sink.emit(NewAlert::new(
                AlertType::BehavioralAnomaly,
                AlertSeverity::High,
                user_id,
                risk,
                format!(
                    "User behavior risk {:.2} ({} anomalies, {} accumulated strikes)",
                    risk,
                    anomalies.len(),
                    profile.unusual_activity_count
                ),
                pattern,
            ))?;
        }

        Ok(BehaviorAnalysis {
            user_id,
            risk_score: risk,
            risk_level,
            anomalies,
            analyzed_at: now,
        })
    }
}

// ============================================================================
// BASELINE RECOMPUTATION
// ============================================================================

fn recompute_baseline(
    profile: &mut UserBehaviorProfile,
    files: &[FileActivity],
    accesses: &[DateTime<Utc>],
    now: DateTime<Utc>,
) {
    if files.is_empty() {
        profile.average_files_per_day = 0.0;
        profile.average_file_size_mb = 0.0;
        profile.top_extensions.clear();
    } else {
        let first = files
            .iter()
            .map(|f| f.uploaded_at)
            .min()
            .unwrap_or(now);
        let days = (now - first).num_days().max(1) as f32;
        profile.average_files_per_day = files.len() as f32 / days;

        profile.average_file_size_mb =
            files.iter().map(|f| f.size_bytes as f32).sum::<f32>() / files.len() as f32
                / BYTES_PER_MB;

        let mut counts: HashMap<String, u32> = HashMap::new();
        for file in files {
            if let Some(ext) = &file.extension {
                let ext = ext.trim_start_matches('.').to_lowercase();
                if !ext.is_empty() {
                    *counts.entry(ext).or_insert(0) += 1;
                }
            }
        }
        let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        profile.top_extensions = ranked
            .into_iter()
            .take(TOP_EXTENSION_COUNT)
            .map(|(ext, _)| ext)
            .collect();
    }

    // Typical hours from the observed min/max access time-of-day
    match (
        accesses.iter().map(|t| t.hour()).min(),
        accesses.iter().map(|t| t.hour()).max(),
    ) {
        (Some(min), Some(max)) => {
            profile.active_hours_start = min;
            profile.active_hours_end = max + 1;
        }
        _ => {
            profile.active_hours_start = 0;
            profile.active_hours_end = 24;
        }
    }

    profile.last_updated = now;
}

// ============================================================================
// TESTS
// ============================================================================
