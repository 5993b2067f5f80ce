//! File Threat Scorer
//!
//! CHỈ chứa logic scoring - không có types, không có policy.
//! Input: FileUploadFact + UploaderContext + ScoringConfig
//! Output: FileThreatAssessment
//!
//! Additive weighted heuristic: each structural factor contributes a
//! config-defined increment; the malware and exfiltration sub-scores are
//! accumulated independently and blended in at their configured weights;
//! the sum is clamped to [0,1].

use chrono::{Timelike, Utc};
use uuid::Uuid;

use super::rules;
use super::types::{
    FileThreatAssessment, FileUploadFact, Recommendation, ThreatLabel, UploaderContext,
};
use crate::logic::alert::{AlertError, AlertSeverity, AlertSink, AlertType, NewAlert};
use crate::logic::config::ScoringConfig;

// ============================================================================
// MAIN SCORING FUNCTION
// ============================================================================

/// Score one upload. Pure: no side effects, deterministic for a given
/// (fact, uploader, config) triple.
pub fn score_upload(
    fact: &FileUploadFact,
    uploader: &UploaderContext,
    config: &ScoringConfig,
) -> FileThreatAssessment {
    let mut labels = Vec::new();
    let mut structural = 0.0f32;

    let extension = fact.normalized_extension();

    // Suspicious extension (missing/malformed extension = no match)
    if let Some(ext) = extension.as_deref() {
        if config.suspicious_extensions.contains(ext) {
            structural += config.extension_score;
            labels.push(ThreatLabel::SuspiciousExtension);
        }
    }

    // Oversized upload
    if fact.size_bytes > config.max_file_size_bytes {
        structural += config.large_file_score;
        labels.push(ThreatLabel::LargeFile);
    }

    // Outside business hours
    if !config.within_business_hours(fact.uploaded_at.hour()) {
        structural += config.off_hours_score;
        labels.push(ThreatLabel::OffHoursUpload);
    }

    // Upload volume anomaly vs the uploader's rolling baseline.
    // New users (no baseline yet) never trip this factor.
    if uploader.average_files_per_day > 0.0
        && uploader.files_uploaded_today as f32
            > config.upload_anomaly_multiplier * uploader.average_files_per_day
    {
        structural += config.unusual_uploads_score;
        labels.push(ThreatLabel::UnusualUploadVolume);
    }

    // Malware sub-score: lexical markers + direct executables
    let mut malware = 0.0f32;
    if rules::filename_has_malware_marker(&fact.filename) {
        malware += rules::MALWARE_NAME_SCORE;
        labels.push(ThreatLabel::MalwareNamePattern);
    }
    if let Some(ext) = extension.as_deref() {
        if rules::is_executable_extension(ext) {
            malware += rules::EXECUTABLE_SCORE;
            labels.push(ThreatLabel::ExecutableFile);
        }
    }
    let malware_probability = malware.clamp(0.0, 1.0);

    // Exfiltration sub-score: size tiers + archive bundling
    let mut exfil = 0.0f32;
    if fact.size_bytes > config.exfil_large_bytes {
        exfil += rules::EXFIL_LARGE_SCORE;
        labels.push(ThreatLabel::ExfiltrationSize);
    }
    if fact.size_bytes > config.exfil_huge_bytes {
        exfil += rules::EXFIL_HUGE_SCORE;
    }
    if let Some(ext) = extension.as_deref() {
        if config.archive_extensions.contains(ext) {
            exfil += config.exfil_archive_score;
            labels.push(ThreatLabel::ArchiveBundle);
        }
    }
    let exfiltration_probability = exfil.clamp(0.0, 1.0);

    let threat_score = (structural
        + malware_probability * config.malware_probability_weight
        + exfiltration_probability * config.data_exfiltration_weight)
        .clamp(0.0, 1.0);

    FileThreatAssessment {
        assessment_id: Uuid::new_v4(),
        file_id: fact.file_id,
        uploader_id: fact.uploader_id,
        threat_score,
        labels,
        malware_probability,
        exfiltration_probability,
        recommendation: Recommendation::from_score(threat_score, config),
        assessed_at: Utc::now(),
        config_version: config.version,
    }
}

// ============================================================================
// SCORE + ALERT
// ============================================================================

/// Score an upload and emit the SuspiciousFile alert when the score crosses
/// the alert threshold. Sink failures are surfaced - the assessment and its
/// alert are one unit of work.
pub fn assess_upload(
    fact: &FileUploadFact,
    uploader: &UploaderContext,
    config: &ScoringConfig,
    sink: &dyn AlertSink,
) -> Result<FileThreatAssessment, AlertError> {
    let assessment = score_upload(fact, uploader, config);

    if assessment.threat_score >= config.suspicious_threshold {
        let severity = if assessment.threat_score >= config.high_risk_threshold {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };

        let pattern = assessment
            .labels
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let alert = NewAlert::new(
            AlertType::SuspiciousFile,
            severity,
            fact.uploader_id,
            assessment.threat_score,
            format!(
                "Upload '{}' scored {:.2} (recommendation: {})",
                fact.filename, assessment.threat_score, assessment.recommendation
            ),
            pattern,
        )
        .with_file(fact.file_id);

        sink.emit(alert)?;
    } else {
        log::debug!(
            "Upload '{}' scored {:.2}, below alert threshold",
            fact.filename,
            assessment.threat_score
        );
    }

    Ok(assessment)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::alert::MemorySink;
    use chrono::TimeZone;

    fn make_fact(filename: &str, size_bytes: u64, hour: u32) -> FileUploadFact {
        FileUploadFact {
            file_id: Uuid::new_v4(),
            filename: filename.to_string(),
            extension: None,
            size_bytes,
            uploader_id: Uuid::new_v4(),
            uploaded_at: Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_benign_document_allows() {
        let config = ScoringConfig::default();
        let fact = make_fact("quarterly_report.pdf", 200 * 1024, 10);

        let result = score_upload(&fact, &UploaderContext::default(), &config);
        assert_eq!(result.recommendation, Recommendation::Allow);
        assert!(result.labels.is_empty());
        assert_eq!(result.threat_score, 0.0);
    }

    #[test]
    fn test_keygen_exe_off_hours_blocks() {
        // The canonical bad upload: keygen.exe, 150 MB, 02:00
        let config = ScoringConfig::default();
        let fact = make_fact("keygen.exe", 150 * 1024 * 1024, 2);

        let result = score_upload(&fact, &UploaderContext::default(), &config);
        assert!(result.threat_score >= 0.8, "score {}", result.threat_score);
        assert_eq!(result.recommendation, Recommendation::Block);
        assert!(result.labels.contains(&ThreatLabel::SuspiciousExtension));
        assert!(result.labels.contains(&ThreatLabel::MalwareNamePattern));
        assert!(result.labels.contains(&ThreatLabel::ExecutableFile));
        assert!(result.labels.contains(&ThreatLabel::OffHoursUpload));
    }

    #[test]
    fn test_keygen_scenario_emits_one_high_alert() {
        let config = ScoringConfig::default();
        let fact = make_fact("keygen.exe", 150 * 1024 * 1024, 2);
        let sink = MemorySink::new();

        assess_upload(&fact, &UploaderContext::default(), &config, &sink).unwrap();

        let alerts = sink.snapshot();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::SuspiciousFile);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[0].file_id, Some(fact.file_id));
        assert_eq!(alerts[0].user_id, fact.uploader_id);
    }

    #[test]
    fn test_missing_extension_degrades_gracefully() {
        let config = ScoringConfig::default();
        let mut fact = make_fact("README", 1024, 10);
        fact.extension = Some("   ".to_string());

        // No extension-derived factors, no panic
        let result = score_upload(&fact, &UploaderContext::default(), &config);
        assert!(!result.labels.contains(&ThreatLabel::SuspiciousExtension));
        assert!(!result.labels.contains(&ThreatLabel::ExecutableFile));
    }

    #[test]
    fn test_upload_anomaly_needs_baseline() {
        let config = ScoringConfig::default();
        let fact = make_fact("notes.txt", 1024, 10);

        // No baseline: burst alone does not fire
        let new_user = UploaderContext {
            files_uploaded_today: 50,
            average_files_per_day: 0.0,
        };
        let result = score_upload(&fact, &new_user, &config);
        assert!(!result.labels.contains(&ThreatLabel::UnusualUploadVolume));

        // Established baseline: 50 > 3 x 2.0 fires
        let regular = UploaderContext {
            files_uploaded_today: 50,
            average_files_per_day: 2.0,
        };
        let result = score_upload(&fact, &regular, &config);
        assert!(result.labels.contains(&ThreatLabel::UnusualUploadVolume));
    }

    #[test]
    fn test_archive_contributes_to_exfiltration() {
        let config = ScoringConfig::default();
        let fact = make_fact("backup_all.zip", 200 * 1024 * 1024, 11);

        let result = score_upload(&fact, &UploaderContext::default(), &config);
        assert!(result.labels.contains(&ThreatLabel::ExfiltrationSize));
        assert!(result.labels.contains(&ThreatLabel::ArchiveBundle));
        assert!(result.exfiltration_probability >= 0.7);
    }

    #[test]
    fn test_medium_alert_between_thresholds() {
        let config = ScoringConfig::default();
        // exe extension + executable sub-score during business hours:
        // 0.3 + 0.4*0.4 = 0.46... add off-hours for 0.61 -> Medium band
        let fact = make_fact("setup.exe", 1024, 22);
        let sink = MemorySink::new();

        let result = assess_upload(&fact, &UploaderContext::default(), &config, &sink).unwrap();
        assert!(result.threat_score >= config.suspicious_threshold);
        assert!(result.threat_score < config.high_risk_threshold);

        let alerts = sink.snapshot();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
    }

    #[test]
    fn test_score_always_clamped() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let mut config = ScoringConfig::default();
            config.extension_score = rng.gen_range(0.0..=1.0);
            config.large_file_score = rng.gen_range(0.0..=1.0);
            config.off_hours_score = rng.gen_range(0.0..=1.0);
            config.unusual_uploads_score = rng.gen_range(0.0..=1.0);
            config.malware_probability_weight = rng.gen_range(0.0..=1.0);
            config.data_exfiltration_weight = rng.gen_range(0.0..=1.0);
            config.exfil_archive_score = rng.gen_range(0.0..=1.0);

            let names = ["keygen.exe", "a.zip", "huge.bin", "crack_patch_inject.scr"];
            let fact = make_fact(
                names[rng.gen_range(0..names.len())],
                rng.gen_range(0..=1_000_000_000_000u64),
                rng.gen_range(0..24),
            );
            let uploader = UploaderContext {
                files_uploaded_today: rng.gen_range(0..1000),
                average_files_per_day: rng.gen_range(0.0..50.0),
            };

            let result = score_upload(&fact, &uploader, &config);
            assert!((0.0..=1.0).contains(&result.threat_score));
            assert!((0.0..=1.0).contains(&result.malware_probability));
            assert!((0.0..=1.0).contains(&result.exfiltration_probability));
        }
    }

    #[test]
    fn test_rescan_creates_new_assessment() {
        let config = ScoringConfig::default();
        let fact = make_fact("keygen.exe", 1024, 10);

        let first = score_upload(&fact, &UploaderContext::default(), &config);
        let second = score_upload(&fact, &UploaderContext::default(), &config);

        assert_ne!(first.assessment_id, second.assessment_id);
        assert_eq!(first.threat_score, second.threat_score);
        assert_eq!(first.labels, second.labels);
    }
}
