use std::sync::Arc;
use uuid::Uuid;

use super::monitor::{suspicion_score, SessionMonitor};
use super::policy::SessionPolicySnapshot;
use super::types::EventType;
use crate::logic::alert::{AlertSeverity, AlertType, MemorySink};
use crate::logic::config::ScoringConfig;

fn setup() -> (Arc<MemorySink>, SessionMonitor, ScoringConfig) {
    let sink = Arc::new(MemorySink::new());
    let monitor = SessionMonitor::with_policy_ttl(sink.clone(), 3600);
    (sink, monitor, ScoringConfig::default())
}

fn open_session(monitor: &SessionMonitor, policy: SessionPolicySnapshot) -> String {
    monitor.start_session(Uuid::new_v4(), Some(Uuid::new_v4()), 100, policy)
}

fn ingest(
    monitor: &SessionMonitor,
    session_id: &str,
    event: EventType,
    config: &ScoringConfig,
) -> super::types::IngestOutcome {
    monitor.ingest(session_id, event, None, None, config).unwrap()
}

// ============================================================================
// HARD-BLOCK TRIGGERS
// ============================================================================

#[test]
fn test_two_screenshots_do_not_block() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    assert!(!ingest(&monitor, &id, EventType::ScreenshotAttempt, &config).blocked);
    assert!(!ingest(&monitor, &id, EventType::ScreenshotAttempt, &config).blocked);

    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.counters.screenshot_attempts, 2);
    assert!(!session.blocked);
}

#[test]
fn test_third_screenshot_blocks_with_reason() {
    let (sink, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    let outcome = ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);

    assert!(outcome.blocked);
    assert!(outcome.reason.unwrap().contains("screenshot"));

    let session = monitor.session_snapshot(&id).unwrap();
    assert!(session.blocked);
    assert!(session.blocked_at.is_some());

    let alerts = sink.snapshot();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::SessionBlocked);
    assert_eq!(alerts[0].severity, AlertSeverity::High);
    assert_eq!(alerts[0].session_id.as_deref(), Some(id.as_str()));
}

#[test]
fn test_clipboard_threshold_blocks() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    for _ in 0..4 {
        assert!(!ingest(&monitor, &id, EventType::ClipboardCopy, &config).blocked);
    }
    let outcome = ingest(&monitor, &id, EventType::ClipboardCopy, &config);
    assert!(outcome.blocked);
    assert!(outcome.reason.unwrap().contains("clipboard"));
}

#[test]
fn test_visibility_loss_threshold_blocks() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    for _ in 0..5 {
        assert!(!ingest(&monitor, &id, EventType::VisibilityHidden, &config).blocked);
    }
    assert!(ingest(&monitor, &id, EventType::VisibilityHidden, &config).blocked);
}

#[test]
fn test_fullscreen_exit_threshold_blocks() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    ingest(&monitor, &id, EventType::FullscreenExit, &config);
    ingest(&monitor, &id, EventType::FullscreenExit, &config);
    assert!(ingest(&monitor, &id, EventType::FullscreenExit, &config).blocked);
}

#[test]
fn test_rapid_page_bursts_block() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    // All views land within the trailing window in test time; from the
    // tenth view onward every view is a rapid burst, the third burst blocks
    let mut blocked_at_view = None;
    for view in 1..=20u32 {
        let outcome = monitor
            .ingest(&id, EventType::PageView, Some(view), None, &config)
            .unwrap();
        if outcome.blocked {
            blocked_at_view = Some(view);
            assert!(outcome.reason.unwrap().contains("rapid"));
            break;
        }
    }
    assert_eq!(blocked_at_view, Some(12));

    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.counters.rapid_page_changes, 3);
}

#[test]
fn test_view_time_exceeded_blocks() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    let outcome = ingest(&monitor, &id, EventType::ViewTimeExceeded, &config);
    assert!(outcome.blocked);
    assert!(outcome.reason.unwrap().contains("view time"));
}

// ============================================================================
// POLICY-DRIVEN REJECTIONS
// ============================================================================

#[test]
fn test_forbidden_print_rejects_event_then_counter_blocks() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::restrictive());

    // First print: session stays open, the event itself is rejected
    let outcome = ingest(&monitor, &id, EventType::PrintAttempt, &config);
    assert!(!outcome.blocked);
    let events = monitor.events_for(&id);
    assert_eq!(events.len(), 1);
    assert!(events[0].rejected);

    // Second print crosses the repeat-attempt counter
    let outcome = ingest(&monitor, &id, EventType::PrintAttempt, &config);
    assert!(outcome.blocked);
    assert!(outcome.reason.unwrap().contains("print"));
}

#[test]
fn test_allowed_prints_still_block_on_counter() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    let outcome = ingest(&monitor, &id, EventType::PrintAttempt, &config);
    assert!(!outcome.blocked);
    let events = monitor.events_for(&id);
    assert!(!events[0].rejected);

    assert!(ingest(&monitor, &id, EventType::PrintAttempt, &config).blocked);
}

#[test]
fn test_forbidden_copy_blocks_immediately() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::restrictive());

    let outcome = ingest(&monitor, &id, EventType::CopyAttempt, &config);
    assert!(outcome.blocked);
    assert!(outcome.reason.unwrap().contains("copy"));
    assert!(monitor.events_for(&id)[0].rejected);
}

#[test]
fn test_forbidden_download_blocks_immediately() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::restrictive());

    assert!(ingest(&monitor, &id, EventType::DownloadAttempt, &config).blocked);
}

#[test]
fn test_allowed_download_is_noop() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    let outcome = ingest(&monitor, &id, EventType::DownloadAttempt, &config);
    assert!(!outcome.blocked);

    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.suspicion_score, 0.0);
}

#[test]
fn test_blocked_context_menu_blocks_immediately() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::restrictive());

    let outcome = ingest(&monitor, &id, EventType::ContextMenu, &config);
    assert!(outcome.blocked);
    assert!(outcome.reason.unwrap().contains("context menu"));
}

// ============================================================================
// BLOCKING IS A ONE-WAY LATCH
// ============================================================================

#[test]
fn test_blocked_is_monotonic_and_forensic_log_continues() {
    let (sink, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    for _ in 0..3 {
        ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    }
    let session = monitor.session_snapshot(&id).unwrap();
    assert!(session.blocked);
    let counters_at_block = session.counters;

    // Every further event reports blocked and mutates nothing
    for _ in 0..5 {
        let outcome = ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
        assert!(outcome.blocked);
    }
    let session = monitor.session_snapshot(&id).unwrap();
    assert!(session.blocked);
    assert_eq!(
        session.counters.screenshot_attempts,
        counters_at_block.screenshot_attempts
    );

    // Forensics: post-block events are still in the log, flagged rejected
    let events = monitor.events_for(&id);
    assert_eq!(events.len(), 8);
    assert!(events[3..].iter().all(|e| e.rejected));

    // No duplicate block alerts
    let block_alerts = sink
        .snapshot()
        .into_iter()
        .filter(|a| a.alert_type == AlertType::SessionBlocked)
        .count();
    assert_eq!(block_alerts, 1);
}

// ============================================================================
// COMPOSITE SCORE & SUSPICIOUS TRANSITION
// ============================================================================

#[test]
fn test_suspicion_score_is_idempotent() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::WindowBlur, &config);
    monitor
        .ingest(&id, EventType::PageView, Some(3), None, &config)
        .unwrap();

    let session = monitor.session_snapshot(&id).unwrap();
    let first = suspicion_score(&session, &config);
    let second = suspicion_score(&session, &config);
    assert_eq!(first, second);
    assert_eq!(first, session.suspicion_score);
}

#[test]
fn test_suspicious_transition_emits_one_medium_alert() {
    let (sink, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    // 2 screenshots (0.30) + 1 print (0.15) + 2 copies (0.20) = 0.65
    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::PrintAttempt, &config);
    ingest(&monitor, &id, EventType::CopyAttempt, &config);
    ingest(&monitor, &id, EventType::CopyAttempt, &config);

    let session = monitor.session_snapshot(&id).unwrap();
    assert!(session.suspicious);
    assert!(!session.blocked);

    let alerts = sink.snapshot();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::SuspiciousSession);
    assert_eq!(alerts[0].severity, AlertSeverity::Medium);

    // More sub-threshold activity does not re-alert
    ingest(&monitor, &id, EventType::WindowBlur, &config);
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_window_blur_contributes_but_never_blocks() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    for _ in 0..50 {
        assert!(!ingest(&monitor, &id, EventType::WindowBlur, &config).blocked);
    }
    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.counters.window_blur_events, 50);
    // Capped contribution
    assert!(session.suspicion_score <= 0.15 + f32::EPSILON);
}

#[test]
fn test_score_clamped_under_event_storm() {
    let (_, monitor, mut config) = setup();
    // Disable hard blocks so every counter can run far past its cap
    config.screenshot_block_count = u32::MAX;
    config.print_block_count = u32::MAX;
    config.clipboard_block_count = u32::MAX;
    config.visibility_block_count = u32::MAX;
    config.fullscreen_block_count = u32::MAX;
    config.rapid_page_block_count = u32::MAX;
    config.session_block_score = 1.0;

    let id = open_session(&monitor, SessionPolicySnapshot::default());
    let storm = [
        EventType::ScreenshotAttempt,
        EventType::PrintAttempt,
        EventType::CopyAttempt,
        EventType::ClipboardCopy,
        EventType::WindowBlur,
        EventType::VisibilityHidden,
        EventType::FullscreenExit,
    ];
    for _ in 0..30 {
        for event in storm.clone() {
            ingest(&monitor, &id, event, &config);
        }
        monitor
            .ingest(&id, EventType::PageView, Some(1), None, &config)
            .unwrap();
    }

    let session = monitor.session_snapshot(&id).unwrap();
    assert!((0.0..=1.0).contains(&session.suspicion_score));
    assert_eq!(session.suspicion_score, 1.0);
}

// ============================================================================
// INPUT DEFECTS
// ============================================================================

#[test]
fn test_unknown_session_is_noop() {
    let (sink, monitor, config) = setup();

    let outcome = monitor
        .ingest("no-such-session", EventType::ScreenshotAttempt, None, None, &config)
        .unwrap();
    assert!(!outcome.blocked);
    assert!(outcome.reason.is_none());
    assert!(sink.is_empty());
}

#[test]
fn test_unknown_event_type_is_log_only() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    let outcome = monitor
        .ingest(
            &id,
            EventType::parse("quantum_exfiltration"),
            None,
            None,
            &config,
        )
        .unwrap();
    assert!(!outcome.blocked);

    // Logged for forensics, zero counter/score effect
    let events = monitor.events_for(&id);
    assert_eq!(events.len(), 1);
    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.counters.page_view_count, 0);
    assert_eq!(session.suspicion_score, 0.0);
}

// ============================================================================
// SESSION END
// ============================================================================

#[test]
fn test_end_session_freezes_and_discards_policy() {
    let (_, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::restrictive());
    assert_eq!(monitor.policy_cache().len(), 1);

    monitor
        .ingest(&id, EventType::PageView, Some(1), None, &config)
        .unwrap();
    let ended = monitor.end_session(&id, &config).unwrap().unwrap();
    assert!(ended.is_ended());
    assert!(monitor.policy_cache().is_empty());

    // Frozen: later events are log-only
    let outcome = ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    assert!(!outcome.blocked);
    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.counters.screenshot_attempts, 0);

    // Idempotent
    let again = monitor.end_session(&id, &config).unwrap().unwrap();
    assert_eq!(again.ended_at, ended.ended_at);
}

#[test]
fn test_view_time_anomaly_only_after_end() {
    let (sink, monitor, config) = setup();
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    // 0.30 + 0.15 = 0.45: below the suspicious threshold while open
    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::PrintAttempt, &config);
    for page in 1..=3u32 {
        monitor
            .ingest(&id, EventType::PageView, Some(page), None, &config)
            .unwrap();
    }

    let live = monitor.session_snapshot(&id).unwrap();
    assert!(!live.suspicious);
    assert!(sink.is_empty());

    // Ending a near-instant session makes avg time-per-page collapse:
    // +0.20 pushes the final pass over the suspicious threshold
    let ended = monitor.end_session(&id, &config).unwrap().unwrap();
    assert!(ended.suspicion_score >= 0.6);
    assert!(ended.suspicious);

    // The end pass ensured an alert exists
    let alerts = sink.snapshot();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::SuspiciousSession);
}

#[test]
fn test_end_session_blocks_when_final_score_crosses() {
    let (sink, monitor, mut config) = setup();
    config.session_block_score = 0.6;
    let id = open_session(&monitor, SessionPolicySnapshot::default());

    // 0.45 live, under the lowered block threshold
    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::ScreenshotAttempt, &config);
    ingest(&monitor, &id, EventType::PrintAttempt, &config);
    for page in 1..=3u32 {
        monitor
            .ingest(&id, EventType::PageView, Some(page), None, &config)
            .unwrap();
    }
    assert!(!monitor.session_snapshot(&id).unwrap().blocked);

    // The view-time term lands 0.65 on the final pass, over 0.6
    let ended = monitor.end_session(&id, &config).unwrap().unwrap();
    assert!(ended.blocked);
    assert!(ended.block_reason.unwrap().contains("score="));

    let alerts = sink.snapshot();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::SessionBlocked);
}

#[test]
fn test_end_unknown_session() {
    let (_, monitor, config) = setup();
    assert!(monitor.end_session("ghost", &config).unwrap().is_none());
}

// ============================================================================
// READING PATTERN IN THE COMPOSITE
// ============================================================================

#[test]
fn test_erratic_trace_raises_live_score() {
    let (_, monitor, mut config) = setup();
    config.rapid_page_block_count = u32::MAX; // isolate the pattern term

    let id = open_session(&monitor, SessionPolicySnapshot::default());
    for page in [1u32, 90, 1, 90, 1, 90, 1, 90, 1, 90] {
        monitor
            .ingest(&id, EventType::PageView, Some(page), None, &config)
            .unwrap();
    }

    let session = monitor.session_snapshot(&id).unwrap();
    // Jump signal (0.3) scaled by the pattern weight
    assert!(session.suspicion_score >= 0.3 * config.pattern_weight);
    assert!(!session.blocked);
}

#[test]
fn test_trace_records_page_views_only() {
    let (_, monitor, mut config) = setup();
    config.rapid_page_event_count = 3;
    config.rapid_page_block_count = 1;

    let id = open_session(&monitor, SessionPolicySnapshot::default());

    // Non-page-view events carrying a page number stay out of the trace
    // and the rapid-paging window
    monitor
        .ingest(&id, EventType::ScreenshotAttempt, Some(5), None, &config)
        .unwrap();
    monitor
        .ingest(&id, EventType::WindowBlur, Some(6), None, &config)
        .unwrap();
    let session = monitor.session_snapshot(&id).unwrap();
    assert!(session.trace.is_empty());

    // A page view without an explicit page number still enters the trace
    // at the current page
    monitor
        .ingest(&id, EventType::PageView, Some(7), None, &config)
        .unwrap();
    monitor
        .ingest(&id, EventType::PageView, None, None, &config)
        .unwrap();
    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.trace.len(), 2);
    assert_eq!(session.trace.last().unwrap().page, 7);
    assert_eq!(session.counters.rapid_page_changes, 0);

    // The third page view inside the window is the burst that blocks;
    // the two earlier page-carrying events did not inflate the count
    let outcome = monitor
        .ingest(&id, EventType::PageView, Some(8), None, &config)
        .unwrap();
    assert!(outcome.blocked);
}

#[test]
fn test_trace_is_bounded() {
    let (_, monitor, mut config) = setup();
    config.rapid_page_block_count = u32::MAX;
    config.trace_cap = 100;

    let id = open_session(&monitor, SessionPolicySnapshot::default());
    for i in 0..250u32 {
        monitor
            .ingest(&id, EventType::PageView, Some(i % 40), None, &config)
            .unwrap();
    }

    let session = monitor.session_snapshot(&id).unwrap();
    assert_eq!(session.trace.len(), 100);
    assert_eq!(session.counters.page_view_count, 250);
    // Oldest entries were dropped, most recent kept
    assert_eq!(session.trace.last().unwrap().page, 249 % 40);
}
