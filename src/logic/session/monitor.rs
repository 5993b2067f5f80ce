//! Viewer Session Monitor
//!
//! Ingests the stream of viewing events for document sessions, maintains
//! per-session counters and the reading-pattern trace, recomputes the live
//! suspicion score, and can unilaterally block a session.
//!
//! State machine per session:
//! `Created -> Active -> {Active(suspicious), Blocked}`, with `Ended`
//! orthogonal (always allowed, triggers one final score pass before the
//! session freezes).
//!
//! Concurrency: each session's mutable state lives behind its own
//! `Arc<Mutex<...>>` entry, so events for one session are serialized
//! (single-writer-per-session) while sessions never contend with each other.
//! The registry lock is only held for the lookup.

use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::pattern::reading_pattern_score;
use super::policy::{PolicyCache, SessionPolicySnapshot};
use super::types::{EventType, IngestOutcome, TracePoint, ViewerEvent, ViewerSession};
use crate::constants;
use crate::logic::alert::{AlertError, AlertSeverity, AlertSink, AlertType, NewAlert};
use crate::logic::config::ScoringConfig;

// Composite-score contribution steps and per-counter caps.
// Each counter's contribution is capped individually before summation.
const SCREENSHOT_STEP: f32 = 0.15;
const SCREENSHOT_CAP: f32 = 0.40;
const PRINT_STEP: f32 = 0.15;
const PRINT_CAP: f32 = 0.30;
const COPY_STEP: f32 = 0.10;
const COPY_CAP: f32 = 0.20;
const CLIPBOARD_STEP: f32 = 0.05;
const CLIPBOARD_CAP: f32 = 0.20;
const BLUR_STEP: f32 = 0.05;
const BLUR_CAP: f32 = 0.15;
const VISIBILITY_STEP: f32 = 0.05;
const VISIBILITY_CAP: f32 = 0.25;
const FULLSCREEN_STEP: f32 = 0.10;
const FULLSCREEN_CAP: f32 = 0.20;
const RAPID_PAGE_STEP: f32 = 0.10;
const RAPID_PAGE_CAP: f32 = 0.25;

// ============================================================================
// COMPOSITE SUSPICION SCORE
// ============================================================================

fn contribution(count: u32, step: f32, cap: f32) -> f32 {
    (count as f32 * step).min(cap)
}

/// Composite suspicion score: deterministic, purely a function of current
/// session state - safe to recompute at any time.
///
/// The view-time anomaly term is only evaluable once `ended_at` is set, so
/// a still-open session never accumulates it.
pub fn suspicion_score(session: &ViewerSession, config: &ScoringConfig) -> f32 {
    let c = &session.counters;
    let mut score = 0.0f32;

    score += contribution(c.screenshot_attempts, SCREENSHOT_STEP, SCREENSHOT_CAP);
    score += contribution(c.print_attempts, PRINT_STEP, PRINT_CAP);
    score += contribution(c.copy_attempts, COPY_STEP, COPY_CAP);
    score += contribution(c.clipboard_events, CLIPBOARD_STEP, CLIPBOARD_CAP);
    score += contribution(c.window_blur_events, BLUR_STEP, BLUR_CAP);
    score += contribution(c.visibility_loss_events, VISIBILITY_STEP, VISIBILITY_CAP);
    score += contribution(c.fullscreen_exit_events, FULLSCREEN_STEP, FULLSCREEN_CAP);
    score += contribution(c.rapid_page_changes, RAPID_PAGE_STEP, RAPID_PAGE_CAP);

    score += reading_pattern_score(
        &session.trace,
        session.total_pages,
        session.view_time_secs(),
        config,
    ) * config.pattern_weight;

    if session.is_ended() && c.page_view_count > 0 {
        let avg_secs_per_page = session.total_view_time_secs as f32 / c.page_view_count as f32;
        if avg_secs_per_page < config.fast_page_secs {
            score += config.view_time_anomaly_score;
        }
    }

    score.clamp(0.0, 1.0)
}

// ============================================================================
// SESSION MONITOR
// ============================================================================

pub struct SessionMonitor {
    sessions: RwLock<HashMap<String, Arc<Mutex<ViewerSession>>>>,
    policies: PolicyCache,
    // Append-only forensic log, shared across sessions
    events: Mutex<Vec<ViewerEvent>>,
    sink: Arc<dyn AlertSink>,
}

impl SessionMonitor {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self::with_policy_ttl(sink, constants::get_policy_ttl_secs())
    }

    pub fn with_policy_ttl(sink: Arc<dyn AlertSink>, policy_ttl_secs: i64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            policies: PolicyCache::new(policy_ttl_secs),
            events: Mutex::new(Vec::new()),
            sink,
        }
    }

    // ------------------------------------------------------------------
    // SESSION LIFECYCLE
    // ------------------------------------------------------------------

    /// Open a session and capture its policy snapshot. Returns the opaque
    /// session token the client presents with every event.
    pub fn start_session(
        &self,
        file_id: Uuid,
        viewer_id: Option<Uuid>,
        total_pages: u32,
        policy: SessionPolicySnapshot,
    ) -> String {
        let session_id = Uuid::new_v4().to_string();
        let session = ViewerSession::new(
            session_id.clone(),
            file_id,
            viewer_id,
            total_pages,
            Utc::now(),
        );

        self.policies.insert(&session_id, policy);
        self.sessions
            .write()
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));

        log::info!("Viewer session {} started for file {}", session_id, file_id);
        session_id
    }

    /// End a session: stamp `ended_at`, run one final score pass (now
    /// including the view-time term), ensure an alert exists if the session
    /// is still suspicious, and discard the policy snapshot. Idempotent.
    pub fn end_session(
        &self,
        session_id: &str,
        config: &ScoringConfig,
    ) -> Result<Option<ViewerSession>, AlertError> {
        let entry = match self.session_entry(session_id) {
            Some(entry) => entry,
            None => return Ok(None),
        };
        let mut session = entry.lock();

        if session.is_ended() {
            return Ok(Some(session.clone()));
        }

        let now = Utc::now();
        session.ended_at = Some(now);
        session.total_view_time_secs = (now - session.started_at).num_seconds().max(0);

        session.suspicion_score = suspicion_score(&session, config);
        session.suspicious = session.suspicion_score >= config.session_suspicious_score;

        if !session.blocked && session.suspicion_score >= config.session_block_score {
            let score = session.suspicion_score;
            self.block(
                &mut session,
                format!("AI-detected high suspicion, score={:.2}", score),
                AlertSeverity::from_score(score),
                now,
            )?;
        } else if session.suspicious && !session.alerted {
            self.emit_suspicious(&session)?;
            session.alerted = true;
        }

        self.policies.remove(session_id);
        log::info!(
            "Viewer session {} ended: score={:.2} suspicious={} blocked={}",
            session_id,
            session.suspicion_score,
            session.suspicious,
            session.blocked
        );
        Ok(Some(session.clone()))
    }

    // ------------------------------------------------------------------
    // EVENT INGESTION
    // ------------------------------------------------------------------

    /// Apply one client-observed event to its session.
    ///
    /// Unknown sessions are a no-op returning `blocked=false`. Already
    /// blocked (or ended) sessions append the event to the forensic log but
    /// skip all counter/score updates. Unknown event types are log-only.
    pub fn ingest(
        &self,
        session_id: &str,
        event_type: EventType,
        page_number: Option<u32>,
        payload: Option<String>,
        config: &ScoringConfig,
    ) -> Result<IngestOutcome, AlertError> {
        let entry = match self.session_entry(session_id) {
            Some(entry) => entry,
            None => {
                log::warn!("Event {} for unknown session {}", event_type, session_id);
                return Ok(IngestOutcome::allowed());
            }
        };
        let mut session = entry.lock();
        let now = Utc::now();

        // Frozen states: forensic append only
        if session.blocked {
            self.append_event(session_id, event_type, now, page_number, payload, true);
            let reason = session
                .block_reason
                .clone()
                .unwrap_or_else(|| "session blocked".to_string());
            return Ok(IngestOutcome::blocked(reason));
        }
        if session.is_ended() {
            self.append_event(session_id, event_type, now, page_number, payload, false);
            return Ok(IngestOutcome::allowed());
        }

        // Unknown event type: no counter effect, log only
        if let EventType::Other(_) = event_type {
            log::debug!(
                "Unrecognized event type '{}' on session {}",
                event_type,
                session_id
            );
            self.append_event(session_id, event_type, now, page_number, payload, false);
            return Ok(IngestOutcome::allowed());
        }

        let policy = self.policies.get(session_id);
        let mut rejected = false;
        let mut hard_block: Option<String> = None;

        match &event_type {
            EventType::ScreenshotAttempt => {
                session.counters.screenshot_attempts += 1;
                if session.counters.screenshot_attempts >= config.screenshot_block_count {
                    hard_block = Some(format!(
                        "{} screenshot attempts",
                        session.counters.screenshot_attempts
                    ));
                }
            }
            EventType::PrintAttempt => {
                session.counters.print_attempts += 1;
                // Policy violation rejects the action; the session itself
                // blocks on the repeat-attempt counter
                if matches!(policy, Some(p) if !p.allow_print) {
                    rejected = true;
                }
                if session.counters.print_attempts >= config.print_block_count {
                    hard_block =
                        Some(format!("{} print attempts", session.counters.print_attempts));
                }
            }
            EventType::CopyAttempt => {
                session.counters.copy_attempts += 1;
                if matches!(policy, Some(p) if !p.allow_copy) {
                    rejected = true;
                    hard_block = Some("copy not permitted by session policy".to_string());
                }
            }
            EventType::ClipboardCopy => {
                session.counters.copy_attempts += 1;
                session.counters.clipboard_events += 1;
                if session.counters.clipboard_events >= config.clipboard_block_count {
                    hard_block = Some(format!(
                        "{} clipboard events",
                        session.counters.clipboard_events
                    ));
                }
            }
            EventType::DownloadAttempt => {
                if matches!(policy, Some(p) if !p.allow_download) {
                    rejected = true;
                    hard_block = Some("download not permitted by session policy".to_string());
                }
            }
            EventType::PageView => {
                session.counters.page_view_count += 1;
                if let Some(page) = page_number {
                    session.current_page = page;
                }
                // The reading trace holds page views only; other events that
                // happen to carry a page number stay out of it
                let page = page_number.unwrap_or(session.current_page);
                session.trace.push(TracePoint { page, at: now });
                let overflow = session.trace.len().saturating_sub(config.trace_cap);
                if overflow > 0 {
                    session.trace.drain(0..overflow);
                }
                // Rapid paging: enough page views inside the trailing window
                let window_start = now - Duration::seconds(config.rapid_page_window_secs);
                let recent = session
                    .trace
                    .iter()
                    .filter(|p| p.at > window_start)
                    .count();
                if recent >= config.rapid_page_event_count {
                    session.counters.rapid_page_changes += 1;
                    if session.counters.rapid_page_changes >= config.rapid_page_block_count {
                        hard_block = Some(format!(
                            "{} rapid page change bursts",
                            session.counters.rapid_page_changes
                        ));
                    }
                }
            }
            EventType::VisibilityHidden => {
                session.counters.visibility_loss_events += 1;
                if session.counters.visibility_loss_events >= config.visibility_block_count {
                    hard_block = Some(format!(
                        "{} visibility-loss events",
                        session.counters.visibility_loss_events
                    ));
                }
            }
            EventType::WindowBlur => {
                session.counters.window_blur_events += 1;
            }
            EventType::FullscreenExit => {
                session.counters.fullscreen_exit_events += 1;
                if session.counters.fullscreen_exit_events >= config.fullscreen_block_count {
                    hard_block = Some(format!(
                        "{} fullscreen exits",
                        session.counters.fullscreen_exit_events
                    ));
                }
            }
            EventType::ContextMenu => {
                if matches!(policy, Some(p) if p.block_context_menu) {
                    rejected = true;
                    hard_block = Some("context menu blocked by session policy".to_string());
                }
            }
            EventType::ViewTimeExceeded => {
                hard_block = Some("view time budget exceeded".to_string());
            }
            EventType::Other(_) => unreachable!("handled above"),
        }

        session.last_activity_at = now;

        // Recompute the composite score and the suspicious flag
        let was_suspicious = session.suspicious;
        session.suspicion_score = suspicion_score(&session, config);
        session.suspicious = session.suspicion_score >= config.session_suspicious_score;

        if let Some(reason) = hard_block {
            self.block(&mut session, reason, AlertSeverity::High, now)?;
        } else if session.suspicion_score >= config.session_block_score {
            let score = session.suspicion_score;
            self.block(
                &mut session,
                format!("AI-detected high suspicion, score={:.2}", score),
                AlertSeverity::from_score(score),
                now,
            )?;
        } else if session.suspicious && !was_suspicious {
            self.emit_suspicious(&session)?;
            session.alerted = true;
        }

        self.append_event(
            session_id,
            event_type,
            now,
            page_number,
            payload,
            rejected || session.blocked,
        );

        if session.blocked {
            let reason = session
                .block_reason
                .clone()
                .unwrap_or_else(|| "session blocked".to_string());
            Ok(IngestOutcome::blocked(reason))
        } else {
            Ok(IngestOutcome::allowed())
        }
    }

    // ------------------------------------------------------------------
    // READS
    // ------------------------------------------------------------------

    /// Dashboard read: a copy of the session state
    pub fn session_snapshot(&self, session_id: &str) -> Option<ViewerSession> {
        self.session_entry(session_id).map(|entry| entry.lock().clone())
    }

    /// Forensic read: every event recorded for a session, in arrival order
    pub fn events_for(&self, session_id: &str) -> Vec<ViewerEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn policy_cache(&self) -> &PolicyCache {
        &self.policies
    }

    // ------------------------------------------------------------------
    // INTERNALS
    // ------------------------------------------------------------------

    fn session_entry(&self, session_id: &str) -> Option<Arc<Mutex<ViewerSession>>> {
        self.sessions.read().get(session_id).cloned()
    }

    fn append_event(
        &self,
        session_id: &str,
        event_type: EventType,
        timestamp: DateTime<Utc>,
        page_number: Option<u32>,
        payload: Option<String>,
        rejected: bool,
    ) {
        self.events.lock().push(ViewerEvent {
            event_id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            event_type,
            timestamp,
            page_number,
            payload,
            rejected,
        });
    }

    /// One-way latch: once blocked, later triggers are ignored for side
    /// effects (but their events are still logged by the caller).
    fn block(
        &self,
        session: &mut ViewerSession,
        reason: String,
        severity: AlertSeverity,
        now: DateTime<Utc>,
    ) -> Result<(), AlertError> {
        if session.blocked {
            return Ok(());
        }

        session.blocked = true;
        session.block_reason = Some(reason.clone());
        session.blocked_at = Some(now);

        log::warn!("Session {} blocked: {}", session.session_id, reason);

        self.sink.emit(
            NewAlert::new(
                AlertType::SessionBlocked,
                severity,
                session.viewer_id.unwrap_or_else(Uuid::nil),
                session.suspicion_score.max(0.8),
                format!("Viewer session blocked: {}", reason),
                "session_block",
            )
            .with_file(session.file_id)
            .with_session(session.session_id.clone()),
        )?;
        session.alerted = true;
        Ok(())
    }

    fn emit_suspicious(&self, session: &ViewerSession) -> Result<(), AlertError> {
        self.sink.emit(
            NewAlert::new(
                AlertType::SuspiciousSession,
                AlertSeverity::Medium,
                session.viewer_id.unwrap_or_else(Uuid::nil),
                session.suspicion_score,
                format!(
                    "Viewer session suspicion score {:.2}",
                    session.suspicion_score
                ),
                "session_suspicion",
            )
            .with_file(session.file_id)
            .with_session(session.session_id.clone()),
        )?;
        Ok(())
    }
}
