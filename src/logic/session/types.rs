//! Viewer Session Types
//!
//! Core types cho session monitoring.
//! KHÔNG chứa logic - chỉ data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// EVENT TYPE
// ============================================================================

/// Client-observed action inside a viewing session.
///
/// `Other` carries any event type the engine does not recognize; such events
/// are appended to the forensic log but have no counter or score effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    ScreenshotAttempt,
    PrintAttempt,
    CopyAttempt,
    ClipboardCopy,
    DownloadAttempt,
    PageView,
    VisibilityHidden,
    WindowBlur,
    FullscreenExit,
    ContextMenu,
    /// Posted by the viewing client when its max-view-time budget runs out
    ViewTimeExceeded,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::ScreenshotAttempt => "screenshot_attempt",
            EventType::PrintAttempt => "print_attempt",
            EventType::CopyAttempt => "copy_attempt",
            EventType::ClipboardCopy => "clipboard_copy",
            EventType::DownloadAttempt => "download_attempt",
            EventType::PageView => "page_view",
            EventType::VisibilityHidden => "visibility_hidden",
            EventType::WindowBlur => "window_blur",
            EventType::FullscreenExit => "fullscreen_exit",
            EventType::ContextMenu => "context_menu",
            EventType::ViewTimeExceeded => "view_time_exceeded",
            EventType::Other(s) => s.as_str(),
        }
    }

    /// Parse a wire event type. Unknown strings become `Other`, never an error.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "screenshot_attempt" => EventType::ScreenshotAttempt,
            "print_attempt" => EventType::PrintAttempt,
            "copy_attempt" => EventType::CopyAttempt,
            "clipboard_copy" => EventType::ClipboardCopy,
            "download_attempt" => EventType::DownloadAttempt,
            "page_view" => EventType::PageView,
            "visibility_hidden" => EventType::VisibilityHidden,
            "window_blur" => EventType::WindowBlur,
            "fullscreen_exit" => EventType::FullscreenExit,
            "context_menu" => EventType::ContextMenu,
            "view_time_exceeded" => EventType::ViewTimeExceeded,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SESSION STATE
// ============================================================================

/// Per-event-type counters. Monotonically non-decreasing until the session ends.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionCounters {
    pub screenshot_attempts: u32,
    pub print_attempts: u32,
    pub copy_attempts: u32,
    pub clipboard_events: u32,
    pub window_blur_events: u32,
    pub visibility_loss_events: u32,
    pub fullscreen_exit_events: u32,
    pub rapid_page_changes: u32,
    pub page_view_count: u32,
}

/// One entry of the bounded reading-pattern trace
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TracePoint {
    pub page: u32,
    pub at: DateTime<Utc>,
}

/// One document-viewing session.
///
/// Mutated by every ingested event; frozen once `ended_at` is set.
/// `blocked` is a one-way latch: false -> true only, never reset by the
/// engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSession {
    pub session_id: String,
    pub file_id: Uuid,
    pub viewer_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Timestamp of the most recent ingested event
    pub last_activity_at: DateTime<Utc>,
    pub counters: SessionCounters,
    pub current_page: u32,
    pub total_pages: u32,
    /// Final cumulative view time, computed when the session ends
    pub total_view_time_secs: i64,
    /// Most recent (page, timestamp) entries, capped by config
    pub trace: Vec<TracePoint>,
    pub suspicion_score: f32,
    pub suspicious: bool,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub blocked_at: Option<DateTime<Utc>>,
    /// Latch: an alert for this session's suspicious/blocked state exists
    pub alerted: bool,
}

impl ViewerSession {
    pub fn new(
        session_id: String,
        file_id: Uuid,
        viewer_id: Option<Uuid>,
        total_pages: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            file_id,
            viewer_id,
            started_at,
            ended_at: None,
            last_activity_at: started_at,
            counters: SessionCounters::default(),
            current_page: 0,
            total_pages,
            total_view_time_secs: 0,
            trace: Vec::new(),
            suspicion_score: 0.0,
            suspicious: false,
            blocked: false,
            block_reason: None,
            blocked_at: None,
            alerted: false,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Cumulative view time as a pure function of session state: up to the
    /// end timestamp once ended, otherwise up to the last ingested event.
    pub fn view_time_secs(&self) -> i64 {
        let until = self.ended_at.unwrap_or(self.last_activity_at);
        (until - self.started_at).num_seconds().max(0)
    }
}

// ============================================================================
// EVENT LOG
// ============================================================================

/// One ingested client signal. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerEvent {
    pub event_id: Uuid,
    pub session_id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub page_number: Option<u32>,
    pub payload: Option<String>,
    /// This specific event was denied (policy violation or blocked session)
    pub rejected: bool,
}

// ============================================================================
// INGEST OUTCOME
// ============================================================================

/// Live answer to one event ingestion, consumed by the viewer client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub blocked: bool,
    pub reason: Option<String>,
}

impl IngestOutcome {
    pub fn allowed() -> Self {
        Self {
            blocked: false,
            reason: None,
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
