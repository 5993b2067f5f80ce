//! Session Policy Snapshots
//!
//! The effective permission set governing one viewing session, captured at
//! session start from the surrounding authorization layer and expiring
//! automatically. The monitor consults it; it never owns it - a cache, not
//! a source of truth.

use std::collections::HashMap;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ============================================================================
// POLICY SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionPolicySnapshot {
    pub allow_print: bool,
    pub allow_copy: bool,
    pub allow_download: bool,
    pub block_context_menu: bool,
    /// View-time budget interpreted by the viewing client, not enforced here
    pub max_view_minutes: Option<u32>,
}

impl Default for SessionPolicySnapshot {
    fn default() -> Self {
        Self {
            allow_print: true,
            allow_copy: true,
            allow_download: true,
            block_context_menu: false,
            max_view_minutes: None,
        }
    }
}

impl SessionPolicySnapshot {
    /// Everything denied - the posture for unclassified confidential documents
    pub fn restrictive() -> Self {
        Self {
            allow_print: false,
            allow_copy: false,
            allow_download: false,
            block_context_menu: true,
            max_view_minutes: Some(30),
        }
    }
}

// ============================================================================
// TTL CACHE
// ============================================================================

/// Policy snapshots keyed by session id, expiring automatically.
/// Expired entries are pruned on access; a missing snapshot means no
/// policy-based rejections apply (the authorization layer re-supplies it
/// on the next session start).
pub struct PolicyCache {
    entries: RwLock<HashMap<String, (SessionPolicySnapshot, DateTime<Utc>)>>,
    ttl: Duration,
}

impl PolicyCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn insert(&self, session_id: &str, policy: SessionPolicySnapshot) {
        let expires = Utc::now() + self.ttl;
        self.entries
            .write()
            .insert(session_id.to_string(), (policy, expires));
    }

    pub fn get(&self, session_id: &str) -> Option<SessionPolicySnapshot> {
        let now = Utc::now();
        {
            let entries = self.entries.read();
            match entries.get(session_id) {
                Some((policy, expires)) if *expires > now => return Some(*policy),
                Some(_) => {} // expired, fall through to prune
                None => return None,
            }
        }

        self.entries.write().remove(session_id);
        None
    }

    /// Discard a session's snapshot (session end)
    pub fn remove(&self, session_id: &str) {
        self.entries.write().remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
