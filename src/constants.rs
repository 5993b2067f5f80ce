//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change a default path or interval, only edit this file.

/// Default path for the scoring config JSON file
pub const DEFAULT_CONFIG_PATH: &str = "portal-sentinel/scoring_config.json";

/// Default directory for the alert JSONL log
pub const DEFAULT_ALERT_DIR: &str = "portal-sentinel/alerts";

/// Default TTL for a session policy snapshot (seconds)
pub const DEFAULT_POLICY_TTL_SECS: i64 = 4 * 60 * 60;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Portal-Sentinel";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get scoring config path from environment or use default
pub fn get_config_path() -> String {
    std::env::var("PORTAL_SENTINEL_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Get alert log directory from environment or use default
pub fn get_alert_dir() -> String {
    std::env::var("PORTAL_SENTINEL_ALERT_DIR")
        .unwrap_or_else(|_| DEFAULT_ALERT_DIR.to_string())
}

/// Get policy snapshot TTL from environment or use default
pub fn get_policy_ttl_secs() -> i64 {
    std::env::var("PORTAL_SENTINEL_POLICY_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POLICY_TTL_SECS)
}
