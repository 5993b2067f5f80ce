//! Scoring Config Storage & Hot-Reload
//!
//! JSON persistence for `ScoringConfig` plus the global snapshot holder.
//!
//! Scorers call `current()` at the start of every invocation and keep the
//! returned `Arc` for the duration of that invocation, so an admin update
//! mid-flight never mixes two policies inside one scoring pass. If nothing
//! was ever installed, `current()` fails closed - the engine refuses to
//! score rather than run with default-zero or stale weights.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::types::{ConfigError, ScoringConfig};

// ============================================================================
// STATE
// ============================================================================

static CURRENT: Lazy<RwLock<Option<Arc<ScoringConfig>>>> = Lazy::new(|| RwLock::new(None));

// ============================================================================
// SNAPSHOT HOLDER
// ============================================================================

/// Get the current config snapshot.
///
/// Fails closed with `ConfigError::NotInstalled` when no config has been
/// installed yet.
pub fn current() -> Result<Arc<ScoringConfig>, ConfigError> {
    CURRENT
        .read()
        .as_ref()
        .cloned()
        .ok_or(ConfigError::NotInstalled)
}

/// Install a new config snapshot atomically.
///
/// Validates first; an invalid config leaves the previous snapshot in place.
pub fn install(config: ScoringConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let version = config.version;
    *CURRENT.write() = Some(Arc::new(config));
    log::info!("Scoring config v{} installed", version);
    Ok(())
}

/// Drop the installed snapshot (test hook; also used on fatal config errors
/// so subsequent scoring fails closed instead of using a known-bad policy)
pub fn clear() {
    *CURRENT.write() = None;
}

// ============================================================================
// DISK STORAGE
// ============================================================================

/// Load a config from disk with validation
pub fn load_config(path: &Path) -> Result<ScoringConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Scoring config file not found",
        )));
    }

    let data = fs::read(path)?;
    let config: ScoringConfig = serde_json::from_slice(&data)?;
    config.validate()?;
    Ok(config)
}

/// Save a config to disk
pub fn save_config(config: &ScoringConfig, path: &Path) -> Result<(), ConfigError> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load from disk and install in one step (startup / admin reload path)
pub fn reload_from(path: &Path) -> Result<(), ConfigError> {
    let config = load_config(path)?;
    install(config)
}

// ============================================================================
// TESTS
// ============================================================================
