//! Scoring Config Module
//!
//! Versioned weights and thresholds shared by all three scorers.
//!
//! ## Structure
//! - `types`: `ScoringConfig` struct, defaults, validation
//! - `store`: JSON persistence + global hot-swap snapshot holder
//!
//! ## Usage
//! ```ignore
//! use crate::logic::config;
//!
//! config::install(ScoringConfig::default())?;
//! let snapshot = config::current()?; // Arc<ScoringConfig>, fail-closed
//! ```

pub mod types;
pub mod store;

pub use types::{ConfigError, ScoringConfig};
pub use store::{current, install, load_config, reload_from, save_config};
