//! File Threat Module
//!
//! Scores a single uploaded file + its uploader's recent activity into a
//! threat score and a recommendation (allow/monitor/review/block).
//!
//! ## Structure
//! - `types`: `FileUploadFact`, `FileThreatAssessment`, labels, recommendation
//! - `rules`: malware filename lexicon, executable extension class
//! - `scorer`: additive weighted heuristic + alert side effect
//!
//! ## Usage
//! ```ignore
//! use crate::logic::{config, file_threat};
//!
//! let snapshot = config::current()?;
//! let assessment = file_threat::assess_upload(&fact, &uploader, &snapshot, &sink)?;
//! ```

pub mod types;
pub mod rules;
pub mod scorer;

pub use types::{
    FileThreatAssessment, FileUploadFact, Recommendation, ThreatLabel, UploaderContext,
};
pub use scorer::{assess_upload, score_upload};
