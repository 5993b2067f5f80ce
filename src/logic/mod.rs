//! Engine Logic
//!
//! Three cooperating scorers over a shared config snapshot and alert sink:
//! - `file_threat`: one uploaded file -> threat score + recommendation
//! - `behavior`: rolling per-user baseline -> live risk score
//! - `session`: document-viewing event stream -> suspicion score + blocking

pub mod config;
pub mod alert;
pub mod file_threat;
pub mod behavior;
pub mod session;
