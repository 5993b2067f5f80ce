//! Behavior Module
//!
//! Rolling per-user activity baselines và live deviation scoring.
//!
//! ## Structure
//! - `types`: profile, analysis result, `ActivityProvider` collaborator trait
//! - `profiler`: baseline recompute + today-vs-baseline analysis
//!
//! ## Usage
//! ```ignore
//! use crate::logic::behavior::BehaviorProfiler;
//!
//! let profiler = BehaviorProfiler::new(provider, sink);
//! let analysis = profiler.analyze(user_id, &config)?;
//! ```

pub mod types;
pub mod profiler;

pub use types::{
    ActivityProvider, BehaviorAnalysis, BehaviorAnomaly, BehaviorError, FileActivity, RiskLevel,
    UserBehaviorProfile,
};
pub use profiler::BehaviorProfiler;
