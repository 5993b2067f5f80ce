//! Reading Pattern Analysis
//!
//! CHỈ chứa logic - pure function over the bounded trace.
//!
//! Two independent signals, each with its own cap, summed and clamped:
//! large non-sequential page jumps, and near-complete document coverage in
//! implausibly little view time.

use super::types::TracePoint;
use crate::logic::config::ScoringConfig;

/// Reading-pattern anomaly sub-score in [0,1].
///
/// Returns 0 below the minimum trace length - sparse traces are expected
/// for new sessions and carry no anomaly contribution.
pub fn reading_pattern_score(
    trace: &[TracePoint],
    total_pages: u32,
    view_time_secs: i64,
    config: &ScoringConfig,
) -> f32 {
    if trace.len() < config.pattern_min_trace {
        return 0.0;
    }

    let mut score = 0.0f32;

    // Signal (a): fraction of consecutive jumps larger than the jump window
    let transitions = trace.len().saturating_sub(1);
    let jumps = trace
        .windows(2)
        .filter(|w| (w[1].page as i64 - w[0].page as i64).abs() > config.pattern_jump_pages)
        .count();
    if transitions > 0 && jumps as f32 / transitions as f32 > config.pattern_jump_fraction {
        score += config.pattern_jump_score;
    }

    // Signal (b): visited most of the document in very little view time
    if total_pages > 0 {
        let mut visited: Vec<u32> = trace.iter().map(|p| p.page).collect();
        visited.sort_unstable();
        visited.dedup();
        let coverage = visited.len() as f32 / total_pages as f32;
        if coverage >= config.pattern_coverage_fraction
            && view_time_secs < config.pattern_coverage_secs
        {
            score += config.pattern_coverage_score;
        }
    }

    score.clamp(0.0, 1.0)
}

// ============================================================================
// TESTS
// ============================================================================
