//! File Threat Rules
//!
//! Built-in lexical malware markers and extension classes. These feed the
//! malware/exfiltration sub-scores; the structural weights live in
//! `ScoringConfig`.

use once_cell::sync::Lazy;
use regex::RegexSet;

/// Filename markers commonly seen on cracked/injected tooling.
/// Matched case-insensitively against the full filename.
static MALWARE_NAME_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)crack",
        r"(?i)keygen",
        r"(?i)patch(er)?",
        r"(?i)hack(tool)?",
        r"(?i)warez",
        r"(?i)trojan",
        r"(?i)payload",
        r"(?i)inject(or)?",
    ])
    .expect("malware name patterns are valid regexes")
});

/// Extensions that execute directly when opened
const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "scr", "bat", "cmd", "com", "pif", "msi"];

/// Sub-score increment per malware signal
pub const MALWARE_NAME_SCORE: f32 = 0.6;
pub const EXECUTABLE_SCORE: f32 = 0.4;

/// Exfiltration size-tier increments
pub const EXFIL_LARGE_SCORE: f32 = 0.4;
pub const EXFIL_HUGE_SCORE: f32 = 0.3;

pub fn filename_has_malware_marker(filename: &str) -> bool {
    MALWARE_NAME_PATTERNS.is_match(filename)
}

pub fn is_executable_extension(ext: &str) -> bool {
    EXECUTABLE_EXTENSIONS.contains(&ext)
}

// ============================================================================
// TESTS
// ============================================================================
