//! Classification of the validation stage's free-text output.
//!
//! The model gives no structured verdict, so a sentence is considered
//! unanalyzable when the generated text contains one of a small set of
//! Arabic phrases. All matching lives here so the phrase list can change
//! without touching the pipeline.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

/// "incomplete" and "not understood".
pub const REJECTION_MARKERS: [&str; 2] = ["غير مكتملة", "غير مفهومة"];

static REJECTION_MATCHER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(REJECTION_MARKERS).expect("literal rejection markers"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationVerdict {
    Analyzable,
    /// Carries the marker that matched.
    Rejected(&'static str),
}

pub fn classify_validation(generated: &str) -> ValidationVerdict {
    let found = REJECTION_MATCHER
        .find(generated)
        .map(|m| REJECTION_MARKERS[m.pattern().as_usize()]);
    match found {
        Some(marker) => ValidationVerdict::Rejected(marker),
        None => ValidationVerdict::Analyzable,
    }
}
