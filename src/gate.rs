//! Local checks applied to a sentence before any network call is made.

use crate::error::AnalysisError;

/// Minimum number of characters in the trimmed sentence.
pub const MIN_SENTENCE_CHARS: usize = 2;

fn is_arabic_block(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

/// True when strictly more than half of the characters fall in the Arabic
/// block (U+0600..=U+06FF). Whitespace, digits and punctuation count toward
/// the total but never toward the Arabic share.
pub fn is_mostly_arabic(text: &str) -> bool {
    let mut total = 0usize;
    let mut arabic = 0usize;
    for c in text.chars() {
        total += 1;
        if is_arabic_block(c) {
            arabic += 1;
        }
    }
    arabic as f64 > total as f64 * 0.5
}

/// Length check on the trimmed sentence, then the Arabic ratio on the
/// sentence exactly as submitted.
pub fn check_sentence(sentence: &str) -> Result<(), AnalysisError> {
    if sentence.trim().chars().count() < MIN_SENTENCE_CHARS {
        return Err(AnalysisError::TooShort);
    }
    if !is_mostly_arabic(sentence) {
        return Err(AnalysisError::NotArabic);
    }
    Ok(())
}
