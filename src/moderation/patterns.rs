//! Spam pattern set

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern sources: URL-like text, email addresses, phone-number-like digit runs
pub const SPAM_PATTERNS: [&str; 3] = [
    r"(?i)\b(http|www)\S+",
    r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
    r"\+?\d[\d\s-]{8,}",
];

static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    SPAM_PATTERNS
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!("Invalid spam pattern {}: {}", pattern, e);
                None
            }
        })
        .collect()
});

/// Returns true if the text matches any spam pattern
pub fn contains_spam(text: &str) -> bool {
    COMPILED.iter().any(|re| re.is_match(text))
}
