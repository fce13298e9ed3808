//! Review moderation
//!
//! Untrusted review text is screened before it is cached or served. A review is
//! kept only when it passes every check:
//! - Not spam (no URLs, email addresses, or phone-number-like digit runs)
//! - Not profane (no whitespace-delimited token on the block-list)
//! - Structurally valid (content length, rating range, author present)

mod patterns;

pub use patterns::{contains_spam, SPAM_PATTERNS};

use crate::config::ModerationConfig;
use crate::review::Review;
use std::collections::HashSet;

/// Shortest content accepted, in characters
pub const MIN_CONTENT_CHARS: usize = 5;

/// Longest content accepted, in characters
pub const MAX_CONTENT_CHARS: usize = 1000;

/// Outcome of moderating a single review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Spam,
    Profane,
    Invalid,
}

/// Stateless review filter over a fixed block-list
#[derive(Debug, Clone)]
pub struct ModerationFilter {
    blocked_words: HashSet<String>,
}

impl ModerationFilter {
    /// Creates a filter with the given block-list
    ///
    /// Words are compared lower-cased.
    pub fn new<I, S>(blocked_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocked_words: blocked_words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Creates a filter from the moderation section of the configuration
    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(&config.blocked_words)
    }

    /// Keeps the reviews that pass every check, preserving order
    pub fn filter_reviews(&self, reviews: Vec<Review>) -> Vec<Review> {
        let before = reviews.len();
        let kept: Vec<Review> = reviews
            .into_iter()
            .filter(|review| self.verdict(review) == Verdict::Keep)
            .collect();

        if kept.len() < before {
            tracing::debug!("Moderation discarded {} of {} reviews", before - kept.len(), before);
        }

        kept
    }

    /// Classifies a review
    ///
    /// All three checks must pass for `Verdict::Keep`; the first failing check
    /// names the verdict.
    pub fn verdict(&self, review: &Review) -> Verdict {
        if self.is_spam(review) {
            Verdict::Spam
        } else if self.is_profane(review) {
            Verdict::Profane
        } else if !self.is_valid(review) {
            Verdict::Invalid
        } else {
            Verdict::Keep
        }
    }

    /// Checks the content against the spam patterns
    pub fn is_spam(&self, review: &Review) -> bool {
        contains_spam(&review.content)
    }

    /// Checks whether any lower-cased token is on the block-list
    pub fn is_profane(&self, review: &Review) -> bool {
        review
            .content
            .to_lowercase()
            .split_whitespace()
            .any(|token| self.blocked_words.contains(token))
    }

    /// Checks content length, rating range, and author
    pub fn is_valid(&self, review: &Review) -> bool {
        let length = review.content.chars().count();

        (MIN_CONTENT_CHARS..=MAX_CONTENT_CHARS).contains(&length)
            && (1..=5).contains(&review.rating)
            && !review.author.is_empty()
    }
}

impl Default for ModerationFilter {
    fn default() -> Self {
        Self::from_config(&ModerationConfig::default())
    }
}
