//! Sentiment scoring for reviews
//!
//! Scoring is a pure function of the review text: tokens are looked up in a
//! valence lexicon, a preceding negator flips a token's sign, and the total is
//! also reported per token as the comparative score.

mod lexicon;
mod stats;

pub use lexicon::{is_negator, valence};
pub use stats::SentimentStats;

use crate::review::Review;
use serde::Serialize;
use std::collections::HashMap;

/// Sentiment of a single piece of text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentScore {
    /// Sum of token valences
    pub score: i32,

    /// Score divided by the number of tokens (0 when there are none)
    pub comparative: f64,

    /// Tokens that contributed positively, in text order
    pub positive_terms: Vec<String>,

    /// Tokens that contributed negatively, in text order
    pub negative_terms: Vec<String>,
}

/// Splits text into lower-case word tokens
///
/// Punctuation is stripped in place rather than treated as a separator, so
/// "good,bad" is the single token "goodbad". Apostrophes and hyphens stay
/// inside words so that "don't" and "well-being" survive; whitespace is the
/// only separator.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            '\u{2019}' => Some('\''),
            c if c.is_alphanumeric() || c.is_whitespace() || c == '\'' || c == '-' => Some(c),
            _ => None,
        })
        .collect();

    cleaned
        .split_whitespace()
        .map(|token| token.trim_matches(|c| c == '\'' || c == '-'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scores arbitrary text
pub fn analyze_text(text: &str) -> SentimentScore {
    let tokens = tokenize(text);
    let mut result = SentimentScore::default();

    for (i, token) in tokens.iter().enumerate() {
        let Some(mut value) = valence(token) else {
            continue;
        };

        if i > 0 && is_negator(&tokens[i - 1]) {
            value = -value;
        }

        result.score += value;
        if value > 0 {
            result.positive_terms.push(token.clone());
        } else if value < 0 {
            result.negative_terms.push(token.clone());
        }
    }

    if !tokens.is_empty() {
        result.comparative = f64::from(result.score) / tokens.len() as f64;
    }

    result
}

/// Scores a review's content
///
/// Empty content yields a neutral score of 0.
pub fn analyze_sentiment(review: &Review) -> SentimentScore {
    analyze_text(&review.content)
}

/// Scores every review, keyed by review id
///
/// Reviews sharing an id (for example several with an empty id) collapse to the
/// last one scored.
pub fn batch_analyze(reviews: &[Review]) -> HashMap<String, SentimentScore> {
    reviews
        .iter()
        .map(|review| (review.id.clone(), analyze_sentiment(review)))
        .collect()
}

/// Mean score over the reviews, or `None` when there are none
pub fn average_sentiment(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }

    let total: i64 = reviews
        .iter()
        .map(|review| i64::from(analyze_sentiment(review).score))
        .sum();

    Some(total as f64 / reviews.len() as f64)
}
