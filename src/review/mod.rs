//! Canonical review model
//!
//! This module defines the source-agnostic `Review` shape and the helpers that
//! operate on lists of them:
//! - Normalizing raw provider payloads into reviews
//! - Merging per-source lists into one date-ordered feed
//! - Selecting reviews newer than a last-checked instant

mod merge;
mod normalize;

pub use merge::{merge_reviews, parse_review_date, reviews_since, sort_newest_first};
pub use normalize::{normalize_facebook, normalize_google, normalize_payload, ANONYMOUS_AUTHOR};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the external review providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Google,
    Facebook,
}

impl Source {
    /// Lower-case name used in cache keys and serialized reviews
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Environment variable holding this source's bearer token
    pub fn token_env(&self) -> &'static str {
        match self {
            Self::Google => "APIFY_API_TOKEN_GOOGLE",
            Self::Facebook => "APIFY_API_TOKEN_FACEBOOK",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review in canonical form
///
/// Reviews leave the fetcher only after passing moderation, whether they
/// were fetched live or read back from the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Identifier within its source; may be empty
    pub id: String,

    pub source: Source,

    /// Star rating; Facebook recommendations map to 5 or 1
    pub rating: i32,

    pub content: String,

    pub author: String,

    /// ISO-8601 timestamp as reported by the provider
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_names() {
        assert_eq!(Source::Google.to_string(), "google");
        assert_eq!(Source::Facebook.as_str(), "facebook");
    }

    #[test]
    fn test_review_json_shape() {
        let review = Review {
            id: "g1".to_string(),
            source: Source::Google,
            rating: 5,
            content: "Great place".to_string(),
            author: "Jane".to_string(),
            date: "2024-01-02T00:00:00Z".to_string(),
            avatar: None,
        };

        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["source"], "google");
        assert_eq!(json["rating"], 5);
        assert!(json.get("avatar").is_none());

        let back: Review = serde_json::from_value(json).unwrap();
        assert_eq!(back, review);
    }
}
