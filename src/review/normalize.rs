//! Provider payload normalization
//!
//! Scraper output is untrusted and its shape differs per provider. Normalization
//! never fails: anything missing or mistyped falls back to a safe default, and a
//! payload that is not an array yields no reviews.

use crate::review::{Review, Source};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Author used when a record carries no display name
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Normalizes a raw payload for the given source
pub fn normalize_payload(source: Source, payload: &Value, fetched_at: DateTime<Utc>) -> Vec<Review> {
    match source {
        Source::Google => normalize_google(payload, fetched_at),
        Source::Facebook => normalize_facebook(payload, fetched_at),
    }
}

/// Normalizes Google Maps scraper records
///
/// Fields: `reviewId`, `reviewerName` (or `name`), `rating`, `text`,
/// `publishedAtDate`, `reviewerPhotoUrl`.
pub fn normalize_google(payload: &Value, fetched_at: DateTime<Utc>) -> Vec<Review> {
    let Some(records) = records(payload, Source::Google) else {
        return Vec::new();
    };

    records
        .iter()
        .map(|record| Review {
            id: id_field(record.get("reviewId")),
            source: Source::Google,
            rating: numeric_rating(record.get("rating")),
            content: text_field(record.get("text")).unwrap_or_default(),
            author: text_field(record.get("reviewerName"))
                .or_else(|| text_field(record.get("name")))
                .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
            date: text_field(record.get("publishedAtDate"))
                .unwrap_or_else(|| fetch_timestamp(fetched_at)),
            avatar: text_field(record.get("reviewerPhotoUrl")),
        })
        .collect()
}

/// Normalizes Facebook page scraper records
///
/// Facebook has no star rating; a recommendation maps to 5 and anything else to 1.
pub fn normalize_facebook(payload: &Value, fetched_at: DateTime<Utc>) -> Vec<Review> {
    let Some(records) = records(payload, Source::Facebook) else {
        return Vec::new();
    };

    records
        .iter()
        .map(|record| {
            let user = record.get("user");
            let recommended = record
                .get("isRecommended")
                .and_then(Value::as_bool)
                .unwrap_or(false);

            Review {
                id: id_field(record.get("id")),
                source: Source::Facebook,
                rating: if recommended { 5 } else { 1 },
                content: text_field(record.get("text")).unwrap_or_default(),
                author: text_field(user.and_then(|u| u.get("name")))
                    .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
                date: text_field(record.get("date"))
                    .unwrap_or_else(|| fetch_timestamp(fetched_at)),
                avatar: text_field(user.and_then(|u| u.get("profilePic"))),
            }
        })
        .collect()
}

fn records(payload: &Value, source: Source) -> Option<&Vec<Value>> {
    let records = payload.as_array();
    if records.is_none() {
        tracing::warn!("{} payload is not an array, treating as no reviews", source);
    }
    records
}

/// Non-empty string value, if any
fn text_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn id_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Ratings arrive as numbers or numeric strings; anything else becomes 0
fn numeric_rating(value: Option<&Value>) -> i32 {
    let rating = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    rating
        .filter(|r| r.is_finite())
        .map(|r| r.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
        .unwrap_or(0)
}

fn fetch_timestamp(fetched_at: DateTime<Utc>) -> String {
    fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
