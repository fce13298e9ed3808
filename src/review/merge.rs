//! Merging and date ordering of review feeds

use crate::review::Review;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Reverse;

/// Parses a provider date string into a UTC instant
///
/// Accepts RFC 3339 timestamps, zone-less date-times (read as UTC) and bare
/// dates (midnight UTC). Returns `None` for anything else.
pub fn parse_review_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sorts reviews newest first
///
/// The sort is stable: reviews with identical dates keep their relative order.
/// Reviews whose date cannot be parsed sink to the end.
pub fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by_cached_key(|review| Reverse(parse_review_date(&review.date)));
}

/// Concatenates per-source lists in order, then sorts newest first
pub fn merge_reviews<I>(lists: I) -> Vec<Review>
where
    I: IntoIterator<Item = Vec<Review>>,
{
    let mut merged: Vec<Review> = lists.into_iter().flatten().collect();
    sort_newest_first(&mut merged);
    merged
}

/// Returns the reviews dated strictly after `since`
///
/// This is the diff a polling consumer applies against its last-checked time.
/// Reviews with unparseable dates are never considered new.
pub fn reviews_since(reviews: &[Review], since: DateTime<Utc>) -> Vec<Review> {
    reviews
        .iter()
        .filter(|review| parse_review_date(&review.date).is_some_and(|date| date > since))
        .cloned()
        .collect()
}
