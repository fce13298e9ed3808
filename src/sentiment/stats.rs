use crate::review::Review;
use crate::sentiment::analyze_sentiment;
use serde::Serialize;

/// Aggregate sentiment over a set of reviews
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentStats {
    /// Mean score, absent for an empty set
    pub average_score: Option<f64>,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
}

impl SentimentStats {
    /// Scores each review once and tallies the results
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut stats = Self::default();
        let mut total: i64 = 0;

        for review in reviews {
            let score = analyze_sentiment(review).score;
            total += i64::from(score);

            match score {
                s if s > 0 => stats.positive_count += 1,
                s if s < 0 => stats.negative_count += 1,
                _ => stats.neutral_count += 1,
            }
        }

        if !reviews.is_empty() {
            stats.average_score = Some(total as f64 / reviews.len() as f64);
        }

        stats
    }

    /// Total number of reviews counted
    pub fn total(&self) -> usize {
        self.positive_count + self.negative_count + self.neutral_count
    }
}
