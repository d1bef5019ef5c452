use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CanonicalMetrics;

/// Weights for the virality formula. Comments are weighted 5x likes per
/// engagement; freshness is a minor tiebreaker that decays to zero over
/// `freshness_window_days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub like_ratio: f64,
    pub comment_ratio: f64,
    pub freshness: f64,
    pub freshness_window_days: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            like_ratio: 1000.0,
            comment_ratio: 5000.0,
            freshness: 0.1,
            freshness_window_days: 30.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViralityScorer {
    weights: ScoringWeights,
}

impl ViralityScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Pure scoring function: per-view engagement ratios plus a recency
    /// bonus. Zero-reach content scores exactly zero.
    pub fn score(
        &self,
        metrics: &CanonicalMetrics,
        published_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        if metrics.views == 0 {
            return 0.0;
        }

        let views = metrics.views as f64;
        let like_ratio = metrics.likes as f64 / views;
        let comment_ratio = metrics.comments as f64 / views;

        let days_ago = (now - published_at).num_days().max(0) as f64;
        let freshness_bonus = (1.0 - days_ago / self.weights.freshness_window_days).max(0.0);

        like_ratio * self.weights.like_ratio
            + comment_ratio * self.weights.comment_ratio
            + freshness_bonus * self.weights.freshness
    }
}

/// Parses an upstream timestamp, accepting RFC 3339 with or without a
/// trailing `Z`. A malformed or absent value falls back to `now` so one bad
/// record never aborts a ranking pass.
pub fn parse_published_at(value: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = value else {
        return now;
    };

    let candidate = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(candidate) {
        return parsed.with_timezone(&Utc);
    }

    // Some sources emit naive ISO timestamps without an offset; read those
    // as UTC.
    if let Ok(naive) = candidate
        .trim_end_matches('Z')
        .parse::<chrono::NaiveDateTime>()
    {
        return DateTime::from_naive_utc_and_offset(naive, Utc);
    }

    tracing::debug!(timestamp = candidate, "unparseable published_at, using now");
    now
}
