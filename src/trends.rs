use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::platforms::YouTubeClient;
use crate::scoring::{parse_published_at, ViralityScorer};
use crate::session::Pageable;
use crate::{excerpt, CanonicalMetrics};

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub id: String,
    pub title: String,
    pub subscribers: u64,
    pub video_count: u64,
    pub total_views: u64,
}

/// One entry of a region's trending chart, scored and joined with its
/// channel's summary.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub link: String,
    pub metrics: CanonicalMetrics,
    pub virality_score: f64,
    pub channel: ChannelSummary,
}

impl Pageable for TrendingVideo {
    fn virality_score(&self) -> f64 {
        self.virality_score
    }
}

pub struct TrendsAnalyzer {
    scorer: ViralityScorer,
}

impl TrendsAnalyzer {
    pub fn new(scorer: ViralityScorer) -> Self {
        Self { scorer }
    }

    /// Fetches the region's most-popular videos, scores each and returns
    /// them sorted descending by virality. Videos whose channel lookup
    /// yields nothing are dropped; that is a per-item condition, not a
    /// batch failure.
    pub async fn run(
        &self,
        client: &YouTubeClient,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<TrendingVideo>, AnalysisError> {
        let trending = client
            .fetch_trending(region, max_results)
            .await
            .map_err(AnalysisError::UpstreamUnavailable)?;

        if trending.is_empty() {
            info!(region, "trending chart returned no videos");
            return Err(AnalysisError::NoCandidates);
        }

        let now = Utc::now();
        let mut videos = Vec::with_capacity(trending.len());
        for item in trending {
            let channel = match client.fetch_channel_stats(&item.channel_id).await {
                Ok(Some(stats)) => ChannelSummary {
                    id: item.channel_id.clone(),
                    title: stats.title,
                    subscribers: stats.subscribers,
                    video_count: stats.content_count,
                    total_views: stats.total_views,
                },
                Ok(None) => {
                    debug!(video = %item.id, channel = %item.channel_id, "channel not found, dropping video");
                    continue;
                }
                Err(err) => {
                    debug!(video = %item.id, error = %err, "channel lookup failed, dropping video");
                    continue;
                }
            };

            let metrics = item.engagement.normalize();
            let published_at = parse_published_at(item.published_at.as_deref(), now);
            let virality_score = self.scorer.score(&metrics, published_at, now);

            videos.push(TrendingVideo {
                link: format!("https://www.youtube.com/watch?v={}", item.id),
                id: item.id,
                title: item.title,
                description: excerpt(&item.description, 200),
                published_at,
                metrics,
                virality_score,
                channel,
            });
        }

        if videos.is_empty() {
            info!(region, "no trending video survived channel enrichment");
            return Err(AnalysisError::NoCandidates);
        }

        videos.sort_by(|a, b| {
            b.virality_score
                .partial_cmp(&a.virality_score)
                .unwrap_or(Ordering::Equal)
        });

        info!(region, count = videos.len(), "trends analysis complete");
        Ok(videos)
    }
}
