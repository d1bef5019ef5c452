use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::platforms::PlatformClient;
use crate::scoring::{parse_published_at, ViralityScorer};
use crate::{Account, AccountRef, AccountStats, AnalysisParams, ContentItem, RawContentItem};

/// Competitor analysis pipeline: search candidates, filter by thresholds,
/// pull and score recent content. Per-item failures are absorbed at the
/// smallest scope; only whole-pipeline outcomes propagate.
pub struct Analyzer {
    scorer: ViralityScorer,
    candidate_pool: u32,
}

impl Analyzer {
    pub fn new(scorer: ViralityScorer, candidate_pool: u32) -> Self {
        Self {
            scorer,
            candidate_pool,
        }
    }

    pub async fn run(
        &self,
        client: &dyn PlatformClient,
        params: &AnalysisParams,
    ) -> Result<Vec<Account>, AnalysisError> {
        let platform = client.platform().label();

        let candidates = match client
            .search_candidates(&params.query, &params.region, self.candidate_pool)
            .await
        {
            Ok(candidates) => candidates,
            Err(err) => {
                // Search failures degrade to an empty candidate set; only
                // init/auth failures surface as UpstreamUnavailable.
                warn!(platform, error = %err, "candidate search failed");
                Vec::new()
            }
        };

        if candidates.is_empty() {
            info!(platform, query = %params.query, "platform query found no candidates");
            return Err(AnalysisError::NoCandidates);
        }

        let mut with_stats = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match client.fetch_account_stats(&candidate).await {
                Ok(Some(stats)) => with_stats.push((candidate, stats)),
                Ok(None) => {
                    debug!(platform, account = %candidate.id, "no stats for account, skipping")
                }
                Err(err) => {
                    warn!(platform, account = %candidate.id, error = %err, "stats fetch failed, skipping")
                }
            }
        }

        let competitors = filter_candidates(
            with_stats,
            params.min_subscribers,
            params.min_content_count,
        );
        if competitors.is_empty() {
            info!(
                platform,
                query = %params.query,
                min_subscribers = params.min_subscribers,
                min_content_count = params.min_content_count,
                "candidates found but none matched the filters"
            );
            return Err(AnalysisError::NoneMatchedFilters);
        }

        let now = Utc::now();
        let mut accounts = Vec::with_capacity(competitors.len());
        for (candidate, stats) in competitors {
            let raw_items = match client
                .fetch_recent_content(&candidate, params.max_posts)
                .await
            {
                Ok(items) => items,
                Err(err) => {
                    warn!(platform, account = %candidate.id, error = %err, "content fetch failed");
                    Vec::new()
                }
            };
            // An account that matched the filters stays in the result even
            // with zero analyzable posts.
            accounts.push(self.build_account(&candidate, &stats, raw_items, now));
        }

        info!(platform, competitors = accounts.len(), "analysis complete");
        Ok(accounts)
    }

    /// Normalizes and scores one account's fetched content. Posts keep the
    /// source order; ranking is the session's job.
    pub fn build_account(
        &self,
        candidate: &AccountRef,
        stats: &AccountStats,
        raw_items: Vec<RawContentItem>,
        now: DateTime<Utc>,
    ) -> Account {
        let posts: Vec<ContentItem> = raw_items
            .into_iter()
            .map(|raw| self.build_item(raw, now))
            .collect();
        let avg_views = avg_views(&posts);
        let virality_score = mean_score(&posts);

        Account {
            id: candidate.id.clone(),
            title: stats.title.clone(),
            subscribers: stats.subscribers,
            content_count: stats.content_count,
            posts,
            avg_views,
            virality_score,
        }
    }

    pub fn build_item(&self, raw: RawContentItem, now: DateTime<Utc>) -> ContentItem {
        let metrics = raw.engagement.normalize();
        let published_at = parse_published_at(raw.published_at.as_deref(), now);
        let virality_score = self.scorer.score(&metrics, published_at, now);

        ContentItem {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            published_at,
            link: raw.link,
            tags: raw.tags,
            metrics,
            virality_score,
        }
    }
}

/// Threshold filter: both conditions must hold. Input order is preserved;
/// no sorting happens here.
pub fn filter_candidates(
    candidates: Vec<(AccountRef, AccountStats)>,
    min_subscribers: u64,
    min_content_count: u64,
) -> Vec<(AccountRef, AccountStats)> {
    candidates
        .into_iter()
        .filter(|(_, stats)| {
            stats.subscribers >= min_subscribers && stats.content_count >= min_content_count
        })
        .collect()
}

pub fn avg_views(posts: &[ContentItem]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let total: u64 = posts.iter().map(|post| post.metrics.views).sum();
    total as f64 / posts.len() as f64
}

fn mean_score(posts: &[ContentItem]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    posts.iter().map(|post| post.virality_score).sum::<f64>() / posts.len() as f64
}
