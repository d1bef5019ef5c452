use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use viralscope::error::{AnalysisError, PlatformError};
use viralscope::pipeline::{avg_views, filter_candidates, Analyzer};
use viralscope::platforms::PlatformClient;
use viralscope::scoring::ViralityScorer;
use viralscope::session::SessionStore;
use viralscope::{
    AccountRef, AccountStats, AnalysisParams, Platform, RawContentItem, RawEngagement,
};

#[derive(Default)]
struct MockPlatform {
    candidates: Vec<AccountRef>,
    stats: HashMap<String, AccountStats>,
    stats_errors: HashSet<String>,
    content: HashMap<String, Vec<RawContentItem>>,
    fail_search: bool,
}

#[async_trait]
impl PlatformClient for MockPlatform {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn search_candidates(
        &self,
        _query: &str,
        _region: &str,
        _max_results: u32,
    ) -> Result<Vec<AccountRef>, PlatformError> {
        if self.fail_search {
            return Err(PlatformError::Api {
                status: 500,
                detail: "search backend down".to_string(),
            });
        }
        Ok(self.candidates.clone())
    }

    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<Option<AccountStats>, PlatformError> {
        if self.stats_errors.contains(&account.id) {
            return Err(PlatformError::Api {
                status: 503,
                detail: "stats unavailable".to_string(),
            });
        }
        Ok(self.stats.get(&account.id).cloned())
    }

    async fn fetch_recent_content(
        &self,
        account: &AccountRef,
        _max_items: u32,
    ) -> Result<Vec<RawContentItem>, PlatformError> {
        Ok(self.content.get(&account.id).cloned().unwrap_or_default())
    }
}

fn candidate(id: &str) -> AccountRef {
    AccountRef {
        id: id.to_string(),
        title: Some(id.to_string()),
        handle: None,
    }
}

fn stats(id: &str, subscribers: u64, content_count: u64) -> AccountStats {
    AccountStats {
        title: id.to_string(),
        description: String::new(),
        subscribers,
        content_count,
        total_views: 0,
        username: None,
    }
}

fn post(id: &str, views: &str, likes: &str, comments: &str) -> RawContentItem {
    RawContentItem {
        id: id.to_string(),
        title: id.to_string(),
        description: String::new(),
        published_at: Some("2024-05-01T00:00:00Z".to_string()),
        link: format!("https://example.com/{}", id),
        tags: Vec::new(),
        engagement: RawEngagement::YouTube {
            view_count: Some(views.to_string()),
            like_count: Some(likes.to_string()),
            comment_count: Some(comments.to_string()),
        },
    }
}

fn params(min_subscribers: u64, min_content_count: u64) -> AnalysisParams {
    AnalysisParams {
        query: "python".to_string(),
        region: "US".to_string(),
        max_posts: 5,
        min_subscribers,
        min_content_count,
    }
}

fn analyzer() -> Analyzer {
    Analyzer::new(ViralityScorer::default(), 25)
}

#[tokio::test]
async fn run_filters_and_scores_accounts() {
    let mut platform = MockPlatform::default();
    platform.candidates = vec![candidate("big"), candidate("small"), candidate("mid")];
    platform.stats.insert("big".to_string(), stats("big", 100_000, 500));
    platform.stats.insert("small".to_string(), stats("small", 10, 3));
    platform.stats.insert("mid".to_string(), stats("mid", 5_000, 50));
    platform.content.insert(
        "big".to_string(),
        vec![post("b1", "1000", "50", "10"), post("b2", "2000", "20", "4")],
    );
    platform
        .content
        .insert("mid".to_string(), vec![post("m1", "500", "5", "1")]);

    let accounts = analyzer()
        .run(&platform, &params(1_000, 10))
        .await
        .unwrap();

    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].id, "big");
    assert_eq!(accounts[1].id, "mid");
    assert_eq!(accounts[0].posts.len(), 2);
    assert!(accounts[0].posts.iter().all(|p| p.virality_score > 0.0));
    assert!((accounts[0].avg_views - 1500.0).abs() < 1e-9);
}

#[tokio::test]
async fn account_with_no_posts_is_retained() {
    let mut platform = MockPlatform::default();
    platform.candidates = vec![candidate("quiet")];
    platform
        .stats
        .insert("quiet".to_string(), stats("quiet", 50_000, 200));
    // No content registered for "quiet".

    let accounts = analyzer().run(&platform, &params(0, 0)).await.unwrap();

    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].posts.is_empty());
    assert_eq!(accounts[0].avg_views, 0.0);
    assert_eq!(accounts[0].virality_score, 0.0);
}

#[tokio::test]
async fn stats_failure_skips_only_that_candidate() {
    let mut platform = MockPlatform::default();
    platform.candidates = vec![candidate("ok"), candidate("broken")];
    platform.stats.insert("ok".to_string(), stats("ok", 1_000, 10));
    platform.stats_errors.insert("broken".to_string());

    let accounts = analyzer().run(&platform, &params(0, 0)).await.unwrap();

    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, "ok");
}

#[tokio::test]
async fn absent_stats_skip_the_candidate() {
    let mut platform = MockPlatform::default();
    platform.candidates = vec![candidate("ghost"), candidate("real")];
    platform.stats.insert("real".to_string(), stats("real", 1_000, 10));

    let accounts = analyzer().run(&platform, &params(0, 0)).await.unwrap();

    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, "real");
}

#[tokio::test]
async fn empty_search_is_no_candidates() {
    let platform = MockPlatform::default();
    let err = analyzer().run(&platform, &params(0, 0)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoCandidates));
}

#[tokio::test]
async fn search_failure_degrades_to_no_candidates() {
    let mut platform = MockPlatform::default();
    platform.fail_search = true;

    let err = analyzer().run(&platform, &params(0, 0)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoCandidates));
}

#[tokio::test]
async fn thresholds_rejecting_everything_is_its_own_error() {
    let mut platform = MockPlatform::default();
    platform.candidates = vec![candidate("small")];
    platform.stats.insert("small".to_string(), stats("small", 10, 3));

    let err = analyzer()
        .run(&platform, &params(1_000_000, 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NoneMatchedFilters));
}

#[tokio::test]
async fn ranked_session_walks_scores_in_non_increasing_order() {
    let mut platform = MockPlatform::default();
    platform.candidates = vec![candidate("a"), candidate("b"), candidate("c")];
    for id in ["a", "b", "c"] {
        platform.stats.insert(id.to_string(), stats(id, 1_000, 10));
    }
    platform
        .content
        .insert("a".to_string(), vec![post("a1", "1000", "10", "1")]);
    platform
        .content
        .insert("b".to_string(), vec![post("b1", "1000", "100", "20")]);
    platform
        .content
        .insert("c".to_string(), vec![post("c1", "1000", "50", "5")]);

    let accounts = analyzer().run(&platform, &params(0, 0)).await.unwrap();

    let store = SessionStore::new(8);
    let first = store.start(7, accounts).unwrap();
    let mut last_score = first.item.virality_score;
    while let viralscope::session::Nav::Page(page) = store.next(7) {
        assert!(page.item.virality_score <= last_score);
        last_score = page.item.virality_score;
    }
}

#[test]
fn filter_requires_both_thresholds_and_preserves_order() {
    let input = vec![
        (candidate("a"), stats("a", 5_000, 100)),
        (candidate("b"), stats("b", 5_000, 5)),
        (candidate("c"), stats("c", 500, 100)),
        (candidate("d"), stats("d", 9_000, 90)),
    ];

    let kept = filter_candidates(input, 1_000, 50);
    let ids: Vec<&str> = kept.iter().map(|(c, _)| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "d"]);
}

#[test]
fn zero_thresholds_keep_everything() {
    let input = vec![
        (candidate("a"), stats("a", 0, 0)),
        (candidate("b"), stats("b", 1, 1)),
    ];
    assert_eq!(filter_candidates(input, 0, 0).len(), 2);
}

#[test]
fn avg_views_over_posts() {
    let analyzer = analyzer();
    let now = chrono::Utc::now();
    let posts: Vec<_> = [
        post("p1", "100", "0", "0"),
        post("p2", "300", "0", "0"),
        post("p3", "200", "0", "0"),
    ]
    .into_iter()
    .map(|raw| analyzer.build_item(raw, now))
    .collect();

    assert!((avg_views(&posts) - 200.0).abs() < 1e-9);
    assert_eq!(avg_views(&[]), 0.0);
}
