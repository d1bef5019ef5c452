use chrono::{Duration, TimeZone, Utc};
use viralscope::scoring::{parse_published_at, ScoringWeights, ViralityScorer};
use viralscope::{CanonicalMetrics, RawEngagement};

fn metrics(views: u64, likes: u64, comments: u64) -> CanonicalMetrics {
    CanonicalMetrics {
        views,
        likes,
        comments,
        retweets: None,
    }
}

#[test]
fn zero_views_scores_zero() {
    let scorer = ViralityScorer::default();
    let now = Utc::now();
    let score = scorer.score(&metrics(0, 500, 500), now, now);
    assert_eq!(score, 0.0);
}

#[test]
fn fresh_post_matches_formula() {
    let scorer = ViralityScorer::default();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    // 50/1000 * 1000 + 10/1000 * 5000 + 1.0 * 0.1
    let score = scorer.score(&metrics(1000, 50, 10), now, now);
    assert!((score - 100.1).abs() < 1e-6);
}

#[test]
fn more_engagement_scores_higher() {
    let scorer = ViralityScorer::default();
    let now = Utc::now();
    let base = scorer.score(&metrics(1000, 10, 5), now, now);
    let more_likes = scorer.score(&metrics(1000, 20, 5), now, now);
    let more_comments = scorer.score(&metrics(1000, 10, 6), now, now);
    assert!(more_likes > base);
    assert!(more_comments > base);
}

#[test]
fn freshness_decays_and_floors_at_zero() {
    let scorer = ViralityScorer::default();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let m = metrics(1000, 50, 10);

    let day0 = scorer.score(&m, now, now);
    let day15 = scorer.score(&m, now - Duration::days(15), now);
    let day30 = scorer.score(&m, now - Duration::days(30), now);
    let day60 = scorer.score(&m, now - Duration::days(60), now);

    assert!(day0 > day15);
    assert!(day15 > day30);
    // Past the window the bonus is exactly zero, not negative.
    assert!((day30 - day60).abs() < 1e-9);
    assert!((day0 - day30 - 0.1).abs() < 1e-9);
}

#[test]
fn future_timestamp_counts_as_fresh() {
    let scorer = ViralityScorer::default();
    let now = Utc::now();
    let future = scorer.score(&metrics(1000, 50, 10), now + Duration::days(3), now);
    let today = scorer.score(&metrics(1000, 50, 10), now, now);
    assert!((future - today).abs() < 1e-9);
}

#[test]
fn custom_weights_apply() {
    let scorer = ViralityScorer::new(ScoringWeights {
        like_ratio: 100.0,
        comment_ratio: 0.0,
        freshness: 0.0,
        freshness_window_days: 30.0,
    });
    let now = Utc::now();
    let score = scorer.score(&metrics(200, 50, 999), now, now);
    assert!((score - 25.0).abs() < 1e-9);
}

#[test]
fn parse_published_at_accepts_rfc3339() {
    let now = Utc::now();
    let parsed = parse_published_at(Some("2024-05-01T10:30:00Z"), now);
    assert_eq!(
        parsed,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
    );

    let offset = parse_published_at(Some("2024-05-01T12:30:00+02:00"), now);
    assert_eq!(
        offset,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
    );
}

#[test]
fn parse_published_at_accepts_naive_timestamps() {
    let now = Utc::now();
    let parsed = parse_published_at(Some("2024-05-01T10:30:00"), now);
    assert_eq!(
        parsed,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
    );
}

#[test]
fn parse_published_at_falls_back_to_now() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_published_at(Some("not a date"), now), now);
    assert_eq!(parse_published_at(Some(""), now), now);
    assert_eq!(parse_published_at(None, now), now);
}

#[test]
fn youtube_normalization_parses_decimal_strings() {
    let raw = RawEngagement::YouTube {
        view_count: Some("1234".to_string()),
        like_count: Some("56".to_string()),
        comment_count: None,
    };
    let m = raw.normalize();
    assert_eq!(m.views, 1234);
    assert_eq!(m.likes, 56);
    assert_eq!(m.comments, 0);
    assert_eq!(m.retweets, None);
}

#[test]
fn unparseable_counts_default_to_zero() {
    let raw = RawEngagement::YouTube {
        view_count: Some("a lot".to_string()),
        like_count: Some("".to_string()),
        comment_count: Some("-3".to_string()),
    };
    let m = raw.normalize();
    assert_eq!(m, CanonicalMetrics::default());
}

#[test]
fn x_normalization_keeps_retweets() {
    let raw = RawEngagement::X {
        impression_count: Some(5000),
        like_count: None,
        reply_count: Some(12),
        retweet_count: Some(7),
    };
    let m = raw.normalize();
    assert_eq!(m.views, 5000);
    assert_eq!(m.likes, 0);
    assert_eq!(m.comments, 12);
    assert_eq!(m.retweets, Some(7));
}

#[test]
fn vk_normalization_defaults_absent_fields() {
    let raw = RawEngagement::Vk {
        views: None,
        likes: Some(40),
        comments: None,
    };
    let m = raw.normalize();
    assert_eq!(m.views, 0);
    assert_eq!(m.likes, 40);
    assert_eq!(m.comments, 0);
    assert_eq!(m.retweets, None);
}
