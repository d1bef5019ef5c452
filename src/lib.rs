pub mod config;
pub mod error;
pub mod pipeline;
pub mod platforms;
pub mod scoring;
pub mod session;
pub mod trends;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Pageable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    YouTube,
    X,
    Vk,
}

impl Platform {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "youtube" | "yt" => Some(Platform::YouTube),
            "x" | "twitter" => Some(Platform::X),
            "vk" | "vkontakte" => Some(Platform::Vk),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::X => "x",
            Platform::Vk => "vk",
        }
    }
}

/// Canonical engagement shape shared by every platform. `views` is the
/// denominator for all ratios and may legitimately be zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retweets: Option<u64>,
}

/// Raw per-platform engagement payload as it comes off the wire. Absent or
/// unparseable fields normalize to zero, never to an error.
#[derive(Debug, Clone)]
pub enum RawEngagement {
    /// YouTube reports statistics as decimal strings.
    YouTube {
        view_count: Option<String>,
        like_count: Option<String>,
        comment_count: Option<String>,
    },
    X {
        impression_count: Option<u64>,
        like_count: Option<u64>,
        reply_count: Option<u64>,
        retweet_count: Option<u64>,
    },
    Vk {
        views: Option<u64>,
        likes: Option<u64>,
        comments: Option<u64>,
    },
}

impl RawEngagement {
    pub fn normalize(&self) -> CanonicalMetrics {
        match self {
            RawEngagement::YouTube {
                view_count,
                like_count,
                comment_count,
            } => CanonicalMetrics {
                views: parse_count(view_count.as_deref()),
                likes: parse_count(like_count.as_deref()),
                comments: parse_count(comment_count.as_deref()),
                retweets: None,
            },
            RawEngagement::X {
                impression_count,
                like_count,
                reply_count,
                retweet_count,
            } => CanonicalMetrics {
                views: impression_count.unwrap_or(0),
                likes: like_count.unwrap_or(0),
                comments: reply_count.unwrap_or(0),
                retweets: Some(retweet_count.unwrap_or(0)),
            },
            RawEngagement::Vk {
                views,
                likes,
                comments,
            } => CanonicalMetrics {
                views: views.unwrap_or(0),
                likes: likes.unwrap_or(0),
                comments: comments.unwrap_or(0),
                retweets: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub link: String,
    pub tags: Vec<String>,
    pub metrics: CanonicalMetrics,
    pub virality_score: f64,
}

/// A channel, group or profile after normalization, with its analyzed posts.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: String,
    pub title: String,
    pub subscribers: u64,
    pub content_count: u64,
    pub posts: Vec<ContentItem>,
    pub avg_views: f64,
    pub virality_score: f64,
}

impl Pageable for Account {
    fn virality_score(&self) -> f64 {
        self.virality_score
    }

    fn sub_item_count(&self) -> usize {
        self.posts.len()
    }
}

impl Pageable for ContentItem {
    fn virality_score(&self) -> f64 {
        self.virality_score
    }
}

/// Opaque handle returned by candidate search; enough to address follow-up
/// stats and content calls on the same platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub id: String,
    pub title: Option<String>,
    /// Platform handle (e.g. an X username) when discovery already knows it;
    /// used for building permalinks without an extra lookup.
    pub handle: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccountStats {
    pub title: String,
    pub description: String,
    pub subscribers: u64,
    pub content_count: u64,
    pub total_views: u64,
    pub username: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawContentItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<String>,
    pub link: String,
    pub tags: Vec<String>,
    pub engagement: RawEngagement,
}

#[derive(Debug, Clone)]
pub struct AnalysisParams {
    pub query: String,
    pub region: String,
    pub max_posts: u32,
    pub min_subscribers: u64,
    pub min_content_count: u64,
}

pub(crate) fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// First `max` characters of a post body, used as its display title.
pub fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}...", head)
}

pub fn extract_hashtags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| word.starts_with('#') && word.len() > 1)
        .map(|word| word.trim_start_matches('#').to_string())
        .collect()
}

pub fn format_number(value: u64) -> String {
    let mut chars: Vec<char> = value.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(' ');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
