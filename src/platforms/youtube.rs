use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;

use crate::error::PlatformError;
use crate::platforms::PlatformClient;
use crate::{parse_count, AccountRef, AccountStats, Platform, RawContentItem, RawEngagement};

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3 client. Channel discovery goes through search,
/// recent videos through the channel's uploads playlist.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn from_env() -> Result<Self, PlatformError> {
        let api_key = env::var("YOUTUBE_API_KEY")
            .map_err(|_| PlatformError::MissingCredentials("YOUTUBE_API_KEY"))?;
        let api_base = env::var("YOUTUBE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Ok(Self::new(api_base, api_key))
    }

    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }

    /// Region's most-popular chart, with per-video statistics.
    pub async fn fetch_trending(
        &self,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<TrendingItem>, PlatformError> {
        let max = max_results.to_string();
        let body: VideoListResponse = self
            .get_json(
                "videos",
                &[
                    ("part", "snippet,statistics"),
                    ("chart", "mostPopular"),
                    ("regionCode", region),
                    ("maxResults", &max),
                ],
            )
            .await?;

        Ok(body
            .items
            .into_iter()
            .map(|video| TrendingItem {
                id: video.id.clone(),
                title: video.snippet.title,
                description: video.snippet.description,
                published_at: video.snippet.published_at,
                channel_id: video.snippet.channel_id.unwrap_or_default(),
                engagement: engagement_from(video.statistics),
            })
            .collect())
    }

    pub async fn fetch_channel_stats(
        &self,
        channel_id: &str,
    ) -> Result<Option<AccountStats>, PlatformError> {
        let body: ChannelListResponse = self
            .get_json(
                "channels",
                &[("part", "snippet,statistics"), ("id", channel_id)],
            )
            .await?;

        let Some(channel) = body.items.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(AccountStats {
            title: channel.snippet.title,
            description: channel.snippet.description,
            subscribers: parse_count(channel.statistics.subscriber_count.as_deref()),
            content_count: parse_count(channel.statistics.video_count.as_deref()),
            total_views: parse_count(channel.statistics.view_count.as_deref()),
            username: None,
        }))
    }

    async fn uploads_playlist(&self, channel_id: &str) -> Result<Option<String>, PlatformError> {
        let body: ChannelContentResponse = self
            .get_json("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await?;

        Ok(body
            .items
            .into_iter()
            .next()
            .map(|channel| channel.content_details.related_playlists.uploads))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let response = self
            .http
            .get(format!("{}/{}", self.api_base.trim_end_matches('/'), path))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                detail: detail.trim().to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PlatformClient for YouTubeClient {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn search_candidates(
        &self,
        query: &str,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<AccountRef>, PlatformError> {
        let max = max_results.to_string();
        let body: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("q", query),
                    ("regionCode", region),
                    ("maxResults", &max),
                ],
            )
            .await?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                item.id.channel_id.map(|id| AccountRef {
                    id,
                    title: Some(item.snippet.title),
                    handle: None,
                })
            })
            .collect())
    }

    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<Option<AccountStats>, PlatformError> {
        self.fetch_channel_stats(&account.id).await
    }

    async fn fetch_recent_content(
        &self,
        account: &AccountRef,
        max_items: u32,
    ) -> Result<Vec<RawContentItem>, PlatformError> {
        let Some(playlist_id) = self.uploads_playlist(&account.id).await? else {
            return Ok(Vec::new());
        };

        let max = max_items.to_string();
        let playlist: PlaylistItemsResponse = self
            .get_json(
                "playlistItems",
                &[
                    ("part", "snippet"),
                    ("playlistId", &playlist_id),
                    ("maxResults", &max),
                ],
            )
            .await?;

        let video_ids: Vec<String> = playlist
            .items
            .into_iter()
            .filter_map(|item| item.snippet.resource_id.map(|resource| resource.video_id))
            .collect();

        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = video_ids.join(",");
        let details: VideoListResponse = self
            .get_json("videos", &[("part", "snippet,statistics"), ("id", &ids)])
            .await?;

        Ok(details
            .items
            .into_iter()
            .map(|video| RawContentItem {
                link: format!("https://www.youtube.com/watch?v={}", video.id),
                id: video.id,
                title: video.snippet.title,
                description: video.snippet.description,
                published_at: video.snippet.published_at,
                tags: video.snippet.tags.unwrap_or_default(),
                engagement: engagement_from(video.statistics),
            })
            .collect())
    }
}

/// Trending chart entry before channel enrichment.
#[derive(Debug, Clone)]
pub struct TrendingItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<String>,
    pub channel_id: String,
    pub engagement: RawEngagement,
}

fn engagement_from(statistics: Option<VideoStatistics>) -> RawEngagement {
    let statistics = statistics.unwrap_or_default();
    RawEngagement::YouTube {
        view_count: statistics.view_count,
        like_count: statistics.like_count,
        comment_count: statistics.comment_count,
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "channelId")]
    channel_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(rename = "channelId")]
    channel_id: Option<String>,
    tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    snippet: Snippet,
    statistics: ChannelStatistics,
}

#[derive(Deserialize)]
struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    subscriber_count: Option<String>,
    #[serde(rename = "videoCount")]
    video_count: Option<String>,
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
}

#[derive(Deserialize)]
struct ChannelContentResponse {
    #[serde(default)]
    items: Vec<ChannelContentItem>,
}

#[derive(Deserialize)]
struct ChannelContentItem {
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

#[derive(Deserialize)]
struct ContentDetails {
    #[serde(rename = "relatedPlaylists")]
    related_playlists: RelatedPlaylists,
}

#[derive(Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Deserialize)]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Deserialize)]
struct PlaylistItem {
    snippet: PlaylistItemSnippet,
}

#[derive(Deserialize)]
struct PlaylistItemSnippet {
    #[serde(rename = "resourceId")]
    resource_id: Option<ResourceId>,
}

#[derive(Deserialize)]
struct ResourceId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    statistics: Option<VideoStatistics>,
}

#[derive(Deserialize, Default)]
struct VideoStatistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}
