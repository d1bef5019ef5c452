use async_trait::async_trait;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;

use crate::error::PlatformError;
use crate::platforms::PlatformClient;
use crate::{excerpt, extract_hashtags, AccountRef, AccountStats, Platform, RawContentItem, RawEngagement};

const DEFAULT_API_BASE: &str = "https://api.vk.com/method";
const API_VERSION: &str = "5.131";

/// VK client. Communities ("groups") stand in for channels; posts come off
/// the group wall. VK reports errors inside a 200 response envelope.
#[derive(Clone)]
pub struct VkClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl VkClient {
    pub fn from_env() -> Result<Self, PlatformError> {
        let access_token = env::var("VK_ACCESS_TOKEN")
            .map_err(|_| PlatformError::MissingCredentials("VK_ACCESS_TOKEN"))?;
        let api_base = env::var("VK_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Ok(Self::new(api_base, access_token))
    }

    pub fn new(api_base: String, access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            access_token,
        }
    }

    /// Total number of wall posts; a one-item page carries the full count.
    async fn fetch_post_count(&self, owner_id: i64) -> Result<u64, PlatformError> {
        let owner = owner_id.to_string();
        let wall: WallResponse = self
            .call("wall.get", &[("owner_id", owner.as_str()), ("count", "1")])
            .await?;
        Ok(wall.count)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let response = self
            .http
            .get(format!("{}/{}", self.api_base.trim_end_matches('/'), method))
            .query(params)
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("v", API_VERSION),
            ])
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

        let envelope: Envelope<T> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(PlatformError::Api {
                status: status.as_u16(),
                detail: format!("vk error {}: {}", error.error_code, error.error_msg),
            });
        }

        envelope.response.ok_or(PlatformError::Api {
            status: status.as_u16(),
            detail: "vk response missing payload".to_string(),
        })
    }
}

#[async_trait]
impl PlatformClient for VkClient {
    fn platform(&self) -> Platform {
        Platform::Vk
    }

    async fn search_candidates(
        &self,
        query: &str,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<AccountRef>, PlatformError> {
        let country = country_id(region).to_string();
        let count = max_results.to_string();
        let body: GroupSearchResponse = self
            .call(
                "groups.search",
                &[
                    ("q", query),
                    ("country_id", country.as_str()),
                    ("count", count.as_str()),
                ],
            )
            .await?;

        Ok(body
            .items
            .into_iter()
            .map(|group| AccountRef {
                id: group.id.to_string(),
                title: Some(group.name),
                handle: None,
            })
            .collect())
    }

    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<Option<AccountStats>, PlatformError> {
        let body: Vec<GroupInfo> = self
            .call(
                "groups.getById",
                &[
                    ("group_ids", account.id.as_str()),
                    ("fields", "members_count,description"),
                ],
            )
            .await?;

        let Some(group) = body.into_iter().next() else {
            return Ok(None);
        };

        let owner_id = match account.id.parse::<i64>() {
            Ok(id) => -id,
            Err(_) => return Ok(None),
        };
        let content_count = self.fetch_post_count(owner_id).await.unwrap_or(0);

        Ok(Some(AccountStats {
            title: group.name,
            description: group.description.unwrap_or_default(),
            subscribers: group.members_count.unwrap_or(0),
            content_count,
            total_views: 0,
            username: None,
        }))
    }

    async fn fetch_recent_content(
        &self,
        account: &AccountRef,
        max_items: u32,
    ) -> Result<Vec<RawContentItem>, PlatformError> {
        let owner_id = match account.id.parse::<i64>() {
            Ok(id) => (-id).to_string(),
            Err(_) => return Ok(Vec::new()),
        };
        let count = max_items.to_string();
        let wall: WallResponse = self
            .call(
                "wall.get",
                &[
                    ("owner_id", owner_id.as_str()),
                    ("count", count.as_str()),
                    ("extended", "1"),
                ],
            )
            .await?;

        let items = wall
            .items
            .into_iter()
            // Promoted and text-less posts are noise for engagement ratios.
            .filter(|post| !post.marked_as_ads() && !post.text.trim().is_empty())
            .map(|post| RawContentItem {
                id: post.id.to_string(),
                title: excerpt(&post.text, 100),
                tags: extract_hashtags(&post.text),
                published_at: DateTime::from_timestamp(post.date, 0).map(|ts| ts.to_rfc3339()),
                link: format!("https://vk.com/wall{}_{}", post.owner_id, post.id),
                description: post.text,
                engagement: RawEngagement::Vk {
                    views: post.views.map(|c| c.count),
                    likes: post.likes.map(|c| c.count),
                    comments: post.comments.map(|c| c.count),
                },
            })
            .collect();

        Ok(items)
    }
}

fn country_id(region: &str) -> u32 {
    match region.to_uppercase().as_str() {
        "RU" => 1,
        "US" => 2,
        _ => 1,
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<VkError>,
}

#[derive(Deserialize)]
struct VkError {
    error_code: i64,
    error_msg: String,
}

#[derive(Deserialize)]
struct GroupSearchResponse {
    #[serde(default)]
    items: Vec<GroupSearchItem>,
}

#[derive(Deserialize)]
struct GroupSearchItem {
    id: i64,
    name: String,
}

#[derive(Deserialize)]
struct GroupInfo {
    name: String,
    description: Option<String>,
    members_count: Option<u64>,
}

#[derive(Deserialize)]
struct WallResponse {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    items: Vec<WallPost>,
}

#[derive(Deserialize)]
struct WallPost {
    id: i64,
    owner_id: i64,
    date: i64,
    #[serde(default)]
    text: String,
    marked_as_ads: Option<u8>,
    views: Option<Counter>,
    likes: Option<Counter>,
    comments: Option<Counter>,
}

impl WallPost {
    fn marked_as_ads(&self) -> bool {
        self.marked_as_ads.unwrap_or(0) == 1
    }
}

#[derive(Deserialize)]
struct Counter {
    #[serde(default)]
    count: u64,
}
