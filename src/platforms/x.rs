use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;

use crate::error::PlatformError;
use crate::platforms::{decode_token, PlatformClient};
use crate::{excerpt, extract_hashtags, AccountRef, AccountStats, Platform, RawContentItem, RawEngagement};

const DEFAULT_API_BASE: &str = "https://api.twitter.com/2";

/// Known accounts per niche, used for candidate discovery. The X API offers
/// no public account search on the basic tier, so discovery walks a curated
/// list of accounts for any niche mentioned in the query.
const NICHE_ACCOUNTS: &[(&str, &[&str])] = &[
    (
        "python",
        &["gvanrossum", "raymondh", "dabeaz", "pyladies", "pythonbytes", "talkpython"],
    ),
    (
        "programming",
        &["github", "stackoverflow", "Codecademy", "freeCodeCamp", "ThePracticalDev"],
    ),
    ("javascript", &["nodejs", "angular", "reactjs", "vuejs", "jquery"]),
    (
        "data science",
        &["kaggle", "DataScienceTip", "KirkDBorne", "hmason", "mathbabedotorg"],
    ),
];

#[derive(Clone)]
pub struct XClient {
    http: reqwest::Client,
    api_base: String,
    bearer_token: String,
}

impl XClient {
    pub fn from_env() -> Result<Self, PlatformError> {
        let bearer_token = env::var("X_API_BEARER_TOKEN")
            .map_err(|_| PlatformError::MissingCredentials("X_API_BEARER_TOKEN"))?;
        let api_base = env::var("X_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Ok(Self::new(api_base, decode_token(bearer_token)))
    }

    pub fn new(api_base: String, bearer_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            bearer_token,
        }
    }

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<XUser>, PlatformError> {
        let body: UserResponse = self
            .get_json(
                &format!("users/by/username/{}", username),
                &[("user.fields", "description,public_metrics")],
            )
            .await?;
        Ok(body.data)
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
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
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
impl PlatformClient for XClient {
    fn platform(&self) -> Platform {
        Platform::X
    }

    async fn search_candidates(
        &self,
        query: &str,
        _region: &str,
        max_results: u32,
    ) -> Result<Vec<AccountRef>, PlatformError> {
        let lowered = query.to_lowercase();
        let mut refs = Vec::new();

        for (niche, usernames) in NICHE_ACCOUNTS {
            if !lowered.contains(niche) {
                continue;
            }
            for username in usernames.iter().take(max_results as usize) {
                match self.fetch_user_by_username(username).await {
                    Ok(Some(user)) => refs.push(AccountRef {
                        id: user.id,
                        title: Some(user.name),
                        handle: Some(user.username),
                    }),
                    Ok(None) => {}
                    Err(err) => {
                        tracing::debug!(username, error = %err, "user lookup failed, skipping")
                    }
                }
            }
            break;
        }

        Ok(refs)
    }

    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<Option<AccountStats>, PlatformError> {
        let body: UserResponse = self
            .get_json(
                &format!("users/{}", account.id),
                &[("user.fields", "description,public_metrics")],
            )
            .await?;

        let Some(user) = body.data else {
            return Ok(None);
        };

        let metrics = user.public_metrics.unwrap_or_default();
        Ok(Some(AccountStats {
            title: user.name,
            description: user.description.unwrap_or_default(),
            subscribers: metrics.followers_count,
            content_count: metrics.tweet_count,
            total_views: 0,
            username: Some(user.username),
        }))
    }

    async fn fetch_recent_content(
        &self,
        account: &AccountRef,
        max_items: u32,
    ) -> Result<Vec<RawContentItem>, PlatformError> {
        // The tweets endpoint rejects max_results outside 5..=100.
        let max = max_items.clamp(5, 100).to_string();
        let body: TweetsResponse = self
            .get_json(
                &format!("users/{}/tweets", account.id),
                &[
                    ("max_results", max.as_str()),
                    ("tweet_fields", "created_at,public_metrics"),
                    ("exclude", "retweets,replies"),
                ],
            )
            .await?;

        let tweets = body.data.unwrap_or_default();
        let items = tweets
            .into_iter()
            .take(max_items as usize)
            .map(|tweet| {
                let link = match account.handle.as_deref() {
                    Some(handle) => format!("https://twitter.com/{}/status/{}", handle, tweet.id),
                    None => format!("https://twitter.com/i/web/status/{}", tweet.id),
                };
                let metrics = tweet.public_metrics.unwrap_or_default();
                RawContentItem {
                    id: tweet.id,
                    title: excerpt(&tweet.text, 100),
                    tags: extract_hashtags(&tweet.text),
                    description: tweet.text,
                    published_at: tweet.created_at,
                    link,
                    engagement: RawEngagement::X {
                        impression_count: metrics.impression_count,
                        like_count: metrics.like_count,
                        reply_count: metrics.reply_count,
                        retweet_count: metrics.retweet_count,
                    },
                }
            })
            .collect();

        Ok(items)
    }
}

#[derive(Deserialize)]
struct UserResponse {
    data: Option<XUser>,
}

#[derive(Deserialize)]
struct XUser {
    id: String,
    name: String,
    username: String,
    description: Option<String>,
    public_metrics: Option<UserMetrics>,
}

#[derive(Deserialize, Default)]
struct UserMetrics {
    #[serde(default)]
    followers_count: u64,
    #[serde(default)]
    tweet_count: u64,
}

#[derive(Deserialize)]
struct TweetsResponse {
    data: Option<Vec<Tweet>>,
}

#[derive(Deserialize)]
struct Tweet {
    id: String,
    text: String,
    created_at: Option<String>,
    public_metrics: Option<TweetMetrics>,
}

#[derive(Deserialize, Default)]
struct TweetMetrics {
    impression_count: Option<u64>,
    like_count: Option<u64>,
    reply_count: Option<u64>,
    retweet_count: Option<u64>,
}
