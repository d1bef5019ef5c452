use serde::{Deserialize, Serialize};
use viralscope::trends::TrendingVideo;
use viralscope::{Account, AnalysisParams};

/// Competitor-analysis request. Field names match the original web client.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub keyword: String,
    pub region: String,
    #[serde(rename = "numPosts")]
    pub num_posts: u32,
    #[serde(rename = "minSubs")]
    pub min_subs: u64,
    #[serde(rename = "minVids")]
    pub min_vids: u64,
}

impl AnalysisRequest {
    pub fn into_params(self) -> Result<AnalysisParams, String> {
        let query = self.keyword.trim().to_string();
        if query.chars().count() < 2 {
            return Err("keyword must be at least 2 characters".to_string());
        }
        if self.num_posts < 1 || self.num_posts > 50 {
            return Err("numPosts must be between 1 and 50".to_string());
        }

        Ok(AnalysisParams {
            query,
            region: self.region.trim().to_uppercase(),
            max_posts: self.num_posts,
            min_subscribers: self.min_subs,
            min_content_count: self.min_vids,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub count: usize,
    pub competitors: Vec<Account>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendsRequest {
    pub user_key: u64,
    pub region: String,
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsNavRequest {
    pub user_key: u64,
    /// One of "next", "prev", "current", "jump".
    pub action: String,
    pub index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TrendPage {
    pub position: usize,
    pub total: usize,
    pub video: TrendingVideo,
}

#[derive(Debug, Serialize)]
pub struct TrendsNavResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<TrendPage>,
}

impl TrendsNavResponse {
    pub fn page(position: usize, total: usize, video: TrendingVideo) -> Self {
        Self {
            status: "ok",
            page: Some(TrendPage {
                position,
                total,
                video,
            }),
        }
    }

    pub fn status(status: &'static str) -> Self {
        Self { status, page: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_request_uses_client_field_names() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"keyword":"python","region":"us","numPosts":5,"minSubs":1000,"minVids":10}"#,
        )
        .unwrap();

        let params = request.into_params().unwrap();
        assert_eq!(params.query, "python");
        assert_eq!(params.region, "US");
        assert_eq!(params.max_posts, 5);
        assert_eq!(params.min_subscribers, 1000);
        assert_eq!(params.min_content_count, 10);
    }

    #[test]
    fn short_keyword_is_rejected() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"keyword":" p ","region":"US","numPosts":5,"minSubs":0,"minVids":0}"#,
        )
        .unwrap();
        assert!(request.into_params().is_err());
    }

    #[test]
    fn num_posts_is_bounded() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"keyword":"python","region":"US","numPosts":51,"minSubs":0,"minVids":0}"#,
        )
        .unwrap();
        assert!(request.into_params().is_err());
    }
}
