pub mod vk;
pub mod x;
pub mod youtube;

pub use vk::VkClient;
pub use x::XClient;
pub use youtube::YouTubeClient;

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::{AccountRef, AccountStats, Platform, RawContentItem};

/// Narrow capability interface every platform implements. The analysis
/// pipeline only ever sees this trait; all wire-format differences stop at
/// the client boundary.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    fn platform(&self) -> Platform;

    async fn search_candidates(
        &self,
        query: &str,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<AccountRef>, PlatformError>;

    /// `Ok(None)` means the platform had no stats for this account; the
    /// caller skips it without failing the batch.
    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<Option<AccountStats>, PlatformError>;

    async fn fetch_recent_content(
        &self,
        account: &AccountRef,
        max_items: u32,
    ) -> Result<Vec<RawContentItem>, PlatformError>;
}

/// Bearer tokens are sometimes pasted percent-encoded; decode those before
/// putting them on the wire.
pub(crate) fn decode_token(value: String) -> String {
    if value.contains('%') {
        match urlencoding::decode(&value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value,
        }
    } else {
        value
    }
}
