//! Live status probing.
//!
//! This module turns one external channel id into a [`LiveVerdict`].

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::domain::{LiveVerdict, Platform};
use crate::{Error, Result};

use super::rate_limiter::RateLimiter;
use super::youtube::parse_search_body;

/// Default YouTube Data API v3 base URL.
pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Determines whether a channel is live right now.
///
/// Implementations must return an error when the status cannot be determined;
/// an `Ok` verdict with `is_live == false` means "confirmed not live".
#[async_trait]
pub trait LiveProber: Send + Sync {
    async fn probe(&self, external_channel_id: &str) -> Result<LiveVerdict>;
}

/// Prober backed by the YouTube `search` endpoint filtered to live videos.
pub struct YoutubeProber {
    client: Client,
    api_key: String,
    base_url: Url,
    rate_limiter: RateLimiter,
}

impl YoutubeProber {
    /// Create a prober against `base_url` (normally [`DEFAULT_YOUTUBE_API_BASE_URL`]).
    pub fn new(client: Client, api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid YouTube API base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "YouTube API base URL cannot be a base: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
            rate_limiter: RateLimiter::default(),
        })
    }

    /// Share a rate limiter across probers or replace the default one.
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// `{base}/search?part=snippet&channelId=..&eventType=live&type=video&key=..`
    fn search_url(&self, channel_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("search");
        }
        url.query_pairs_mut()
            .append_pair("part", "snippet")
            .append_pair("channelId", channel_id)
            .append_pair("eventType", "live")
            .append_pair("type", "video")
            .append_pair("key", &self.api_key);
        url
    }
}

#[async_trait]
impl LiveProber for YoutubeProber {
    async fn probe(&self, external_channel_id: &str) -> Result<LiveVerdict> {
        let waited = self.rate_limiter.acquire().await;
        if !waited.is_zero() {
            debug!(channel_id = %external_channel_id, "Rate limited for {:?}", waited);
        }

        let response = self
            .client
            .get(self.search_url(external_channel_id))
            .send()
            .await
            .map_err(|e| Error::probe(format!("search request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::probe(format!(
                    "failed to read search response: {}",
                    e.without_url()
                ))
            })?;

        let verdict = parse_search_body(status, &body)?.into_verdict(Platform::Youtube);

        debug!(
            channel_id = %external_channel_id,
            is_live = verdict.is_live,
            video_id = verdict.stream_external_video_id.as_deref().unwrap_or(""),
            "Probed channel"
        );

        Ok(verdict)
    }
}
