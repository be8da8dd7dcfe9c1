//! YouTube Data API v3 search models.
//!
//! Only the fields the live lookup consumes are modelled. Everything the
//! provider returns is decoded here and turned into a [`LiveVerdict`] by
//! [`SearchListResponse::into_verdict`]; nothing else in the crate sees raw
//! provider JSON.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::{LiveVerdict, Platform};
use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    /// Required: a body without `items` is not a valid search response.
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
}

impl Thumbnails {
    /// Medium resolution when present, otherwise the default one.
    pub fn preferred_url(&self) -> Option<&str> {
        self.medium
            .as_ref()
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

impl SearchListResponse {
    /// Normalize a search result set. The first item is authoritative.
    pub fn into_verdict(self, platform: Platform) -> LiveVerdict {
        let Some(first) = self.items.into_iter().next() else {
            return LiveVerdict::offline();
        };

        let video_id = first.id.video_id.filter(|id| !id.is_empty());
        let stream_url = video_id.as_deref().map(|id| platform.watch_url(id));

        let (title, description, thumbnail_url) = match first.snippet {
            Some(snippet) => {
                let thumbnail_url = snippet.thumbnails.preferred_url().map(str::to_string);
                (Some(snippet.title), snippet.description, thumbnail_url)
            }
            None => (None, None, None),
        };

        LiveVerdict {
            is_live: true,
            stream_title: title,
            stream_external_video_id: video_id,
            stream_url,
            thumbnail_url,
            description,
        }
    }
}

/// Decode a search response body, turning provider errors into [`Error::Probe`].
pub fn parse_search_body(status: StatusCode, body: &str) -> Result<SearchListResponse> {
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(body) {
        return Err(Error::probe(describe_api_error(status, &api_error.error)));
    }

    if !status.is_success() {
        return Err(Error::probe(format!(
            "search request failed with HTTP {}",
            status
        )));
    }

    serde_json::from_str::<SearchListResponse>(body)
        .map_err(|e| Error::probe(format!("malformed search response: {}", e)))
}

fn describe_api_error(status: StatusCode, error: &ApiError) -> String {
    let code = error.code.unwrap_or_else(|| status.as_u16());
    let message = error.message.as_deref().unwrap_or("unknown error");
    match error.errors.iter().find_map(|d| d.reason.as_deref()) {
        Some(reason) => format!("YouTube API error {} ({}): {}", code, reason, message),
        None => format!("YouTube API error {}: {}", code, message),
    }
}
