//! Persisted live status of a channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LiveVerdict, Platform};

/// Last-known live status of a channel, keyed by `(creator_external_id, platform)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub creator_external_id: String,
    pub platform: Platform,
    pub is_live: bool,
    pub last_checked: DateTime<Utc>,
    pub stream_title: Option<String>,
    pub stream_url: Option<String>,
    /// Always 0: the live search lookup does not report viewer counts.
    pub viewer_count: u32,
}

impl StatusRecord {
    /// Build the status row written after a successful probe.
    pub fn from_verdict(
        creator_external_id: impl Into<String>,
        platform: Platform,
        verdict: &LiveVerdict,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            creator_external_id: creator_external_id.into(),
            platform,
            is_live: verdict.is_live,
            last_checked: checked_at,
            stream_title: verdict.stream_title.clone(),
            stream_url: verdict.stream_url.clone(),
            viewer_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verdict_copies_stream_fields() {
        let now = Utc::now();
        let verdict = LiveVerdict {
            is_live: true,
            stream_title: Some("Sunday Service".to_string()),
            stream_external_video_id: Some("V1".to_string()),
            stream_url: Some(Platform::Youtube.watch_url("V1")),
            ..Default::default()
        };

        let record = StatusRecord::from_verdict("UC1", Platform::Youtube, &verdict, now);
        assert!(record.is_live);
        assert_eq!(record.creator_external_id, "UC1");
        assert_eq!(record.stream_title.as_deref(), Some("Sunday Service"));
        assert_eq!(
            record.stream_url.as_deref(),
            Some("https://www.youtube.com/watch?v=V1")
        );
        assert_eq!(record.viewer_count, 0);
        assert_eq!(record.last_checked, now);
    }

    #[test]
    fn test_from_offline_verdict_clears_stream_fields() {
        let record = StatusRecord::from_verdict(
            "UC1",
            Platform::Youtube,
            &LiveVerdict::offline(),
            Utc::now(),
        );
        assert!(!record.is_live);
        assert!(record.stream_title.is_none());
        assert!(record.stream_url.is_none());
    }
}
