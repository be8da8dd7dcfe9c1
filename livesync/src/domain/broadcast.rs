//! Broadcast record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BroadcastStatus, LiveVerdict, Platform, Subject};

/// A materialized broadcast, unique per `(subject_id, external_video_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastRecord {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub description: String,
    pub platform: Platform,
    pub status: BroadcastStatus,
    pub external_video_id: String,
    pub is_live: bool,
    pub stream_url: String,
    pub scheduled_start: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
}

impl BroadcastRecord {
    /// Build a new live broadcast for a subject found live on `video_id`.
    ///
    /// The search lookup does not expose the real start time, so
    /// `scheduled_start` is the detection time.
    pub fn live_from_verdict(
        subject: &Subject,
        platform: Platform,
        video_id: &str,
        verdict: &LiveVerdict,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject.id.clone(),
            title: verdict.stream_title.clone().unwrap_or_default(),
            description: verdict.description.clone().unwrap_or_default(),
            platform,
            status: BroadcastStatus::Live,
            external_video_id: video_id.to_string(),
            is_live: true,
            stream_url: platform.watch_url(video_id),
            scheduled_start: detected_at,
            thumbnail_url: verdict.thumbnail_url.clone(),
        }
    }

    /// Display form of the unique key, used in logs and duplicate-key errors.
    pub fn key(&self) -> String {
        format!("{}/{}", self.subject_id, self.external_video_id)
    }
}
