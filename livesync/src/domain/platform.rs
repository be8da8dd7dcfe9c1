//! Broadcast platform value objects.

use serde::{Deserialize, Serialize};

/// External platform a channel broadcasts on.
///
/// Only YouTube is probed today; the value is still persisted so that status
/// rows stay keyed by `(creator_external_id, platform)`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Youtube,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
        }
    }

    /// Public watch URL for a video on this platform.
    pub fn watch_url(&self, video_id: &str) -> String {
        match self {
            Self::Youtube => format!("https://www.youtube.com/watch?v={}", video_id),
        }
    }
}

/// Lifecycle status stored on a broadcast record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    Scheduled,
    Live,
    Ended,
}

impl BroadcastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }
}
