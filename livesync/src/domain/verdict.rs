//! Live verdict produced by a probe.

use serde::{Deserialize, Serialize};

/// The live / not-live determination for one channel in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveVerdict {
    pub is_live: bool,
    pub stream_title: Option<String>,
    pub stream_external_video_id: Option<String>,
    pub stream_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
}

impl LiveVerdict {
    /// A confirmed "not live" verdict.
    pub fn offline() -> Self {
        Self::default()
    }

    /// The video id to materialize a broadcast record for, if any.
    pub fn live_video_id(&self) -> Option<&str> {
        if !self.is_live {
            return None;
        }
        self.stream_external_video_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}
