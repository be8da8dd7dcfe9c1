//! Subject entity.

use serde::{Deserialize, Serialize};

/// An organization whose channel is monitored for live broadcasts.
///
/// Loaded fresh from the repository at the start of every pass and treated as
/// read-only for the rest of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub display_name: String,
    pub external_channel_id: String,
    pub external_channel_url: Option<String>,
}

impl Subject {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        external_channel_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            external_channel_id: external_channel_id.into(),
            external_channel_url: None,
        }
    }
}
