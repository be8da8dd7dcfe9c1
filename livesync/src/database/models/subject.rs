//! Subject database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::time::now_ms;
use crate::domain::Subject;

/// Subject database model.
/// An organization whose channel may be reconciled.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubjectDbModel {
    pub id: String,
    pub display_name: String,
    /// Channel id on the external platform; subjects without one are never probed.
    pub external_channel_id: Option<String>,
    pub external_channel_url: Option<String>,
    /// Opt-in flag for automatic live detection.
    pub auto_live_detection: bool,
    /// Unix epoch milliseconds (UTC) when created.
    pub created_at: i64,
    /// Unix epoch milliseconds (UTC) when last updated.
    pub updated_at: i64,
}

impl SubjectDbModel {
    /// Create a new subject with auto detection enabled.
    pub fn new(display_name: impl Into<String>, external_channel_id: Option<String>) -> Self {
        let now = now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            external_channel_id,
            external_channel_url: None,
            auto_live_detection: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_auto_detection(mut self, enabled: bool) -> Self {
        self.auto_live_detection = enabled;
        self
    }

    /// Convert to the domain type. Returns `None` when there is no channel to probe.
    pub fn into_subject(self) -> Option<Subject> {
        let channel_id = self.external_channel_id.filter(|id| !id.trim().is_empty())?;
        Some(Subject {
            id: self.id,
            display_name: self.display_name,
            external_channel_id: channel_id,
            external_channel_url: self.external_channel_url,
        })
    }
}
