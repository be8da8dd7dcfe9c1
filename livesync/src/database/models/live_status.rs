//! Live status database model.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::time::{datetime_to_ms, ms_to_datetime};
use crate::domain::{Platform, StatusRecord};
use crate::{Error, Result};

/// Live status database model, one row per `(creator_external_id, platform)`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LiveStatusDbModel {
    pub creator_external_id: String,
    pub platform: String,
    pub is_live: bool,
    /// Unix epoch milliseconds (UTC) of the last successful probe.
    pub last_checked: i64,
    pub stream_title: Option<String>,
    pub stream_url: Option<String>,
    pub viewer_count: i64,
}

impl From<&StatusRecord> for LiveStatusDbModel {
    fn from(record: &StatusRecord) -> Self {
        Self {
            creator_external_id: record.creator_external_id.clone(),
            platform: record.platform.as_str().to_string(),
            is_live: record.is_live,
            last_checked: datetime_to_ms(record.last_checked),
            stream_title: record.stream_title.clone(),
            stream_url: record.stream_url.clone(),
            viewer_count: i64::from(record.viewer_count),
        }
    }
}

impl TryFrom<LiveStatusDbModel> for StatusRecord {
    type Error = Error;

    fn try_from(model: LiveStatusDbModel) -> Result<Self> {
        let platform = Platform::from_str(&model.platform)
            .map_err(|_| Error::store(format!("unknown platform '{}'", model.platform)))?;

        Ok(Self {
            creator_external_id: model.creator_external_id,
            platform,
            is_live: model.is_live,
            last_checked: ms_to_datetime(model.last_checked),
            stream_title: model.stream_title,
            stream_url: model.stream_url,
            viewer_count: u32::try_from(model.viewer_count.max(0)).unwrap_or(u32::MAX),
        })
    }
}
