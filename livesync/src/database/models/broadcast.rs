//! Broadcast database model.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::time::{datetime_to_ms, ms_to_datetime, now_ms};
use crate::domain::{BroadcastRecord, BroadcastStatus, Platform};
use crate::{Error, Result};

/// Broadcast database model.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BroadcastDbModel {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub description: String,
    pub platform: String,
    /// Lifecycle status (scheduled, live, ended)
    pub status: String,
    pub external_video_id: String,
    pub is_live: bool,
    pub stream_url: String,
    /// Unix epoch milliseconds (UTC).
    pub scheduled_start: i64,
    pub thumbnail_url: Option<String>,
    /// Unix epoch milliseconds (UTC) when the row was inserted.
    pub created_at: i64,
}

impl From<&BroadcastRecord> for BroadcastDbModel {
    fn from(record: &BroadcastRecord) -> Self {
        Self {
            id: record.id.clone(),
            subject_id: record.subject_id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            platform: record.platform.as_str().to_string(),
            status: record.status.as_str().to_string(),
            external_video_id: record.external_video_id.clone(),
            is_live: record.is_live,
            stream_url: record.stream_url.clone(),
            scheduled_start: datetime_to_ms(record.scheduled_start),
            thumbnail_url: record.thumbnail_url.clone(),
            created_at: now_ms(),
        }
    }
}

impl TryFrom<BroadcastDbModel> for BroadcastRecord {
    type Error = Error;

    fn try_from(model: BroadcastDbModel) -> Result<Self> {
        let platform = Platform::from_str(&model.platform)
            .map_err(|_| Error::store(format!("unknown platform '{}'", model.platform)))?;
        let status = BroadcastStatus::from_str(&model.status)
            .map_err(|_| Error::store(format!("unknown broadcast status '{}'", model.status)))?;

        Ok(Self {
            id: model.id,
            subject_id: model.subject_id,
            title: model.title,
            description: model.description,
            platform,
            status,
            external_video_id: model.external_video_id,
            is_live: model.is_live,
            stream_url: model.stream_url,
            scheduled_start: ms_to_datetime(model.scheduled_start),
            thumbnail_url: model.thumbnail_url,
        })
    }
}
