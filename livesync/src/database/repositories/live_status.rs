//! Live status store.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::LiveStatusDbModel;
use crate::database::retry::retry_on_sqlite_busy;
use crate::domain::{Platform, StatusRecord};
use crate::Result;

/// Durable last-known live status, keyed by `(creator_external_id, platform)`.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Insert the row if absent, otherwise overwrite it in place.
    async fn upsert_status(&self, record: &StatusRecord) -> Result<()>;
}

/// SQLx implementation of StatusStore.
pub struct SqlxStatusStore {
    pool: SqlitePool,
}

impl SqlxStatusStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_status(
        &self,
        creator_external_id: &str,
        platform: Platform,
    ) -> Result<Option<StatusRecord>> {
        let row = sqlx::query_as::<_, LiveStatusDbModel>(
            "SELECT * FROM live_status WHERE creator_external_id = ? AND platform = ?",
        )
        .bind(creator_external_id)
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StatusRecord::try_from).transpose()
    }
}

#[async_trait]
impl StatusStore for SqlxStatusStore {
    async fn upsert_status(&self, record: &StatusRecord) -> Result<()> {
        let model = LiveStatusDbModel::from(record);

        retry_on_sqlite_busy("upsert_status", || async {
            sqlx::query(
                r#"
                INSERT INTO live_status (
                    creator_external_id, platform, is_live, last_checked,
                    stream_title, stream_url, viewer_count
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(creator_external_id, platform) DO UPDATE SET
                    is_live = excluded.is_live,
                    last_checked = excluded.last_checked,
                    stream_title = excluded.stream_title,
                    stream_url = excluded.stream_url,
                    viewer_count = excluded.viewer_count
                "#,
            )
            .bind(&model.creator_external_id)
            .bind(&model.platform)
            .bind(model.is_live)
            .bind(model.last_checked)
            .bind(&model.stream_title)
            .bind(&model.stream_url)
            .bind(model.viewer_count)
            .execute(&self.pool)
            .await?;
            Ok(())
        })
        .await
    }
}
