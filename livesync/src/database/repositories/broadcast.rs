//! Broadcast record store.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::BroadcastDbModel;
use crate::database::retry::retry_on_sqlite_busy;
use crate::domain::BroadcastRecord;
use crate::{Error, Result};

/// Durable broadcast records, unique per `(subject_id, external_video_id)`.
#[async_trait]
pub trait BroadcastStore: Send + Sync {
    async fn find_by_video(
        &self,
        subject_id: &str,
        external_video_id: &str,
    ) -> Result<Option<BroadcastRecord>>;

    /// Insert a record. Fails with [`Error::DuplicateKey`] if the key already exists.
    async fn create(&self, record: &BroadcastRecord) -> Result<()>;
}

/// SQLx implementation of BroadcastStore.
pub struct SqlxBroadcastStore {
    pool: SqlitePool,
}

impl SqlxBroadcastStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_by_subject(&self, subject_id: &str) -> Result<Vec<BroadcastRecord>> {
        let rows = sqlx::query_as::<_, BroadcastDbModel>(
            "SELECT * FROM broadcasts WHERE subject_id = ? ORDER BY scheduled_start DESC",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BroadcastRecord::try_from).collect()
    }
}

#[async_trait]
impl BroadcastStore for SqlxBroadcastStore {
    async fn find_by_video(
        &self,
        subject_id: &str,
        external_video_id: &str,
    ) -> Result<Option<BroadcastRecord>> {
        let row = sqlx::query_as::<_, BroadcastDbModel>(
            "SELECT * FROM broadcasts WHERE subject_id = ? AND external_video_id = ?",
        )
        .bind(subject_id)
        .bind(external_video_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BroadcastRecord::try_from).transpose()
    }

    async fn create(&self, record: &BroadcastRecord) -> Result<()> {
        let model = BroadcastDbModel::from(record);

        retry_on_sqlite_busy("create_broadcast", || async {
            let result = sqlx::query(
                r#"
                INSERT INTO broadcasts (
                    id, subject_id, title, description, platform, status,
                    external_video_id, is_live, stream_url, scheduled_start,
                    thumbnail_url, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&model.id)
            .bind(&model.subject_id)
            .bind(&model.title)
            .bind(&model.description)
            .bind(&model.platform)
            .bind(&model.status)
            .bind(&model.external_video_id)
            .bind(model.is_live)
            .bind(&model.stream_url)
            .bind(model.scheduled_start)
            .bind(&model.thumbnail_url)
            .bind(model.created_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Err(Error::duplicate_key("Broadcast", record.key()))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }
}
