//! Subject repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::SubjectDbModel;
use crate::database::time::now_ms;
use crate::domain::Subject;
use crate::{Error, Result};

/// Source of the subjects to reconcile.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Subjects with a channel id and auto detection enabled, in no particular order.
    async fn list_eligible_subjects(&self) -> Result<Vec<Subject>>;
}

/// SQLx implementation of SubjectRepository.
pub struct SqlxSubjectRepository {
    pool: SqlitePool,
}

impl SqlxSubjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_subject(&self, id: &str) -> Result<SubjectDbModel> {
        sqlx::query_as::<_, SubjectDbModel>("SELECT * FROM subjects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("Subject", id))
    }

    pub async fn create_subject(&self, subject: &SubjectDbModel) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO subjects (
                id, display_name, external_channel_id, external_channel_url,
                auto_live_detection, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subject.id)
        .bind(&subject.display_name)
        .bind(&subject.external_channel_id)
        .bind(&subject.external_channel_url)
        .bind(subject.auto_live_detection)
        .bind(subject.created_at)
        .bind(subject.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(Error::duplicate_key("Subject", &subject.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn set_auto_detection(&self, id: &str, enabled: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE subjects SET auto_live_detection = ?, updated_at = ? WHERE id = ?",
        )
        .bind(enabled)
        .bind(now_ms())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Subject", id));
        }
        Ok(())
    }
}

#[async_trait]
impl SubjectRepository for SqlxSubjectRepository {
    async fn list_eligible_subjects(&self) -> Result<Vec<Subject>> {
        let rows = sqlx::query_as::<_, SubjectDbModel>(
            r#"
            SELECT * FROM subjects
            WHERE external_channel_id IS NOT NULL
            AND auto_live_detection = 1
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::repository(format!("failed to list subjects: {}", e)))?;

        Ok(rows
            .into_iter()
            .filter_map(SubjectDbModel::into_subject)
            .collect())
    }
}
