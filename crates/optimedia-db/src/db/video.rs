use async_trait::async_trait;
use chrono::Utc;
use optimedia_core::{AppError, NewVideo, Video};
use sqlx::PgPool;
use uuid::Uuid;

use super::store::VideoStore;

const VIDEO_COLUMNS: &str = "id, title, description, public_id, original_size, compressed_size, \
     duration, created_by, created_at, updated_at";

/// Postgres-backed video repository
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(owner = %video.created_by, public_id = %video.public_id))]
    async fn create(&self, video: NewVideo) -> Result<Video, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query_as::<_, Video>(&format!(
            r#"
            INSERT INTO videos (
                id, title, description, public_id, original_size, compressed_size,
                duration, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.public_id)
        .bind(video.original_size)
        .bind(video.compressed_size)
        .bind(video.duration)
        .bind(&video.created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(video_id = %row.id, "Video row created");
        Ok(row)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Video>, AppError> {
        let rows = sqlx::query_as::<_, Video>(&format!(
            r#"
            SELECT {}
            FROM videos
            WHERE created_by = $1
            ORDER BY created_at DESC, id DESC
            "#,
            VIDEO_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_for_owner(&self, id: Uuid, owner: &str) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<_, Video>(&format!(
            r#"
            SELECT {}
            FROM videos
            WHERE id = $1 AND created_by = $2
            "#,
            VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_for_owner(&self, id: Uuid, owner: &str) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<_, Video>(&format!(
            r#"
            DELETE FROM videos
            WHERE id = $1 AND created_by = $2
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
