use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stored video metadata. The asset itself lives on the media service under `public_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub public_id: String,
    pub original_size: i64,
    pub compressed_size: i64,
    pub duration: f64,
    /// Owner's primary email address.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Download file name without extension, derived from the title.
    pub fn download_stem(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stem = stem.trim_matches('_');
        if stem.is_empty() {
            "video".to_string()
        } else {
            stem.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub public_id: String,
    pub original_size: i64,
    pub compressed_size: i64,
    pub duration: f64,
    pub created_by: String,
}

/// Video as returned to the dashboard. Keys are camelCase for the browser client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub public_id: String,
    pub original_size: i64,
    pub compressed_size: i64,
    pub duration: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// CDN link that is served as an attachment.
    pub download_url: String,
    pub thumbnail_url: String,
}

impl VideoResponse {
    pub fn new(video: Video, download_url: String, thumbnail_url: String) -> Self {
        VideoResponse {
            id: video.id,
            title: video.title,
            description: video.description,
            public_id: video.public_id,
            original_size: video.original_size,
            compressed_size: video.compressed_size,
            duration: video.duration,
            created_by: video.created_by,
            created_at: video.created_at,
            updated_at: video.updated_at,
            download_url,
            thumbnail_url,
        }
    }
}
