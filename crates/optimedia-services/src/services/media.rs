//! Media transformation abstraction
//!
//! An upload sends raw bytes to the hosted service and gets back a
//! `ProcessedAsset` describing what it stored after compression and format
//! conversion. Assets are addressed afterwards by their public id.

use async_trait::async_trait;
use bytes::Bytes;
use optimedia_core::{AppError, MediaKind};
use thiserror::Error;

/// Errors from the media service
#[derive(Debug, Error)]
pub enum MediaServiceError {
    #[error("Media service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Media service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected media service response: {0}")]
    Decode(String),

    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),
}

impl From<MediaServiceError> for AppError {
    fn from(err: MediaServiceError) -> Self {
        match err {
            MediaServiceError::InvalidRequest(message) => AppError::InvalidInput(message),
            // Any upstream rejection, 4xx included, is a gateway failure
            other => AppError::MediaService(other.to_string()),
        }
    }
}

/// One file to push to the media service
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub kind: MediaKind,
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: String,
    pub folder: String,
    /// Incoming transformation applied before the asset is stored
    pub transformation: Option<String>,
}

/// Descriptor of a stored asset, as reported by the media service
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedAsset {
    pub public_id: String,
    /// Size of the stored (processed) asset
    pub bytes: i64,
    /// Seconds; only reported for audio and video
    pub duration: Option<f64>,
    pub secure_url: String,
    pub format: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub kind: MediaKind,
}

/// Options for building CDN links
#[derive(Debug, Clone, Default)]
pub struct DeliveryOptions {
    /// Transformation string such as `so_0,w_400`
    pub transformation: Option<String>,
    /// Serve as a download with this file name (without extension)
    pub attachment_name: Option<String>,
    /// Extension to request, e.g. `mp4` or `jpg`
    pub format: Option<String>,
}

impl DeliveryOptions {
    pub fn attachment(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            transformation: None,
            attachment_name: Some(name.into()),
            format: Some(format.into()),
        }
    }

    pub fn thumbnail() -> Self {
        Self {
            transformation: Some("so_0,w_400,h_225,c_fill".to_string()),
            attachment_name: None,
            format: Some("jpg".to_string()),
        }
    }
}

#[async_trait]
pub trait MediaTransformer: Send + Sync {
    /// Upload and transform a file
    async fn upload(&self, request: UploadRequest) -> Result<ProcessedAsset, MediaServiceError>;

    /// Delete a stored asset. Deleting an asset that no longer exists succeeds.
    async fn destroy(&self, kind: MediaKind, public_id: &str) -> Result<(), MediaServiceError>;

    /// Public CDN URL for a stored asset
    fn delivery_url(&self, kind: MediaKind, public_id: &str, options: &DeliveryOptions) -> String;
}
