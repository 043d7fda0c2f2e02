//! Application state and sub-state extractors.
//!
//! Handlers take `State<Arc<AppState>>`; collaborators are trait objects so
//! tests can swap the database and media service for in-memory fakes.

use axum::extract::FromRef;
use optimedia_core::{Config, MediaKind, UploadLimits};
use optimedia_db::VideoStore;
use optimedia_services::MediaTransformer;
use std::sync::Arc;

/// Per-kind upload settings handed to the media service
#[derive(Clone, Debug)]
pub struct MediaUploadSettings {
    pub max_file_size: usize,
    pub allowed_content_types: Vec<String>,
    pub folder: String,
    pub transformation: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UploadSettings {
    pub image: MediaUploadSettings,
    pub video: MediaUploadSettings,
}

impl UploadSettings {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.limits(),
            config.media().image_folder.clone(),
            config.media().video_folder.clone(),
            config.media().video_transformation.clone(),
        )
    }

    pub fn new(
        limits: &UploadLimits,
        image_folder: String,
        video_folder: String,
        video_transformation: String,
    ) -> Self {
        Self {
            image: MediaUploadSettings {
                max_file_size: limits.max_image_size_bytes,
                allowed_content_types: limits.image_allowed_content_types.clone(),
                folder: image_folder,
                transformation: None,
            },
            video: MediaUploadSettings {
                max_file_size: limits.max_video_size_bytes,
                allowed_content_types: limits.video_allowed_content_types.clone(),
                folder: video_folder,
                transformation: Some(video_transformation).filter(|t| !t.is_empty()),
            },
        }
    }

    pub fn for_kind(&self, kind: MediaKind) -> &MediaUploadSettings {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
        }
    }
}

/// Media service client plus upload settings
#[derive(Clone)]
pub struct MediaState {
    pub transformer: Arc<dyn MediaTransformer>,
    pub uploads: UploadSettings,
}

#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoStore>,
    pub media: MediaState,
}

impl AppState {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        transformer: Arc<dyn MediaTransformer>,
        uploads: UploadSettings,
    ) -> Self {
        Self {
            videos,
            media: MediaState {
                transformer,
                uploads,
            },
        }
    }
}

impl FromRef<Arc<AppState>> for MediaState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.media.clone()
    }
}
