//! In-memory stand-ins for the database and the media service.

use async_trait::async_trait;
use chrono::Utc;
use optimedia_core::{AppError, MediaKind, NewVideo, Video};
use optimedia_db::VideoStore;
use optimedia_services::{
    DeliveryOptions, MediaServiceError, MediaTransformer, ProcessedAsset, UploadRequest,
};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: Mutex<Vec<Video>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl InMemoryVideoStore {
    pub fn all(&self) -> Vec<Video> {
        self.videos.lock().unwrap().clone()
    }

    /// Insert a row directly, with an explicit creation time
    pub fn seed(&self, owner: &str, title: &str, created_at: chrono::DateTime<Utc>) -> Video {
        let video = Video {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            public_id: format!("test-video-folder/{}", Uuid::new_v4().simple()),
            original_size: 2_000_000,
            compressed_size: 800_000,
            duration: 10.0,
            created_by: owner.to_string(),
            created_at,
            updated_at: created_at,
        };
        self.videos.lock().unwrap().push(video.clone());
        video
    }

    fn check_reads(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("database unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn create(&self, video: NewVideo) -> Result<Video, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("database unavailable".to_string()));
        }
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            title: video.title,
            description: video.description,
            public_id: video.public_id,
            original_size: video.original_size,
            compressed_size: video.compressed_size,
            duration: video.duration,
            created_by: video.created_by,
            created_at: now,
            updated_at: now,
        };
        self.videos.lock().unwrap().push(video.clone());
        Ok(video)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Video>, AppError> {
        self.check_reads()?;
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.created_by == owner)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn get_for_owner(&self, id: Uuid, owner: &str) -> Result<Option<Video>, AppError> {
        self.check_reads()?;
        Ok(self
            .videos
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id && v.created_by == owner)
            .cloned())
    }

    async fn delete_for_owner(&self, id: Uuid, owner: &str) -> Result<Option<Video>, AppError> {
        let mut videos = self.videos.lock().unwrap();
        let position = videos
            .iter()
            .position(|v| v.id == id && v.created_by == owner);
        Ok(position.map(|index| videos.remove(index)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_reads()
    }
}

/// Records every call and answers with a plausible compressed asset.
#[derive(Default)]
pub struct FakeMediaTransformer {
    uploads: Mutex<Vec<UploadRequest>>,
    destroyed: Mutex<Vec<String>>,
    counter: AtomicUsize,
    /// Non-zero makes every upload fail with this upstream status
    pub upload_failure_status: AtomicU16,
    pub fail_destroys: AtomicBool,
}

impl FakeMediaTransformer {
    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }

    /// Size reported for a processed upload of `original` bytes
    pub fn compressed_size(original: usize) -> i64 {
        (original / 2) as i64
    }
}

#[async_trait]
impl MediaTransformer for FakeMediaTransformer {
    async fn upload(&self, request: UploadRequest) -> Result<ProcessedAsset, MediaServiceError> {
        let status = self.upload_failure_status.load(Ordering::SeqCst);
        if status != 0 {
            return Err(MediaServiceError::Rejected {
                status,
                message: "Invalid transformation component - q_bogus".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("{}/asset-{}", request.folder, n);
        let asset = ProcessedAsset {
            public_id: public_id.clone(),
            bytes: Self::compressed_size(request.bytes.len()),
            duration: (request.kind == MediaKind::Video).then_some(12.5),
            secure_url: format!("https://cdn.test/{}/{}", request.kind, public_id),
            format: Some(match request.kind {
                MediaKind::Video => "mp4".to_string(),
                MediaKind::Image => "webp".to_string(),
            }),
            width: Some(640),
            height: Some(360),
            kind: request.kind,
        };
        self.uploads.lock().unwrap().push(request);
        Ok(asset)
    }

    async fn destroy(&self, _kind: MediaKind, public_id: &str) -> Result<(), MediaServiceError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        if self.fail_destroys.load(Ordering::SeqCst) {
            return Err(MediaServiceError::Rejected {
                status: 500,
                message: "destroy failed".to_string(),
            });
        }
        Ok(())
    }

    fn delivery_url(&self, kind: MediaKind, public_id: &str, options: &DeliveryOptions) -> String {
        let mut url = format!("https://cdn.test/{}/{}", kind, public_id);
        if let Some(name) = &options.attachment_name {
            url.push_str(&format!("?attachment={}", name));
        } else if let Some(transformation) = &options.transformation {
            url.push_str(&format!("?t={}", transformation));
        }
        url
    }
}
