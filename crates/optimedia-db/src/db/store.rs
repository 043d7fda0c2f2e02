use async_trait::async_trait;
use optimedia_core::{AppError, NewVideo, Video};
use uuid::Uuid;

/// Video metadata operations needed by the HTTP handlers.
///
/// Every read and delete is scoped to an owner; a video that belongs to
/// someone else is indistinguishable from one that does not exist.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a new video row and return it with generated id and timestamps
    async fn create(&self, video: NewVideo) -> Result<Video, AppError>;

    /// All videos owned by `owner`, newest first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Video>, AppError>;

    async fn get_for_owner(&self, id: Uuid, owner: &str) -> Result<Option<Video>, AppError>;

    /// Returns the deleted row, `None` when nothing matched
    async fn delete_for_owner(&self, id: Uuid, owner: &str) -> Result<Option<Video>, AppError>;

    /// Cheap connectivity check used by readiness probes
    async fn ping(&self) -> Result<(), AppError>;
}
