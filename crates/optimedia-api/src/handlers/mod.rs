pub mod image_upload;
pub mod video_upload;
pub mod videos;

use crate::utils::upload::{sanitize_filename, validate_content_type, UploadedFile};
use crate::error::HttpAppError;
use crate::state::MediaUploadSettings;
use optimedia_core::constants::NO_FILE_MESSAGE;
use optimedia_core::{AppError, MediaKind};
use optimedia_services::UploadRequest;

/// Check the received file against the per-kind settings and build the media request
pub(crate) fn prepare_upload(
    kind: MediaKind,
    file: Option<UploadedFile>,
    settings: &MediaUploadSettings,
) -> Result<UploadRequest, HttpAppError> {
    let file = file.ok_or_else(|| AppError::InvalidInput(NO_FILE_MESSAGE.to_string()))?;

    if file.bytes.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()).into());
    }
    validate_content_type(&file.content_type, &settings.allowed_content_types)?;

    Ok(UploadRequest {
        kind,
        filename: sanitize_filename(&file.filename),
        content_type: file.content_type,
        bytes: file.bytes,
        folder: settings.folder.clone(),
        transformation: settings.transformation.clone(),
    })
}
