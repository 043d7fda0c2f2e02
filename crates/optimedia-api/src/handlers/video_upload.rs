use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{prepare_upload, videos::video_response};
use crate::state::AppState;
use crate::utils::upload::{parse_reported_size, read_upload_form};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use optimedia_core::models::{MediaKind, NewVideo, VideoResponse, VideoUploadForm};
use optimedia_core::AppError;
use std::sync::Arc;
use validator::Validate;

const VIDEO_FILE_FIELDS: [&str; 1] = ["file"];

#[utoipa::path(
    post,
    path = "/api/video-upload",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video compressed and saved", body = VideoResponse),
        (status = 400, description = "Missing file or invalid form fields", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Media service failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id, operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let settings = state.media.uploads.for_kind(MediaKind::Video);
    let form = read_upload_form(multipart, &VIDEO_FILE_FIELDS, settings.max_file_size).await?;

    let fields = VideoUploadForm {
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").map(String::from),
        original_size: parse_reported_size(form.text("originalSize")),
        created_by: form.text("createdBy").map(String::from),
    }
    .normalized();
    fields.validate().map_err(AppError::from)?;

    if let Some(claimed) = fields.created_by.as_deref() {
        if !claimed.eq_ignore_ascii_case(&user.email) {
            tracing::warn!(
                claimed_owner = %claimed,
                "Ignoring createdBy that does not match the session"
            );
        }
    }

    let request = prepare_upload(MediaKind::Video, form.file, settings)?;
    let received_bytes = request.bytes.len() as i64;

    let asset = state.media.transformer.upload(request).await?;

    let new_video = NewVideo {
        title: fields.title,
        description: fields.description,
        public_id: asset.public_id.clone(),
        original_size: fields.original_size.unwrap_or(received_bytes),
        compressed_size: asset.bytes,
        duration: asset.duration.unwrap_or(0.0),
        created_by: user.email.clone(),
    };

    let video = match state.videos.create(new_video).await {
        Ok(video) => video,
        Err(e) => {
            // The asset is orphaned without a row; remove it in the background
            let transformer = state.media.transformer.clone();
            let public_id = asset.public_id;
            tokio::spawn(async move {
                if let Err(err) = transformer.destroy(MediaKind::Video, &public_id).await {
                    tracing::error!(
                        error = %err,
                        public_id = %public_id,
                        "Failed to remove media asset after database error"
                    );
                }
            });
            return Err(e.into());
        }
    };

    tracing::info!(
        video_id = %video.id,
        public_id = %video.public_id,
        original_size = video.original_size,
        compressed_size = video.compressed_size,
        "Video uploaded"
    );

    Ok(Json(video_response(&state, video)))
}
