use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use optimedia_core::models::{MediaKind, Video, VideoResponse};
use optimedia_core::AppError;
use optimedia_services::DeliveryOptions;
use std::sync::Arc;
use uuid::Uuid;

fn download_url(state: &AppState, video: &Video) -> String {
    state.media.transformer.delivery_url(
        MediaKind::Video,
        &video.public_id,
        &DeliveryOptions::attachment(video.download_stem(), "mp4"),
    )
}

/// Attach CDN links to a stored video
pub(crate) fn video_response(state: &AppState, video: Video) -> VideoResponse {
    let download_url = download_url(state, &video);
    let thumbnail_url = state.media.transformer.delivery_url(
        MediaKind::Video,
        &video.public_id,
        &DeliveryOptions::thumbnail(),
    );
    VideoResponse::new(video, download_url, thumbnail_url)
}

async fn find_owned(state: &AppState, id: Uuid, user: &AuthUser) -> Result<Video, HttpAppError> {
    state
        .videos
        .get_for_owner(id, &user.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()).into())
}

#[utoipa::path(
    get,
    path = "/api/all-videos",
    tag = "videos",
    responses(
        (status = 200, description = "Videos owned by the signed-in user, newest first", body = Vec<VideoResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_videos"))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_by_owner(&user.email).await?;
    tracing::debug!(count = videos.len(), "Listed videos");

    let responses: Vec<VideoResponse> = videos
        .into_iter()
        .map(|video| video_response(&state, video))
        .collect();

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, video_id = %id, operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = find_owned(&state, id, &user).await?;
    Ok(Json(video_response(&state, video)))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/download",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 302, description = "Redirect to the compressed file served as an attachment"),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, video_id = %id, operation = "download_video"))]
pub async fn download_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = find_owned(&state, id, &user).await?;
    let url = download_url(&state, &video);
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, video_id = %id, operation = "delete_video"))]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .videos
        .delete_for_owner(id, &user.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    // The row is gone either way; a leftover remote asset is only logged
    if let Err(e) = state
        .media
        .transformer
        .destroy(MediaKind::Video, &video.public_id)
        .await
    {
        tracing::error!(
            error = %e,
            public_id = %video.public_id,
            "Failed to remove media asset for deleted video"
        );
    }

    tracing::info!(public_id = %video.public_id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}
