use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::prepare_upload;
use crate::state::MediaState;
use crate::utils::upload::read_upload_form;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use optimedia_core::models::{ImageUploadResponse, MediaKind};

/// Field name used by the upload page; `file` is accepted as well
const IMAGE_FILE_FIELDS: [&str; 2] = ["fileFromFrontend", "file"];

#[utoipa::path(
    post,
    path = "/api/image-upload",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image uploaded and processed", body = ImageUploadResponse),
        (status = 400, description = "Missing or invalid file", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Media service failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(media, multipart), fields(user_id = %user.user_id, operation = "upload_image"))]
pub async fn upload_image(
    State(media): State<MediaState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let settings = media.uploads.for_kind(MediaKind::Image);
    let form = read_upload_form(multipart, &IMAGE_FILE_FIELDS, settings.max_file_size).await?;
    let request = prepare_upload(MediaKind::Image, form.file, settings)?;

    let asset = media.transformer.upload(request).await?;

    tracing::info!(public_id = %asset.public_id, bytes = asset.bytes, "Image uploaded");

    Ok(Json(ImageUploadResponse {
        public_id: asset.public_id.clone(),
        public_id_of_uploaded_file_in_cloudinary: asset.public_id,
        secure_url: asset.secure_url,
        bytes: asset.bytes,
        width: asset.width,
        height: asset.height,
        format: asset.format,
    }))
}
