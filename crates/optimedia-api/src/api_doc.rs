//! OpenAPI documentation, served at `/api/openapi.json`.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use optimedia_core::models;

struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Session token from the auth provider; the __session cookie is accepted too",
                    ))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OptiMedia Hub API",
        version = "0.1.0",
        description = "Upload images and videos for optimization by the media service and manage your compressed videos."
    ),
    paths(
        handlers::image_upload::upload_image,
        handlers::video_upload::upload_video,
        handlers::videos::list_videos,
        handlers::videos::get_video,
        handlers::videos::download_video,
        handlers::videos::delete_video,
    ),
    components(
        schemas(
            models::ImageUploadResponse,
            models::VideoResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SessionAuth),
    security(("session" = [])),
    tags(
        (name = "images", description = "Image optimization"),
        (name = "videos", description = "Video compression and the video library")
    )
)]
pub struct ApiDoc;

pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
