//! Service initialization and application state setup

use crate::auth::jwks::JwksVerifier;
use crate::auth::middleware::AuthState;
use crate::auth::shared_secret::SharedSecretVerifier;
use crate::auth::{ClaimRules, SessionVerifier};
use crate::state::{AppState, UploadSettings};
use anyhow::{Context, Result};
use optimedia_core::Config;
use optimedia_db::PgVideoRepository;
use optimedia_services::CloudinaryClient;
use sqlx::PgPool;
use std::sync::Arc;

/// Build repositories and the media client, returning the application state
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let videos = Arc::new(PgVideoRepository::new(pool));

    let media = config.media();
    let transformer = Arc::new(
        CloudinaryClient::new(media).context("Failed to create media service client")?,
    );
    tracing::info!(
        cloud_name = %media.cloud_name,
        video_folder = %media.video_folder,
        video_transformation = %media.video_transformation,
        "Media service client initialized"
    );

    let uploads = UploadSettings::from_config(config);
    tracing::info!(
        max_image_mb = uploads.image.max_file_size / 1024 / 1024,
        max_video_mb = uploads.video.max_file_size / 1024 / 1024,
        image_types = %uploads.image.allowed_content_types.join(","),
        video_types = %uploads.video.allowed_content_types.join(","),
        "Upload limits configured"
    );

    Ok(Arc::new(AppState::new(videos, transformer, uploads)))
}

/// Pick the session verifier: JWKS when configured, otherwise the shared secret
pub fn initialize_auth(config: &Config) -> Result<AuthState> {
    let auth = config.auth();
    let rules = ClaimRules::from_config(auth);

    let verifier: Arc<dyn SessionVerifier> = match (&auth.jwks_url, &auth.jwt_secret) {
        (Some(url), _) => {
            tracing::info!(jwks_url = %url, ttl_secs = auth.jwks_cache_ttl_secs, "Session tokens verified via JWKS");
            Arc::new(JwksVerifier::new(url.clone(), auth.jwks_cache_ttl_secs, rules))
        }
        (None, Some(secret)) => {
            tracing::warn!("Session tokens verified with a shared secret; use JWKS in production");
            Arc::new(SharedSecretVerifier::new(secret, rules))
        }
        (None, None) => {
            return Err(anyhow::anyhow!(
                "Either AUTH_JWKS_URL or AUTH_JWT_SECRET must be set"
            ))
        }
    };

    Ok(AuthState {
        verifier,
        email_claim: auth.email_claim.clone(),
    })
}
