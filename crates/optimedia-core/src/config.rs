//! Configuration module
//!
//! Everything is read from the environment (a `.env` file is honoured through
//! `dotenvy`). `Config::from_env` parses and applies defaults, then validates.

use std::env;

use crate::constants::{
    DEFAULT_IMAGE_FOLDER, DEFAULT_MEDIA_API_BASE_URL, DEFAULT_MEDIA_DELIVERY_BASE_URL,
    DEFAULT_VIDEO_FOLDER, DEFAULT_VIDEO_TRANSFORMATION,
};

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWKS_CACHE_TTL_SECS: u64 = 3600;
const MEDIA_REQUEST_TIMEOUT_SECS: u64 = 300;
const MAX_IMAGE_SIZE_MB: usize = 10;
const MAX_VIDEO_SIZE_MB: usize = 20;
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;
const MIN_JWT_SECRET_LEN: usize = 32;

const IMAGE_ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";
const VIDEO_ALLOWED_CONTENT_TYPES: &str =
    "video/mp4,video/quicktime,video/webm,video/x-msvideo,video/x-matroska";

/// Session token verification settings.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// JWKS endpoint of the auth provider (asymmetric tokens).
    pub jwks_url: Option<String>,
    /// Shared HS256 secret, for local development and tests.
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Allowed `azp` values; empty disables the check.
    pub authorized_parties: Vec<String>,
    pub email_claim: String,
    pub jwks_cache_ttl_secs: u64,
}

/// Hosted media-transformation account.
#[derive(Clone, Debug)]
pub struct MediaServiceConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub delivery_base_url: String,
    pub image_folder: String,
    pub video_folder: String,
    pub video_transformation: String,
    pub request_timeout_secs: u64,
}

/// Server-side upload limits.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_image_size_bytes: usize,
    pub max_video_size_bytes: usize,
    pub image_allowed_content_types: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * 1024 * 1024,
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            image_allowed_content_types: split_list(IMAGE_ALLOWED_CONTENT_TYPES),
            video_allowed_content_types: split_list(VIDEO_ALLOWED_CONTENT_TYPES),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub auth: AuthConfig,
    pub media: MediaServiceConfig,
    pub limits: UploadLimits,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn inner(&self) -> &AppConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().environment)
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.inner().auth
    }

    pub fn media(&self) -> &MediaServiceConfig {
        &self.inner().media
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.inner().limits
    }

    /// Largest body the router accepts: the bigger upload limit plus room for
    /// multipart boundaries and text fields.
    pub fn max_request_body_bytes(&self) -> usize {
        let limits = self.limits();
        limits
            .max_image_size_bytes
            .max(limits.max_video_size_bytes)
            .saturating_add(FORM_OVERHEAD_BYTES)
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Megabyte limit from the environment, in bytes
fn size_limit_bytes(name: &str, value: Option<&str>, default_mb: usize) -> Result<usize, anyhow::Error> {
    let mb = match value {
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of megabytes", name))?,
        None => default_mb,
    };
    // The request body limit adds the form overhead on top, so that must fit too
    mb.checked_mul(1024 * 1024)
        .filter(|bytes| bytes.checked_add(FORM_OVERHEAD_BYTES).is_some())
        .ok_or_else(|| anyhow::anyhow!("{} is too large", name))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let auth = AuthConfig {
            jwks_url: non_empty_var("AUTH_JWKS_URL"),
            jwt_secret: non_empty_var("AUTH_JWT_SECRET"),
            issuer: non_empty_var("AUTH_ISSUER"),
            audience: non_empty_var("AUTH_AUDIENCE"),
            authorized_parties: env::var("AUTH_AUTHORIZED_PARTIES")
                .map(|s| {
                    s.split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            email_claim: non_empty_var("AUTH_EMAIL_CLAIM").unwrap_or_else(|| "email".to_string()),
            jwks_cache_ttl_secs: env::var("AUTH_JWKS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| JWKS_CACHE_TTL_SECS.to_string())
                .parse()
                .unwrap_or(JWKS_CACHE_TTL_SECS),
        };

        let media = MediaServiceConfig {
            cloud_name: non_empty_var("MEDIA_CLOUD_NAME")
                .ok_or_else(|| anyhow::anyhow!("MEDIA_CLOUD_NAME must be set"))?,
            api_key: non_empty_var("MEDIA_API_KEY")
                .ok_or_else(|| anyhow::anyhow!("MEDIA_API_KEY must be set"))?,
            api_secret: non_empty_var("MEDIA_API_SECRET")
                .ok_or_else(|| anyhow::anyhow!("MEDIA_API_SECRET must be set"))?,
            api_base_url: non_empty_var("MEDIA_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MEDIA_API_BASE_URL.to_string()),
            delivery_base_url: non_empty_var("MEDIA_DELIVERY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MEDIA_DELIVERY_BASE_URL.to_string()),
            image_folder: non_empty_var("MEDIA_IMAGE_FOLDER")
                .unwrap_or_else(|| DEFAULT_IMAGE_FOLDER.to_string()),
            video_folder: non_empty_var("MEDIA_VIDEO_FOLDER")
                .unwrap_or_else(|| DEFAULT_VIDEO_FOLDER.to_string()),
            video_transformation: non_empty_var("MEDIA_VIDEO_TRANSFORMATION")
                .unwrap_or_else(|| DEFAULT_VIDEO_TRANSFORMATION.to_string()),
            request_timeout_secs: env::var("MEDIA_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| MEDIA_REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(MEDIA_REQUEST_TIMEOUT_SECS),
        };

        let limits = UploadLimits {
            max_image_size_bytes: size_limit_bytes(
                "MAX_IMAGE_SIZE_MB",
                non_empty_var("MAX_IMAGE_SIZE_MB").as_deref(),
                MAX_IMAGE_SIZE_MB,
            )?,
            max_video_size_bytes: size_limit_bytes(
                "MAX_VIDEO_SIZE_MB",
                non_empty_var("MAX_VIDEO_SIZE_MB").as_deref(),
                MAX_VIDEO_SIZE_MB,
            )?,
            image_allowed_content_types: split_list(
                &env::var("IMAGE_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| IMAGE_ALLOWED_CONTENT_TYPES.to_string()),
            ),
            video_allowed_content_types: split_list(
                &env::var("VIDEO_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| VIDEO_ALLOWED_CONTENT_TYPES.to_string()),
            ),
        };

        let config = AppConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            auth,
            media,
            limits,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let production = is_production_env(&self.environment);

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }
        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }
        if self.db_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("DB_TIMEOUT_SECONDS must be greater than 0"));
        }

        if production && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS must list specific origins in production"
            ));
        }

        match (&self.auth.jwks_url, &self.auth.jwt_secret) {
            (None, None) => {
                return Err(anyhow::anyhow!(
                    "Either AUTH_JWKS_URL or AUTH_JWT_SECRET must be set"
                ));
            }
            (Some(url), _) if production && !url.starts_with("https://") => {
                return Err(anyhow::anyhow!("AUTH_JWKS_URL must use https in production"));
            }
            (_, Some(_)) if production => {
                return Err(anyhow::anyhow!(
                    "AUTH_JWT_SECRET is for development only; use AUTH_JWKS_URL in production"
                ));
            }
            (_, Some(secret)) if secret.len() < MIN_JWT_SECRET_LEN => {
                return Err(anyhow::anyhow!(
                    "AUTH_JWT_SECRET must be at least 32 characters long"
                ));
            }
            _ => {}
        }

        if self.media.cloud_name.is_empty()
            || self.media.api_key.is_empty()
            || self.media.api_secret.is_empty()
        {
            return Err(anyhow::anyhow!(
                "MEDIA_CLOUD_NAME, MEDIA_API_KEY and MEDIA_API_SECRET must not be empty"
            ));
        }

        if self.limits.max_image_size_bytes == 0 || self.limits.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than 0"));
        }

        Ok(())
    }
}
