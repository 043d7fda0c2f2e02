//! OptiMedia Core Library
//!
//! Domain models, error types and configuration shared by the database,
//! media-service and HTTP crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{AuthConfig, Config, MediaServiceConfig, UploadLimits};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{MediaKind, NewVideo, Video, VideoResponse};
