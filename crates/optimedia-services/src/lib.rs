//! OptiMedia Services Layer
//!
//! Clients for the hosted media-transformation service. Handlers depend on the
//! `MediaTransformer` trait; `CloudinaryClient` is the HTTP implementation.

pub mod services;

pub use services::cloudinary::{sign_params, CloudinaryClient};
pub use services::media::{
    DeliveryOptions, MediaServiceError, MediaTransformer, ProcessedAsset, UploadRequest,
};
