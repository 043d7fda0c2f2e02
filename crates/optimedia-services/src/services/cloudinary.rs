//! Cloudinary-compatible upload API client
//!
//! Requests are signed: parameters (excluding `file`, `api_key`,
//! `resource_type` and the signature itself) are sorted by name, joined as
//! `k=v` pairs with `&`, the API secret is appended, and the SHA-1 hex digest
//! of the result is sent as `signature`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use optimedia_core::{MediaKind, MediaServiceConfig};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::media::{
    DeliveryOptions, MediaServiceError, MediaTransformer, ProcessedAsset, UploadRequest,
};

const UNSIGNED_PARAMS: [&str; 4] = ["file", "api_key", "resource_type", "signature"];

const ATTACHMENT_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Compute the request signature for a parameter set
pub fn sign_params(params: &BTreeMap<String, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(key, value)| !UNSIGNED_PARAMS.contains(&key.as_str()) && !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadApiResponse {
    public_id: String,
    bytes: i64,
    #[serde(default)]
    duration: Option<f64>,
    secure_url: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    width: Option<i32>,
    #[serde(default)]
    height: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct DestroyApiResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

pub struct CloudinaryClient {
    http_client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base_url: String,
    delivery_base_url: String,
}

impl Debug for CloudinaryClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryClient")
            .field("cloud_name", &self.cloud_name)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl CloudinaryClient {
    pub fn new(config: &MediaServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client for media service")?;

        Ok(Self {
            http_client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            delivery_base_url: config.delivery_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base_url,
            self.cloud_name,
            kind.as_str(),
            action
        )
    }

    /// Adds timestamp, api key and signature to the parameters and returns them as a form
    fn signed_form(&self, mut params: BTreeMap<String, String>) -> Form {
        params.insert(
            "timestamp".to_string(),
            chrono::Utc::now().timestamp().to_string(),
        );
        let signature = sign_params(&params, &self.api_secret);

        let mut form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }
        form
    }

    async fn send(&self, url: &str, form: Form) -> Result<reqwest::Response, MediaServiceError> {
        let response = self.http_client.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        status.to_string()
                    } else {
                        body
                    }
                });
            return Err(MediaServiceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl MediaTransformer for CloudinaryClient {
    #[tracing::instrument(
        skip(self, request),
        fields(kind = %request.kind, folder = %request.folder, size = request.bytes.len())
    )]
    async fn upload(&self, request: UploadRequest) -> Result<ProcessedAsset, MediaServiceError> {
        if request.bytes.is_empty() {
            return Err(MediaServiceError::InvalidRequest(
                "Cannot upload an empty file".to_string(),
            ));
        }

        let mut params = BTreeMap::new();
        params.insert("folder".to_string(), request.folder.clone());
        if let Some(transformation) = request.transformation.as_ref() {
            params.insert("transformation".to_string(), transformation.clone());
        }

        let length = request.bytes.len() as u64;
        let file_part = Part::stream_with_length(request.bytes, length)
            .file_name(request.filename.clone())
            .mime_str(&request.content_type)
            .map_err(|e| MediaServiceError::InvalidRequest(format!("Invalid content type: {}", e)))?;
        let form = self.signed_form(params).part("file", file_part);

        let url = self.endpoint(request.kind, "upload");
        let started = std::time::Instant::now();
        let response = self.send(&url, form).await?;
        let body: UploadApiResponse = response
            .json()
            .await
            .map_err(|e| MediaServiceError::Decode(e.to_string()))?;

        tracing::info!(
            public_id = %body.public_id,
            processed_bytes = body.bytes,
            duration = body.duration,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Media uploaded"
        );

        Ok(ProcessedAsset {
            public_id: body.public_id,
            bytes: body.bytes,
            duration: body.duration,
            secure_url: body.secure_url,
            format: body.format,
            width: body.width,
            height: body.height,
            kind: request.kind,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn destroy(&self, kind: MediaKind, public_id: &str) -> Result<(), MediaServiceError> {
        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), public_id.to_string());
        params.insert("invalidate".to_string(), "true".to_string());
        let form = self.signed_form(params);

        let response = self.send(&self.endpoint(kind, "destroy"), form).await?;
        let body: DestroyApiResponse = response
            .json()
            .await
            .map_err(|e| MediaServiceError::Decode(e.to_string()))?;

        match body.result.as_str() {
            "ok" => {
                tracing::debug!("Media asset destroyed");
                Ok(())
            }
            "not found" => {
                tracing::debug!("Media asset already gone");
                Ok(())
            }
            other => Err(MediaServiceError::Decode(format!(
                "unexpected destroy result '{}'",
                other
            ))),
        }
    }

    fn delivery_url(&self, kind: MediaKind, public_id: &str, options: &DeliveryOptions) -> String {
        let mut segments: Vec<String> = Vec::new();
        if let Some(transformation) = options.transformation.as_ref() {
            segments.push(transformation.clone());
        }
        if let Some(name) = options.attachment_name.as_ref() {
            let name = utf8_percent_encode(name, ATTACHMENT_NAME);
            segments.push(format!("fl_attachment:{}", name));
        }

        let mut url = format!(
            "{}/{}/{}/upload",
            self.delivery_base_url,
            self.cloud_name,
            kind.as_str()
        );
        for segment in segments {
            url.push('/');
            url.push_str(&segment);
        }
        url.push('/');
        url.push_str(public_id);
        if let Some(format) = options.format.as_ref() {
            url.push('.');
            url.push_str(format);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn client() -> CloudinaryClient {
        CloudinaryClient::new(&MediaServiceConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            api_base_url: "https://api.example.com/".to_string(),
            delivery_base_url: "https://res.example.com".to_string(),
            image_folder: "images".to_string(),
            video_folder: "videos".to_string(),
            video_transformation: "q_auto,f_mp4".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_signature_matches_documented_example() {
        let p = params(&[
            ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
            ("public_id", "sample_image"),
            ("timestamp", "1315060510"),
        ]);
        assert_eq!(
            sign_params(&p, "abcd"),
            "bfd09f95f331f558cbd1320e67aa8d488770583e"
        );
    }

    #[test]
    fn test_signature_ignores_unsigned_params_and_order() {
        let p = params(&[
            ("transformation", "q_auto,f_mp4"),
            ("timestamp", "1700000000"),
            ("folder", "next-ai-cloudinary-sass-folder-video"),
            ("api_key", "key"),
            ("resource_type", "video"),
        ]);
        assert_eq!(
            sign_params(&p, "secret"),
            "a41fb5f333962273d48af1156d136eb022a2a0ef"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            client().endpoint(MediaKind::Video, "upload"),
            "https://api.example.com/v1_1/demo/video/upload"
        );
    }

    #[test]
    fn test_attachment_url() {
        let url = client().delivery_url(
            MediaKind::Video,
            "videos/abc123",
            &DeliveryOptions::attachment("Summer trip", "mp4"),
        );
        assert_eq!(
            url,
            "https://res.example.com/demo/video/upload/fl_attachment:Summer%20trip/videos/abc123.mp4"
        );
    }

    #[test]
    fn test_thumbnail_url() {
        let url = client().delivery_url(
            MediaKind::Video,
            "videos/abc123",
            &DeliveryOptions::thumbnail(),
        );
        assert_eq!(
            url,
            "https://res.example.com/demo/video/upload/so_0,w_400,h_225,c_fill/videos/abc123.jpg"
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("secret"));
    }
}
