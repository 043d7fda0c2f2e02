//! Common utilities for file upload handlers

use axum::extract::Multipart;
use bytes::{Bytes, BytesMut};
use optimedia_core::AppError;
use std::collections::HashMap;

use crate::error::HttpAppError;

/// Text fields are small; anything bigger is a malformed client
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: String,
}

/// Parsed multipart form: at most one file plus text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Read a multipart form, accepting the file under any of `file_fields`.
///
/// The file is streamed chunk by chunk and rejected as soon as it grows past
/// `max_file_size`. A second file field is rejected.
pub async fn read_upload_form(
    mut multipart: Multipart,
    file_fields: &[&str],
    max_file_size: usize,
) -> Result<UploadForm, HttpAppError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if file_fields.contains(&field_name.as_str()) {
            if form.file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one file".to_string(),
                )
                .into());
            }
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "upload".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let mut buffer = BytesMut::new();
            while let Some(chunk) = field.chunk().await? {
                validate_file_size(buffer.len() + chunk.len(), max_file_size)?;
                buffer.extend_from_slice(&chunk);
            }

            form.file = Some(UploadedFile {
                bytes: buffer.freeze(),
                filename,
                content_type,
            });
        } else if !field_name.is_empty() {
            let value = field.text().await?;
            if value.len() > MAX_TEXT_FIELD_BYTES {
                return Err(AppError::InvalidInput(format!(
                    "Form field '{}' is too large",
                    field_name
                ))
                .into());
            }
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Strip MIME parameters ("video/mp4; codecs=avc1" -> "video/mp4")
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validate content type against allowlist. Only the normalized MIME type is compared.
pub fn validate_content_type(content_type: &str, allowed_types: &[String]) -> Result<(), AppError> {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type. Allowed types: {}",
            allowed_types.join(", ")
        )));
    }
    Ok(())
}

/// Keep only the final path component and replace unusual characters.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Only ever a multipart filename, never a path; bare dots carry no name
    if sanitized.len() < 3 || sanitized.chars().all(|c| c == '.') {
        return "file".to_string();
    }

    sanitized
}

/// Parse the browser-reported size, ignoring anything that is not a non-negative integer
pub fn parse_reported_size(value: Option<&str>) -> Option<i64> {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v >= 0)
}
