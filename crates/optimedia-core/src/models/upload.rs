use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Text fields of the video upload form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VideoUploadForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    /// Size the browser reported before upload.
    pub original_size: Option<i64>,
    /// Owner email the browser claims; the session's email wins.
    pub created_by: Option<String>,
}

impl VideoUploadForm {
    /// Trims text fields and drops an empty description.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.created_by = self
            .created_by
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub public_id: String,
    /// Same value as `publicId`, under the key older clients read.
    pub public_id_of_uploaded_file_in_cloudinary: String,
    pub secure_url: String,
    pub bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
}
