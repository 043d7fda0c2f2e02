use axum_test::multipart::{MultipartForm, Part};

/// Not a playable file; the fake media service never decodes it.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len.max(12)];
    data[4..8].copy_from_slice(b"ftyp");
    data[8..12].copy_from_slice(b"isom");
    data
}

/// Minimal 1x1 PNG
pub fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

pub fn video_part(data: Vec<u8>) -> Part {
    Part::bytes(data).file_name("clip.mp4").mime_type("video/mp4")
}

/// Video form as the dashboard sends it
pub fn video_form(title: &str, data: Vec<u8>) -> MultipartForm {
    let size = data.len().to_string();
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("description", "Holiday footage")
        .add_text("originalSize", size)
        .add_part("file", video_part(data))
}

pub fn image_form(field: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        field.to_string(),
        Part::bytes(data).file_name("photo.png").mime_type("image/png"),
    )
}
