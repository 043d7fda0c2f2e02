pub mod cloudinary;
pub mod media;
