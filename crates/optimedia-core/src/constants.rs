//! Defaults shared by configuration and handlers.

pub const DEFAULT_IMAGE_FOLDER: &str = "next-ai-cloudinary-sass-folder-image";
pub const DEFAULT_VIDEO_FOLDER: &str = "next-ai-cloudinary-sass-folder-video";

/// Incoming transformation applied to every uploaded video (auto quality, mp4 container).
pub const DEFAULT_VIDEO_TRANSFORMATION: &str = "q_auto,f_mp4";

pub const DEFAULT_MEDIA_API_BASE_URL: &str = "https://api.cloudinary.com";
pub const DEFAULT_MEDIA_DELIVERY_BASE_URL: &str = "https://res.cloudinary.com";

/// Cookie the auth provider sets for browser sessions.
pub const SESSION_COOKIE_NAME: &str = "__session";

pub const UNAUTHORIZED_MESSAGE: &str = "You are unauthorized to access this route.";
pub const NO_FILE_MESSAGE: &str = "No file uploaded or no file found.";
