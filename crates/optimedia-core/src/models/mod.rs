pub mod media;
pub mod upload;
pub mod video;

pub use media::*;
pub use upload::*;
pub use video::*;
