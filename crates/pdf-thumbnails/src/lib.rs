mod cache;
mod render;

pub use cache::{DEFAULT_BASE_DPI, ThumbKey, ThumbnailCache};
pub use render::{RenderBackend, Result, ThumbnailError};
