use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("rasterization capability unavailable")]
    CapabilityUnavailable,
    #[error("page {page_index} not found in {path} ({page_count} pages)")]
    PageNotFound {
        path: PathBuf,
        page_index: usize,
        page_count: usize,
    },
    #[error("source not readable: {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ThumbnailError>;

/// Rasterization capability: turn one page of one source into an RGBA
/// bitmap at the given DPI.
///
/// Implementations live with the embedding application (the GUI binds
/// pdfium); the cache only needs this seam, so the capability can be absent
/// at runtime and everything downstream degrades to
/// [`ThumbnailError::CapabilityUnavailable`].
pub trait RenderBackend: Send {
    fn render(&self, source: &Path, page_index: usize, dpi: u32) -> Result<RgbaImage>;
}
