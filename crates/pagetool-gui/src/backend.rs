use image::RgbaImage;
use pdf_thumbnails::{RenderBackend, Result, ThumbnailError};
use pdfium_render::prelude::*;
use std::path::Path;

/// Initialize Pdfium, trying the vendored library first, then falling back to system
pub fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    // Try to load from vendor directory (relative to workspace root)
    // When running from cargo, the working directory is the workspace root
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    if let Some(vendor_path) = vendor_path {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    // Fallback to system library or default search paths
    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Pdfium-backed page rasterizer. The library is bound per call; the binding
/// is not `Send`, and a fresh binding keeps the backend usable from the
/// worker task.
pub struct PdfiumBackend;

impl RenderBackend for PdfiumBackend {
    fn render(&self, source: &Path, page_index: usize, dpi: u32) -> Result<RgbaImage> {
        let pdfium = init_pdfium().map_err(|e| unreadable(source, &e))?;
        let document = pdfium
            .load_pdf_from_file(source, None)
            .map_err(|e| unreadable(source, &e))?;

        let pages = document.pages();
        let page_count = pages.len() as usize;
        if page_index >= page_count {
            return Err(ThumbnailError::PageNotFound {
                path: source.to_path_buf(),
                page_index,
                page_count,
            });
        }
        let page = pages
            .get(page_index as u16)
            .map_err(|e| unreadable(source, &e))?;

        // Page dimensions are in points (1/72 inch)
        let target_width = (page.width().value * dpi as f32 / 72.0).round().max(1.0) as i32;
        let config = PdfRenderConfig::new().set_target_width(target_width);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| unreadable(source, &e))?;

        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes().to_vec()).ok_or_else(|| {
            ThumbnailError::SourceUnreadable {
                path: source.to_path_buf(),
                reason: format!("bitmap buffer does not match {width}x{height}"),
            }
        })
    }
}

fn unreadable(source: &Path, e: &PdfiumError) -> ThumbnailError {
    ThumbnailError::SourceUnreadable {
        path: source.to_path_buf(),
        reason: e.to_string(),
    }
}
