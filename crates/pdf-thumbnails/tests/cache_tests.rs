use image::{Rgba, RgbaImage};
use pdf_pages::{PageRef, Rotation};
use pdf_thumbnails::{DEFAULT_BASE_DPI, RenderBackend, Result, ThumbnailCache, ThumbnailError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Deterministic backend: a solid color derived from the page index, page
/// count fixed at construction, render invocations counted.
struct FakeBackend {
    page_count: usize,
    renders: Arc<AtomicUsize>,
}

impl FakeBackend {
    fn new(page_count: usize) -> (Self, Arc<AtomicUsize>) {
        let renders = Arc::new(AtomicUsize::new(0));
        (
            Self {
                page_count,
                renders: renders.clone(),
            },
            renders,
        )
    }
}

impl RenderBackend for FakeBackend {
    fn render(&self, source: &Path, page_index: usize, _dpi: u32) -> Result<RgbaImage> {
        if !source.exists() {
            return Err(ThumbnailError::SourceUnreadable {
                path: source.to_owned(),
                reason: "no such file".to_string(),
            });
        }
        if page_index >= self.page_count {
            return Err(ThumbnailError::PageNotFound {
                path: source.to_owned(),
                page_index,
                page_count: self.page_count,
            });
        }
        self.renders.fetch_add(1, Ordering::SeqCst);
        let shade = (page_index * 40) as u8;
        Ok(RgbaImage::from_pixel(
            400,
            600,
            Rgba([shade, shade, 255, 255]),
        ))
    }
}

fn fake_source(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("doc.pdf");
    std::fs::write(&path, b"%PDF-1.7 stub").unwrap();
    path
}

fn cache_with(page_count: usize, max_bytes: u64) -> (ThumbnailCache, Arc<AtomicUsize>) {
    let (backend, renders) = FakeBackend::new(page_count);
    let cache = ThumbnailCache::new(Box::new(backend), 100, max_bytes).unwrap();
    (cache, renders)
}

#[test]
fn test_second_read_is_a_cache_hit() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, renders) = cache_with(3, 64 * 1024 * 1024);

    let page = PageRef::new(&source, 0);
    let first = cache.get_or_render(&page, (160, 220)).unwrap();
    let second = cache.get_or_render(&page, (160, 220)).unwrap();

    assert_eq!(first, second);
    assert!(first.exists());
    assert_eq!(renders.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rotation_change_forces_fresh_artifact() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, renders) = cache_with(3, 64 * 1024 * 1024);

    let page = PageRef::new(&source, 1);
    let before = cache.get_or_render(&page, (160, 220)).unwrap();

    // Rotation changed: invalidate the logical page, then re-read.
    cache.invalidate(&page.id);
    assert!(!before.exists(), "stale artifact must not linger on disk");

    let rotated = page.clone().with_rotation(Rotation::Clockwise90);
    let after = cache.get_or_render(&rotated, (160, 220)).unwrap();

    assert_ne!(before, after);
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

#[test]
fn test_rotated_artifact_swaps_dimensions() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, _) = cache_with(3, 64 * 1024 * 1024);

    // Target box larger than the 400x600 render, so no downscaling happens
    // and the rotation's frame expansion is directly observable.
    let page = PageRef::new(&source, 0).with_rotation(Rotation::Clockwise90);
    let path = cache.get_or_render(&page, (1000, 1000)).unwrap();

    assert_eq!(image::image_dimensions(&path).unwrap(), (600, 400));
}

#[test]
fn test_downsample_fits_target_box() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, _) = cache_with(3, 64 * 1024 * 1024);

    let page = PageRef::new(&source, 0);
    let path = cache.get_or_render(&page, (160, 220)).unwrap();

    let (width, height) = image::image_dimensions(&path).unwrap();
    assert!(width <= 160);
    assert!(height <= 220);
    // Aspect ratio of the 400x600 source is preserved.
    assert_eq!((width, height), (147, 220));
}

#[test]
fn test_distinct_sizes_are_distinct_keys() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, renders) = cache_with(3, 64 * 1024 * 1024);

    let page = PageRef::new(&source, 0);
    let small = cache.get_or_render(&page, (80, 110)).unwrap();
    let large = cache.get_or_render(&page, (160, 220)).unwrap();

    assert_ne!(small, large);
    assert_eq!(renders.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_without_backend_reports_capability_unavailable() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let mut cache = ThumbnailCache::without_backend(64 * 1024 * 1024).unwrap();
    assert!(!cache.has_backend());

    let result = cache.get_or_render(&PageRef::new(&source, 0), (160, 220));
    assert!(matches!(result, Err(ThumbnailError::CapabilityUnavailable)));
}

#[test]
fn test_page_not_found_propagates() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, _) = cache_with(2, 64 * 1024 * 1024);

    let result = cache.get_or_render(&PageRef::new(&source, 5), (160, 220));
    assert!(matches!(
        result,
        Err(ThumbnailError::PageNotFound { page_index: 5, .. })
    ));
}

#[test]
fn test_missing_source_propagates() {
    let dir = TempDir::new().unwrap();
    let (mut cache, _) = cache_with(2, 64 * 1024 * 1024);

    let missing = dir.path().join("gone.pdf");
    let result = cache.get_or_render(&PageRef::new(&missing, 0), (160, 220));
    assert!(matches!(
        result,
        Err(ThumbnailError::SourceUnreadable { .. })
    ));
}

#[test]
fn test_eviction_respects_byte_budget() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    // Budget of one byte: only the most recent artifact survives.
    let (mut cache, _) = cache_with(4, 1);

    let first = cache.get_or_render(&PageRef::new(&source, 0), (160, 220)).unwrap();
    let second = cache.get_or_render(&PageRef::new(&source, 1), (160, 220)).unwrap();

    assert_eq!(cache.len(), 1);
    assert!(!first.exists());
    assert!(second.exists());
}

#[test]
fn test_renders_at_construction_dpi() {
    struct RecordingBackend(Arc<AtomicUsize>);
    impl RenderBackend for RecordingBackend {
        fn render(&self, _source: &Path, _page_index: usize, dpi: u32) -> Result<RgbaImage> {
            self.0.store(dpi as usize, Ordering::SeqCst);
            Ok(RgbaImage::from_pixel(400, 600, Rgba([0, 0, 0, 255])))
        }
    }

    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let seen = Arc::new(AtomicUsize::new(0));
    let mut cache = ThumbnailCache::new(
        Box::new(RecordingBackend(seen.clone())),
        DEFAULT_BASE_DPI,
        64 * 1024 * 1024,
    )
    .unwrap();

    cache
        .get_or_render(&PageRef::new(&source, 0), (160, 220))
        .unwrap();
    assert_eq!(seen.load(Ordering::SeqCst) as u32, DEFAULT_BASE_DPI);
    assert_eq!(DEFAULT_BASE_DPI, 100);
}

#[test]
fn test_lookup_any_ignores_rotation_and_size() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, _) = cache_with(3, 64 * 1024 * 1024);

    let page = PageRef::new(&source, 2).with_rotation(Rotation::Clockwise180);
    let rendered = cache.get_or_render(&page, (160, 220)).unwrap();

    let found = cache.lookup_any(&page.id);
    assert_eq!(found, Some(rendered));
    assert_eq!(cache.lookup_any(&PageRef::new(&source, 0).id), None);
}

#[test]
fn test_invalidate_all_clears_storage() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, _) = cache_with(3, 64 * 1024 * 1024);

    let a = cache.get_or_render(&PageRef::new(&source, 0), (160, 220)).unwrap();
    let b = cache.get_or_render(&PageRef::new(&source, 1), (160, 220)).unwrap();

    cache.invalidate_all();
    assert!(cache.is_empty());
    assert!(!a.exists());
    assert!(!b.exists());
}

#[test]
fn test_shutdown_removes_temp_storage() {
    let dir = TempDir::new().unwrap();
    let source = fake_source(&dir);
    let (mut cache, _) = cache_with(3, 64 * 1024 * 1024);

    let artifact = cache.get_or_render(&PageRef::new(&source, 0), (160, 220)).unwrap();
    let storage_dir = artifact.parent().unwrap().to_owned();

    cache.shutdown();
    assert!(!storage_dir.exists());
}
