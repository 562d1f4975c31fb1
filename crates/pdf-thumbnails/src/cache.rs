//! Keyed thumbnail artifacts with LRU eviction.
//!
//! The cache owns a process-scoped temporary directory; every rendered
//! artifact lives there as a PNG named deterministically from its key. A
//! key embeds the page identity, its rotation and the target size, so a
//! rotation change simply misses the cache; `invalidate` additionally
//! deletes every artifact for a logical page so stale frames are never
//! served from disk either.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::time::SystemTime;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use pdf_pages::{PageId, PageRef, Rotation};
use tempfile::TempDir;

use crate::render::{RenderBackend, Result, ThumbnailError};

/// DPI used for thumbnail rasterization when nothing else is configured.
pub const DEFAULT_BASE_DPI: u32 = 100;

/// Cache key: logical identity plus everything that affects the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbKey {
    pub page: PageId,
    pub rotation: Rotation,
    pub width: u32,
    pub height: u32,
}

struct Entry {
    path: PathBuf,
    bytes: u64,
    created: SystemTime,
}

pub struct ThumbnailCache {
    backend: Option<Box<dyn RenderBackend>>,
    temp_dir: TempDir,
    base_dpi: u32,
    max_bytes: u64,
    total_bytes: u64,
    entries: HashMap<ThumbKey, Entry>,
    lru: VecDeque<ThumbKey>,
}

impl ThumbnailCache {
    pub fn new(backend: Box<dyn RenderBackend>, base_dpi: u32, max_bytes: u64) -> Result<Self> {
        Self::build(Some(backend), base_dpi, max_bytes)
    }

    /// A cache with no rasterization capability: lookups still work against
    /// previously rendered artifacts, but misses fail with
    /// `CapabilityUnavailable` instead of rendering.
    pub fn without_backend(max_bytes: u64) -> Result<Self> {
        Self::build(None, DEFAULT_BASE_DPI, max_bytes)
    }

    fn build(
        backend: Option<Box<dyn RenderBackend>>,
        base_dpi: u32,
        max_bytes: u64,
    ) -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("pdf-pagetool-").tempdir()?;
        Ok(Self {
            backend,
            temp_dir,
            base_dpi,
            max_bytes,
            total_bytes: 0,
            entries: HashMap::new(),
            lru: VecDeque::new(),
        })
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_budget(&mut self, max_bytes: u64) {
        self.max_bytes = max_bytes;
        self.evict_over_budget();
    }

    /// Return the cached artifact for the page's current state, rendering
    /// it if necessary.
    pub fn get_or_render(&mut self, page: &PageRef, target: (u32, u32)) -> Result<PathBuf> {
        let key = ThumbKey {
            page: page.id.clone(),
            rotation: page.rotation,
            width: target.0,
            height: target.1,
        };

        if let Some(entry) = self.entries.get(&key) {
            if entry.path.exists() {
                let path = entry.path.clone();
                self.touch(&key);
                return Ok(path);
            }
            // Artifact vanished from disk; drop the stale entry and re-render.
            self.remove_entry(&key);
        }

        let (path, bytes) = self.render_to_disk(page, &key)?;
        self.total_bytes += bytes;
        self.entries.insert(
            key.clone(),
            Entry {
                path: path.clone(),
                bytes,
                created: SystemTime::now(),
            },
        );
        self.lru.push_back(key);
        self.evict_over_budget();
        Ok(path)
    }

    /// Best-effort lookup of any artifact for a logical page, ignoring
    /// rotation and size. Used as a fallback when resolving a drop payload
    /// whose exact-state artifact is not cached yet.
    pub fn lookup_any(&self, id: &PageId) -> Option<PathBuf> {
        self.entries
            .iter()
            .filter(|(key, _)| key.page == *id)
            .max_by_key(|(_, entry)| entry.created)
            .map(|(_, entry)| entry.path.clone())
    }

    /// Remove every entry for a logical page, whatever rotation or size its
    /// keys embed. Called after a rotation change.
    pub fn invalidate(&mut self, id: &PageId) {
        let keys: Vec<ThumbKey> = self
            .entries
            .keys()
            .filter(|key| key.page == *id)
            .cloned()
            .collect();
        for key in keys {
            self.remove_entry(&key);
        }
    }

    /// Drop everything, e.g. after a global thumbnail-size change.
    pub fn invalidate_all(&mut self) {
        let keys: Vec<ThumbKey> = self.entries.keys().cloned().collect();
        for key in keys {
            self.remove_entry(&key);
        }
    }

    /// Delete the temporary storage. Cleanup failure is logged, never
    /// propagated; dropping the cache is the process-exit fallback.
    pub fn shutdown(self) {
        if let Err(e) = self.temp_dir.close() {
            log::warn!("failed to clean up thumbnail storage: {e}");
        }
    }

    fn render_to_disk(&self, page: &PageRef, key: &ThumbKey) -> Result<(PathBuf, u64)> {
        let backend = self
            .backend
            .as_ref()
            .ok_or(ThumbnailError::CapabilityUnavailable)?;

        let rendered = backend.render(&page.id.source, page.id.page_index, self.base_dpi)?;
        let rotated = rotate_image(rendered, page.rotation);
        let thumb = fit_within(rotated, key.width, key.height);

        let path = self.temp_dir.path().join(artifact_name(key));
        thumb.save(&path)?;
        let bytes = std::fs::metadata(&path)?.len();
        Ok((path, bytes))
    }

    fn touch(&mut self, key: &ThumbKey) {
        self.lru.retain(|k| k != key);
        self.lru.push_back(key.clone());
    }

    fn remove_entry(&mut self, key: &ThumbKey) {
        if let Some(entry) = self.entries.remove(key) {
            self.total_bytes = self.total_bytes.saturating_sub(entry.bytes);
            self.lru.retain(|k| k != key);
            if let Err(e) = std::fs::remove_file(&entry.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("failed to remove thumbnail {}: {e}", entry.path.display());
                }
            }
        }
    }

    fn evict_over_budget(&mut self) {
        while self.total_bytes > self.max_bytes && self.lru.len() > 1 {
            if let Some(key) = self.lru.front().cloned() {
                self.remove_entry(&key);
            } else {
                break;
            }
        }
    }
}

/// Deterministic artifact name from source stem and page number, qualified
/// by the state baked into the pixels.
fn artifact_name(key: &ThumbKey) -> String {
    format!(
        "thumb_{}_p{}_r{}_{}x{}.png",
        key.page.source_stem(),
        key.page.page_index + 1,
        key.rotation.degrees(),
        key.width,
        key.height,
    )
}

fn rotate_image(image: RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::None => image,
        Rotation::Clockwise90 => imageops::rotate90(&image),
        Rotation::Clockwise180 => imageops::rotate180(&image),
        Rotation::Clockwise270 => imageops::rotate270(&image),
    }
}

/// Downscale to fit within the target box, preserving aspect ratio. Never
/// upscales.
fn fit_within(image: RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 || max_width == 0 || max_height == 0 {
        return image;
    }
    let scale = (max_width as f32 / w as f32).min(max_height as f32 / h as f32);
    if scale >= 1.0 {
        return image;
    }
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    imageops::resize(&image, new_w, new_h, FilterType::Lanczos3)
}
