/// Scalar user preferences consumed by the core.
///
/// The core only reads these values; where they live on disk and in what
/// format is the embedding application's concern.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Preferences {
    /// Thumbnail edge length in pixels.
    pub thumbnail_size: u32,
    /// DPI for full-quality preview rendering. Thumbnails always rasterize
    /// at the cache's fixed base DPI, not this.
    pub thumbnail_dpi: u32,
    /// Byte budget for the thumbnail cache, in megabytes.
    pub cache_size_mb: u32,
    /// Worker threads for batch jobs.
    pub thread_count: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            thumbnail_size: 160,
            thumbnail_dpi: 150,
            cache_size_mb: 200,
            thread_count: 4,
        }
    }
}

impl Preferences {
    pub fn cache_budget_bytes(&self) -> u64 {
        u64::from(self.cache_size_mb) * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let prefs = Preferences::default();
        assert_eq!(prefs.thumbnail_size, 160);
        assert_eq!(prefs.thumbnail_dpi, 150);
        assert_eq!(prefs.cache_size_mb, 200);
        assert_eq!(prefs.thread_count, 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: Preferences = serde_json::from_str("{\"thumbnail_size\": 96}").unwrap();
        assert_eq!(prefs.thumbnail_size, 96);
        assert_eq!(prefs.thumbnail_dpi, 150);
    }
}
