use serde::Deserialize;

/// Where the image optimization cache keeps its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStorageMode {
    /// Store optimized outputs under `.assetpipe/cache` (survives restarts).
    File,
    /// Store optimized outputs in memory only (lost on exit).
    Memory,
}

impl Default for CacheStorageMode {
    fn default() -> Self {
        CacheStorageMode::Memory
    }
}

/// Alternate raster format produced by the variant tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantFormat {
    Webp,
    Avif,
}

impl VariantFormat {
    /// File extension (without dot) written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            VariantFormat::Webp => "webp",
            VariantFormat::Avif => "avif",
        }
    }
}
