#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetpipe::cache::ContentCache;
use assetpipe::config::{PipelineConfig, RawConfigFile};
use assetpipe::fs::FileSystem;
use assetpipe::tasks::{Bundler, Pipeline};
use assetpipe::types::CacheStorageMode;

use crate::fake_bundler::FakeBundler;

/// Builder for `RawConfigFile` / `PipelineConfig` to simplify test setup.
///
/// Starts from the built-in defaults.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn scss_glob(mut self, pattern: &str) -> Self {
        self.config.paths.scss = pattern.to_string();
        self
    }

    pub fn js_glob(mut self, pattern: &str) -> Self {
        self.config.paths.js = pattern.to_string();
        self
    }

    pub fn images_glob(mut self, pattern: &str) -> Self {
        self.config.paths.images = pattern.to_string();
        self
    }

    pub fn css_out(mut self, dir: &str) -> Self {
        self.config.output.css = PathBuf::from(dir);
        self
    }

    pub fn js_out(mut self, dir: &str) -> Self {
        self.config.output.js = PathBuf::from(dir);
        self
    }

    pub fn images_out(mut self, dir: &str) -> Self {
        self.config.output.images = PathBuf::from(dir);
        self
    }

    pub fn entry(mut self, path: &str) -> Self {
        self.config.script.entry = PathBuf::from(path);
        self
    }

    pub fn cache_storage(mut self, mode: CacheStorageMode) -> Self {
        self.config.cache.storage = mode;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self, root: impl Into<PathBuf>) -> PipelineConfig {
        PipelineConfig::from_raw(root, self.config)
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a `Pipeline` with swappable filesystem and bundler.
///
/// Defaults: real filesystem, in-memory cache, a bundler that echoes a
/// fixed script.
pub struct PipelineBuilder {
    config: PipelineConfig,
    fs: Arc<dyn FileSystem>,
    cache: Option<Arc<ContentCache>>,
    bundler: Arc<dyn Bundler>,
}

impl PipelineBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            fs: Arc::new(assetpipe::fs::RealFileSystem),
            cache: None,
            bundler: Arc::new(FakeBundler::ok("var answer = 42; console.log(answer);")),
        }
    }

    /// Default config rooted at `root`.
    pub fn rooted(root: &Path) -> Self {
        Self::new(ConfigBuilder::new().build(root))
    }

    pub fn fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn bundler(mut self, bundler: Arc<dyn Bundler>) -> Self {
        self.bundler = bundler;
        self
    }

    pub fn build(self) -> Pipeline {
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(ContentCache::in_memory()));
        Pipeline::new(Arc::new(self.config), self.fs, cache, self.bundler)
    }
}
