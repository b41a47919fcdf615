// src/cache/mod.rs

//! Content-addressed cache for optimized image outputs.
//!
//! Keys are blake3 digests over the input bytes plus a settings tag, so a
//! change to either the file or the optimizer settings misses. The cache is
//! one explicit object shared by every task run in the process; the
//! file-backed store also keeps entries across runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use blake3::Hasher;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::types::CacheStorageMode;

/// Relative path (from the project root) of the persisted cache directory.
pub const CACHE_DIR_PATH: &str = ".assetpipe/cache";

/// Compute the cache key for `content` under the given settings tag.
pub fn content_key(content: &[u8], settings: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.update(b"\0");
    hasher.update(settings.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Abstract storage for cached outputs.
pub trait CacheStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Arc<Vec<u8>>>>;
    fn save(&self, key: &str, bytes: Arc<Vec<u8>>) -> Result<()>;
}

/// Stores outputs in memory only.
#[derive(Default)]
pub struct MemoryCacheStore {
    map: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &str) -> Result<Option<Arc<Vec<u8>>>> {
        let map = self
            .map
            .lock()
            .map_err(|_| anyhow::anyhow!("cache mutex poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: Arc<Vec<u8>>) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| anyhow::anyhow!("cache mutex poisoned"))?;
        map.insert(key.to_string(), bytes);
        Ok(())
    }
}

/// Stores outputs as one file per key under `<root>/.assetpipe/cache`.
pub struct FileCacheStore {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileCacheStore {
    pub fn new(root: &Path, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: root.join(CACHE_DIR_PATH),
            fs,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self, key: &str) -> Result<Option<Arc<Vec<u8>>>> {
        let path = self.entry_path(key);
        if !self.fs.is_file(&path) {
            return Ok(None);
        }
        Ok(Some(Arc::new(self.fs.read(&path)?)))
    }

    fn save(&self, key: &str, bytes: Arc<Vec<u8>>) -> Result<()> {
        self.fs.write(&self.entry_path(key), &bytes)
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub bytes: Arc<Vec<u8>>,
    /// True when the bytes came from the cache and no work was done.
    pub hit: bool,
}

/// Process-wide content cache with hit/miss counters.
pub struct ContentCache {
    store: Box<dyn CacheStore>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish_non_exhaustive()
    }
}

impl ContentCache {
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self {
            store,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryCacheStore::new()))
    }

    /// Build the cache for the configured storage mode.
    pub fn for_mode(mode: CacheStorageMode, root: &Path, fs: Arc<dyn FileSystem>) -> Self {
        match mode {
            CacheStorageMode::Memory => Self::in_memory(),
            CacheStorageMode::File => Self::new(Box::new(FileCacheStore::new(root, fs))),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Return the cached bytes for `key`, or compute, store and return them.
    ///
    /// A failing store is logged and treated as a miss; a failing `compute`
    /// is returned and nothing is stored.
    pub fn get_or_compute<F, E>(&self, key: &str, compute: F) -> std::result::Result<CacheLookup, E>
    where
        F: FnOnce() -> std::result::Result<Vec<u8>, E>,
    {
        match self.store.load(key) {
            Ok(Some(bytes)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache hit");
                return Ok(CacheLookup { bytes, hit: true });
            }
            Ok(None) => {}
            Err(err) => warn!(key = %key, error = %err, "failed to read cache entry; recomputing"),
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "cache miss");
        let bytes = Arc::new(compute()?);
        if let Err(err) = self.store.save(key, Arc::clone(&bytes)) {
            warn!(key = %key, error = %err, "failed to store cache entry");
        }
        Ok(CacheLookup { bytes, hit: false })
    }
}
