//! Thumbnail cache.
//!
//! Decoding and re-encoding every image on every run is the only expensive
//! part of a build. This module decides, per thumbnail, whether the file
//! already on disk can be kept.
//!
//! # Policies
//!
//! - [`CachePolicy::Exists`] (default): a thumbnail that exists is never
//!   regenerated, even if its source image changed since. Deleting the
//!   thumbnail (or passing `--no-cache`) is the only way to refresh it.
//!
//! - [`CachePolicy::Content`]: a thumbnail is kept only if it exists **and**
//!   the manifest records the same source hash and parameter hash it was
//!   built from. Editing an image, or changing the box size or quality,
//!   regenerates it.
//!
//! ## Cache keys (content policy)
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` and copies that
//!   reset modification times.
//! - **`params_hash`**: SHA-256 of (max width, max height, quality).
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<thumbs_dir>/.thumb-cache.json`, keyed by
//! thumbnail path relative to the thumbnails directory. A missing, corrupt,
//! or outdated manifest loads as empty, which just means a full rebuild.
//! Only entries for thumbnails that were kept or generated during the run
//! are written back, so images removed from a gallery drop out of the
//! manifest on the next build.

use crate::imaging::ThumbnailConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the thumbnails directory.
const MANIFEST_FILENAME: &str = ".thumb-cache.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// When an existing thumbnail counts as up to date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    /// Keep any thumbnail that exists on disk.
    #[default]
    Exists,
    /// Keep a thumbnail only if source contents and parameters are unchanged.
    Content,
}

/// A single cached thumbnail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest mapping thumbnail keys to their cache entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the thumbnails directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(thumbs_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(manifest_path(thumbs_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("ignoring unreadable thumbnail cache manifest: {e}");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the thumbnails directory.
    pub fn save(&self, thumbs_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(thumbs_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(thumbs_dir), json)
    }

    /// True if `key` was recorded with exactly these hashes.
    pub fn matches(&self, key: &str, source_hash: &str, params_hash: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.source_hash == source_hash && e.params_hash == params_hash)
    }

    /// Record a cache entry for a thumbnail.
    pub fn insert(&mut self, key: String, source_hash: String, params_hash: String) {
        self.entries.insert(
            key,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// Resolve the cache manifest path for a thumbnails directory.
pub fn manifest_path(thumbs_dir: &Path) -> PathBuf {
    thumbs_dir.join(MANIFEST_FILENAME)
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of thumbnail encoding parameters.
///
/// If the box size or quality changes, every thumbnail is re-generated
/// under the content policy.
pub fn hash_thumbnail_params(config: &ThumbnailConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"thumbnail\0");
    hasher.update(config.max_width.to_le_bytes());
    hasher.update(config.max_height.to_le_bytes());
    hasher.update(config.quality.value().to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The thumbnail on disk can be reused.
    Fresh,
    /// The thumbnail must be (re)generated. Under the content policy this
    /// carries the source hash to record once generation succeeds.
    Stale { source_hash: Option<String> },
}

/// Cache decisions for one thumbnails directory.
///
/// Lookups take `&self` so they can run from parallel workers; results are
/// recorded afterwards with [`ThumbnailCache::record`] and
/// [`ThumbnailCache::keep`].
#[derive(Debug)]
pub struct ThumbnailCache {
    policy: CachePolicy,
    force: bool,
    thumbs_dir: PathBuf,
    params_hash: String,
    manifest: CacheManifest,
    /// Manifest keys touched this run; everything else is pruned on save.
    seen: HashSet<String>,
}

impl ThumbnailCache {
    /// Open the cache for `thumbs_dir`.
    ///
    /// With `force` set every lookup reports stale; under the content policy
    /// the manifest starts empty and is rebuilt from this run.
    pub fn open(
        policy: CachePolicy,
        thumbs_dir: &Path,
        config: &ThumbnailConfig,
        force: bool,
    ) -> Self {
        let manifest = match policy {
            CachePolicy::Content if !force => CacheManifest::load(thumbs_dir),
            _ => CacheManifest::empty(),
        };
        Self {
            policy,
            force,
            thumbs_dir: thumbs_dir.to_path_buf(),
            params_hash: hash_thumbnail_params(config),
            manifest,
            seen: HashSet::new(),
        }
    }

    /// Decide whether the thumbnail of `source` at `thumbnail` is reusable.
    pub fn check(&self, source: &Path, thumbnail: &Path) -> Freshness {
        match self.policy {
            CachePolicy::Exists => {
                if !self.force && thumbnail.exists() {
                    Freshness::Fresh
                } else {
                    Freshness::Stale { source_hash: None }
                }
            }
            CachePolicy::Content => {
                // An unreadable source fails later in the backend with a
                // better error; here it just means "not cached".
                let source_hash = hash_file(source).ok();
                let fresh = !self.force
                    && thumbnail.exists()
                    && source_hash.as_deref().is_some_and(|h| {
                        self.manifest
                            .matches(&self.key(thumbnail), h, &self.params_hash)
                    });
                if fresh {
                    Freshness::Fresh
                } else {
                    Freshness::Stale { source_hash }
                }
            }
        }
    }

    /// Record a freshly generated thumbnail.
    pub fn record(&mut self, thumbnail: &Path, source_hash: String) {
        if self.policy == CachePolicy::Content {
            let key = self.key(thumbnail);
            self.seen.insert(key.clone());
            self.manifest
                .insert(key, source_hash, self.params_hash.clone());
        }
    }

    /// Mark a reused thumbnail so its entry survives [`ThumbnailCache::save`].
    pub fn keep(&mut self, thumbnail: &Path) {
        if self.policy == CachePolicy::Content {
            let key = self.key(thumbnail);
            self.seen.insert(key);
        }
    }

    /// Persist the entries kept or recorded this run. A no-op under the
    /// exists policy.
    pub fn save(&self) -> io::Result<()> {
        match self.policy {
            CachePolicy::Exists => Ok(()),
            CachePolicy::Content => {
                let mut manifest = self.manifest.clone();
                manifest.entries.retain(|key, _| self.seen.contains(key));
                manifest.save(&self.thumbs_dir)
            }
        }
    }

    /// Manifest key: thumbnail path relative to the thumbnails directory.
    fn key(&self, thumbnail: &Path) -> String {
        let relative = thumbnail.strip_prefix(&self.thumbs_dir).unwrap_or(thumbnail);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Summary of thumbnail work for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub cached: u32,
    pub generated: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.cached += 1;
    }

    pub fn generate(&mut self) {
        self.generated += 1;
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn add(&mut self, other: CacheStats) {
        self.cached += other.cached;
        self.generated += other.generated;
        self.failed += other.failed;
    }

    pub fn total(&self) -> u32 {
        self.cached + self.generated + self.failed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cached > 0 {
            write!(f, "{} cached, {} generated", self.cached, self.generated)?;
        } else {
            write!(f, "{} generated", self.generated)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        if self.cached > 0 || self.failed > 0 {
            write!(f, " ({} total)", self.total())?;
        }
        Ok(())
    }
}
