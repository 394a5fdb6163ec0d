//! Gallery configuration.
//!
//! Every path and tuning knob of a build lives in [`GalleryConfig`], which is
//! passed explicitly into the pipeline. Nothing is read from module-level
//! constants, so a process can build several galleries with different
//! settings, and tests can point a build at a temporary directory.
//!
//! ## Config File
//!
//! The config file (default `thumbgal.toml` in the working directory) is
//! optional. When present it is merged on top of the stock defaults, so it
//! only needs the keys it wants to change:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! gallery_root = "galleryRoot"   # One sub-directory per gallery
//! thumbs_dir = "thumbs"          # Where thumbnails are written
//! output_dir = "."               # Where the HTML pages are written
//! template = "template.html"     # Shared page template
//! index_title = "Gallery Albums" # Title of index.html
//!
//! [thumbnails]
//! max_width = 150                # Bounding box; aspect ratio is preserved
//! max_height = 150
//! quality = 77                   # JPEG quality (1-100)
//! naming = "namespaced"          # "namespaced" or "flat"
//! cache = "exists"               # "exists" or "content"
//!
//! [processing]
//! max_processes = 4              # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::cache::CachePolicy;
use crate::naming::ThumbnailNaming;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "thumbgal.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete configuration for one gallery build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Directory whose immediate sub-directories are the galleries.
    pub gallery_root: PathBuf,
    /// Directory thumbnails are written to (created on demand).
    pub thumbs_dir: PathBuf,
    /// Directory the gallery pages and `index.html` are written to.
    pub output_dir: PathBuf,
    /// HTML template shared by every page.
    pub template: PathBuf,
    /// Title of the index page.
    pub index_title: String,
    /// Thumbnail size, quality, naming and caching.
    pub thumbnails: ThumbnailsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            gallery_root: PathBuf::from("galleryRoot"),
            thumbs_dir: PathBuf::from("thumbs"),
            output_dir: PathBuf::from("."),
            template: PathBuf::from("template.html"),
            index_title: "Gallery Albums".to_string(),
            thumbnails: ThumbnailsConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Defaults with every path rooted at `base`.
    ///
    /// Handy for tests and for embedding a build in another program.
    pub fn rooted_at(base: &Path) -> Self {
        let defaults = Self::default();
        Self {
            gallery_root: base.join(&defaults.gallery_root),
            thumbs_dir: base.join(&defaults.thumbs_dir),
            output_dir: base.to_path_buf(),
            template: base.join(&defaults.template),
            ..defaults
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.max_width == 0 || self.thumbnails.max_height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_width and thumbnails.max_height must be non-zero".into(),
            ));
        }
        if self.index_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "index_title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Bounding box width in pixels.
    pub max_width: u32,
    /// Bounding box height in pixels.
    pub max_height: u32,
    /// Lossy encoding quality (1-100). Only JPEG output is lossy.
    pub quality: u32,
    /// How thumbnail filenames are derived from source images.
    pub naming: ThumbnailNaming,
    /// When an existing thumbnail is considered up to date.
    pub cache: CachePolicy,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            max_width: 150,
            max_height: 150,
            quality: 77,
            naming: ThumbnailNaming::default(),
            cache: CachePolicy::default(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel thumbnail workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`.
///
/// A missing file yields the stock defaults; a file that exists but does not
/// parse or validate is an error.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    let overlay = if path.exists() {
        let content = fs::read_to_string(path)?;
        Some(toml::from_str::<toml::Value>(&content)?)
    } else {
        None
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file with every key.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumbgal configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Directory whose immediate sub-directories are the galleries.
# Images nested deeper than one level are ignored.
gallery_root = "galleryRoot"

# Directory thumbnails are written to. Created if missing.
thumbs_dir = "thumbs"

# Directory the gallery pages (<gallery>.html) and index.html are written to.
output_dir = "."

# HTML template shared by every page. Placeholders:
#   {title} {thumbnails} {total_images} {gallery_size} {last_updated}
# Run `thumbgal gen-template` for a starting point.
template = "template.html"

# Title of index.html.
index_title = "Gallery Albums"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Bounding box in pixels. Images are shrunk to fit, never enlarged.
max_width = 150
max_height = 150

# JPEG encoding quality (1 = worst, 100 = best). PNG and WebP are lossless.
quality = 77

# "namespaced": thumbs/<gallery>/<name>_thumb.<ext>
# "flat":       thumbs/<name>_thumb.<ext> (same filename in two galleries collides)
naming = "namespaced"

# "exists":  keep any thumbnail that is already on disk
# "content": regenerate when the source image or thumbnail settings change
cache = "exists"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel thumbnail workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
