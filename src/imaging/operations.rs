//! High-level image operations.
//!
//! These functions turn configuration into backend parameters and call the
//! backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, ThumbnailParams};
use crate::config::ThumbnailsConfig;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl ThumbnailConfig {
    pub fn from_settings(settings: &ThumbnailsConfig) -> Self {
        Self {
            max_width: settings.max_width,
            max_height: settings.max_height,
            quality: Quality::new(settings.quality),
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self::from_settings(&ThumbnailsConfig::default())
    }
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        max_width: config.max_width,
        max_height: config.max_height,
        quality: config.quality,
    }
}

/// Create a thumbnail of `source` at `output`.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &ThumbnailConfig,
) -> Result<Dimensions> {
    backend.thumbnail(&plan_thumbnail(source, output, config))
}
