//! Thumbnail materialization.
//!
//! Stage 2 of the build. For every image of a gallery, derives the thumbnail
//! path, asks the [cache](crate::cache) whether the file on disk is usable,
//! and generates it through the [`ImageBackend`] when it is not.
//!
//! ## Failure policy
//!
//! A single image that cannot be decoded, resized or written is logged and
//! reported as [`ThumbnailStatus::Failed`]; the rest of the gallery (and the
//! run) carries on. Only failing to create the thumbnails directory itself
//! is an error, since no thumbnail could be written after that.
//!
//! ## Parallel Processing
//!
//! Images within a gallery are processed in parallel using
//! [rayon](https://docs.rs/rayon). Each image writes its own thumbnail path
//! and outcomes are collected in input order, so the page markup and the
//! progress output are the same as a sequential run. Galleries are processed
//! one after another.

use crate::cache::{CacheStats, Freshness, ThumbnailCache};
use crate::config::GalleryConfig;
use crate::imaging::{ImageBackend, ThumbnailConfig, create_thumbnail};
use crate::naming::ThumbnailNaming;
use crate::scan::Gallery;
use rayon::prelude::*;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Cannot create thumbnail directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where and how thumbnails are produced.
#[derive(Debug, Clone)]
pub struct ThumbnailPlan {
    pub thumbs_dir: PathBuf,
    pub naming: ThumbnailNaming,
    pub config: ThumbnailConfig,
}

impl ThumbnailPlan {
    pub fn from_config(config: &GalleryConfig) -> Self {
        Self {
            thumbs_dir: config.thumbs_dir.clone(),
            naming: config.thumbnails.naming,
            config: ThumbnailConfig::from_settings(&config.thumbnails),
        }
    }

    /// Thumbnail path for an image of `gallery`.
    pub fn thumbnail_path(&self, gallery: &str, filename: impl AsRef<OsStr>) -> PathBuf {
        self.naming
            .thumbnail_path(&self.thumbs_dir, gallery, filename)
    }
}

/// What happened to one image's thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailStatus {
    Cached,
    Generated,
    Failed(String),
}

/// Result for a single image.
#[derive(Debug, Clone)]
pub struct ThumbnailOutcome {
    pub filename: String,
    /// Path to the original image.
    pub source: PathBuf,
    pub thumbnail: PathBuf,
    pub status: ThumbnailStatus,
}

impl ThumbnailOutcome {
    /// True when a usable thumbnail is on disk.
    pub fn is_ok(&self) -> bool {
        !matches!(self.status, ThumbnailStatus::Failed(_))
    }
}

/// Thumbnails of one gallery, in gallery (newest-first) order.
#[derive(Debug)]
pub struct GalleryThumbnails {
    pub gallery: String,
    pub outcomes: Vec<ThumbnailOutcome>,
    pub stats: CacheStats,
}

impl GalleryThumbnails {
    /// Outcomes with a usable thumbnail, in order.
    pub fn succeeded(&self) -> impl Iterator<Item = &ThumbnailOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }
}

/// Progress event sent while thumbnails are produced.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    GalleryStarted {
        name: String,
        image_count: usize,
    },
    ImageProcessed {
        /// 1-based position in the gallery.
        index: usize,
        filename: String,
        status: ThumbnailStatus,
    },
}

/// Materialize the thumbnails of one gallery.
pub fn materialize_gallery(
    backend: &impl ImageBackend,
    gallery: &Gallery,
    plan: &ThumbnailPlan,
    cache: &mut ThumbnailCache,
    progress: Option<&Sender<ProcessEvent>>,
) -> Result<GalleryThumbnails, ProcessError> {
    let mut result = GalleryThumbnails {
        gallery: gallery.name.clone(),
        outcomes: Vec::with_capacity(gallery.images.len()),
        stats: CacheStats::default(),
    };
    let Some(first) = gallery.images.first() else {
        return Ok(result);
    };

    if let Some(progress) = progress {
        let _ = progress.send(ProcessEvent::GalleryStarted {
            name: gallery.name.clone(),
            image_count: gallery.images.len(),
        });
    }

    let target_dir = plan
        .thumbnail_path(&gallery.name, first.file_name())
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| plan.thumbs_dir.clone());
    std::fs::create_dir_all(&target_dir).map_err(|source| ProcessError::CreateDir {
        path: target_dir.clone(),
        source,
    })?;

    let shared_cache: &ThumbnailCache = cache;
    let produced: Vec<(ThumbnailOutcome, Option<String>)> = gallery
        .images
        .par_iter()
        .map(|image| {
            let source = image.path.clone();
            let thumbnail = plan.thumbnail_path(&gallery.name, image.file_name());

            let (status, source_hash) = match shared_cache.check(&source, &thumbnail) {
                Freshness::Fresh => {
                    tracing::debug!(thumbnail = %thumbnail.display(), "thumbnail up to date");
                    (ThumbnailStatus::Cached, None)
                }
                Freshness::Stale { source_hash } => {
                    match create_thumbnail(backend, &source, &thumbnail, &plan.config) {
                        Ok(dims) => {
                            tracing::debug!(
                                thumbnail = %thumbnail.display(),
                                width = dims.width,
                                height = dims.height,
                                "thumbnail generated"
                            );
                            (ThumbnailStatus::Generated, source_hash)
                        }
                        Err(e) => {
                            tracing::warn!(
                                image = %source.display(),
                                error = %e,
                                "skipping image: thumbnail could not be created"
                            );
                            (ThumbnailStatus::Failed(e.to_string()), None)
                        }
                    }
                }
            };

            let outcome = ThumbnailOutcome {
                filename: image.filename.clone(),
                source,
                thumbnail,
                status,
            };
            (outcome, source_hash)
        })
        .collect();

    for (index, (outcome, source_hash)) in produced.into_iter().enumerate() {
        match &outcome.status {
            ThumbnailStatus::Cached => {
                result.stats.hit();
                cache.keep(&outcome.thumbnail);
            }
            ThumbnailStatus::Generated => {
                result.stats.generate();
                if let Some(hash) = source_hash {
                    cache.record(&outcome.thumbnail, hash);
                }
            }
            ThumbnailStatus::Failed(_) => result.stats.fail(),
        }
        if let Some(progress) = progress {
            let _ = progress.send(ProcessEvent::ImageProcessed {
                index: index + 1,
                filename: outcome.filename.clone(),
                status: outcome.status.clone(),
            });
        }
        result.outcomes.push(outcome);
    }

    Ok(result)
}
