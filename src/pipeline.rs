//! Build orchestration: scan → thumbnails → pages.
//!
//! One [`build`] call is one full pass over the gallery root. Galleries are
//! handled one at a time: thumbnails first, then the gallery page. The index
//! page is written last, once every gallery has been seen.
//!
//! The template is loaded before anything else so a missing template fails
//! the run before a single thumbnail is touched.

use crate::cache::{CacheStats, ThumbnailCache};
use crate::config::{ConfigError, GalleryConfig};
use crate::imaging::{ImageBackend, RustBackend};
use crate::process::{ProcessError, ProcessEvent, ThumbnailPlan, materialize_gallery};
use crate::render::{
    IndexEntry, PageRenderer, RenderError, RenderedPage, Template, format_timestamp,
};
use crate::scan::{Manifest, ScanError, scan};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Regenerate every thumbnail regardless of the cache.
    pub no_cache: bool,
}

/// A page written by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub title: String,
    pub path: PathBuf,
    pub tiles: usize,
    pub image_count: usize,
    pub size_bytes: u64,
}

impl From<&RenderedPage> for PageSummary {
    fn from(page: &RenderedPage) -> Self {
        Self {
            title: page.title.clone(),
            path: page.path.clone(),
            tiles: page.tiles,
            image_count: page.image_count,
            size_bytes: page.size_bytes,
        }
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Gallery pages in gallery order, then the index.
    pub pages: Vec<PageSummary>,
    pub stats: CacheStats,
}

impl BuildReport {
    pub fn index(&self) -> Option<&PageSummary> {
        self.pages.last()
    }

    pub fn gallery_pages(&self) -> &[PageSummary] {
        match self.pages.split_last() {
            Some((_, galleries)) => galleries,
            None => &[],
        }
    }
}

/// Run a full build with the `image`-crate backend, stamped with the
/// current local time.
pub fn build(
    config: &GalleryConfig,
    options: BuildOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BuildReport, BuildError> {
    let last_updated = format_timestamp(&Local::now());
    build_with_backend(&RustBackend::new(), config, options, last_updated, progress)
}

/// Run a full build through `backend`.
///
/// `last_updated` is the timestamp shown on every page of this run.
pub fn build_with_backend(
    backend: &impl ImageBackend,
    config: &GalleryConfig,
    options: BuildOptions,
    last_updated: String,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BuildReport, BuildError> {
    let template = Template::load(&config.template)?;
    let manifest = scan(&config.gallery_root)?;
    tracing::info!(
        root = %config.gallery_root.display(),
        galleries = manifest.galleries.len(),
        images = manifest.image_count(),
        "scanned gallery root"
    );

    let plan = ThumbnailPlan::from_config(config);
    let mut cache = ThumbnailCache::open(
        config.thumbnails.cache,
        &plan.thumbs_dir,
        &plan.config,
        options.no_cache,
    );

    fs::create_dir_all(&config.output_dir).map_err(|source| BuildError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;
    let renderer = PageRenderer::new(&template, &config.output_dir, last_updated);

    let mut report = BuildReport::default();
    let mut index = Vec::new();

    let skipped = manifest.galleries.len() - manifest.non_empty().count();
    if skipped > 0 {
        tracing::debug!(skipped, "skipping galleries without images");
    }

    for gallery in manifest.non_empty() {
        let thumbs = materialize_gallery(backend, gallery, &plan, &mut cache, progress.as_ref())?;
        report.stats.add(thumbs.stats);

        let size_bytes = gallery.size_bytes();
        let page = renderer.gallery_page(&thumbs, gallery.images.len(), size_bytes);
        page.write()?;
        report.pages.push(PageSummary::from(&page));

        if let Some(preview) = gallery.preview() {
            index.push(IndexEntry {
                name: gallery.name.clone(),
                thumbnail: plan.thumbnail_path(&gallery.name, preview.file_name()),
                image_count: gallery.images.len(),
                size_bytes,
            });
        }
    }

    let index_page = renderer.index_page(&config.index_title, &index);
    index_page.write()?;
    report.pages.push(PageSummary::from(&index_page));

    // Pages are already on disk; a stale manifest only costs regeneration.
    if let Err(e) = cache.save() {
        tracing::warn!(
            thumbs_dir = %plan.thumbs_dir.display(),
            error = %e,
            "could not save thumbnail cache"
        );
    }

    Ok(report)
}

/// Validate a configuration without writing anything: the template must be
/// readable and the gallery root scannable.
pub fn check(config: &GalleryConfig) -> Result<Manifest, BuildError> {
    config.validate()?;
    Template::load(&config.template)?;
    Ok(scan(&config.gallery_root)?)
}
