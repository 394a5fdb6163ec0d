//! HTML page rendering.
//!
//! Stage 3 of the build. Every page, gallery or index, is the same shared
//! template with five placeholders filled in:
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{title}` | gallery name, or the index title (escaped) |
//! | `{thumbnails}` | one `<a href=…><img src=… alt=…></a>` line per tile |
//! | `{total_images}` | image count |
//! | `{gallery_size}` | human-readable byte size of the source images |
//! | `{last_updated}` | build timestamp, `%A %B %d %Y %H:%M`, local time |
//!
//! `{{` and `}}` render as single braces so templates written for
//! format-string style substitution keep working. Any other brace text
//! (CSS blocks, unknown names) is copied through untouched; there is no
//! templating language beyond this.
//!
//! ## HTML Generation
//!
//! The tile fragment is built with [maud](https://maud.lambda.xyz/), so
//! filenames and gallery names are escaped in both attributes and text.
//! Link targets are percent-encoded one path segment at a time first, so a
//! `#`, `?` or `%` in a name stays part of the path instead of starting a
//! fragment or query.

use crate::process::GalleryThumbnails;
use crate::size::human_readable_size;
use chrono::{DateTime, TimeZone};
use maud::{Markup, html};
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot read template {path}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot write page {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

const STOCK_TEMPLATE: &str = include_str!("../static/template.html");

const TIMESTAMP_FORMAT: &str = "%A %B %d %Y %H:%M";

/// Render a build timestamp, e.g. `Tuesday March 05 2024 14:07`.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// The shared page template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Read the template from disk. A missing file is an error, not a
    /// fallback to the stock template.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        fs::read_to_string(path)
            .map(Self::from_source)
            .map_err(|source| RenderError::Template {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The template bundled with the binary (`thumbgal gen-template`).
    pub fn stock() -> Self {
        Self::from_source(STOCK_TEMPLATE)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute the placeholders for one page.
    pub fn render(&self, page: &PageContext<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + page.thumbnails.0.len());
        let mut rest = self.source.as_str();

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                out.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }

            if tail.starts_with('{') {
                if let Some(end) = tail.find('}') {
                    if page.write_placeholder(&tail[1..end], &mut out) {
                        rest = &tail[end + 1..];
                        continue;
                    }
                }
            }

            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
        out.push_str(rest);
        out
    }
}

/// Values for one rendered page.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub title: &'a str,
    /// Already-escaped tile markup.
    pub thumbnails: &'a Markup,
    pub total_images: usize,
    pub total_bytes: u64,
    pub last_updated: &'a str,
}

impl PageContext<'_> {
    /// Append the value of placeholder `name`; false if `name` is not one.
    fn write_placeholder(&self, name: &str, out: &mut String) -> bool {
        match name {
            "title" => out.push_str(&html! { (self.title) }.into_string()),
            "thumbnails" => out.push_str(&self.thumbnails.0),
            "total_images" => out.push_str(&self.total_images.to_string()),
            "gallery_size" => out.push_str(&human_readable_size(self.total_bytes)),
            "last_updated" => out.push_str(self.last_updated),
            _ => return false,
        }
        true
    }
}

/// One linked thumbnail in a page grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub href: String,
    pub src: String,
    pub alt: String,
}

/// Tile markup, one anchor per line.
pub fn thumbnail_grid(tiles: &[Tile]) -> Markup {
    html! {
        @for tile in tiles {
            a href=(tile.href) { img src=(tile.src) alt=(tile.alt); }
            "\n"
        }
    }
}

/// Path of `target` as written into a page.
///
/// Relative to `output_dir` when `target` lies under it, otherwise the path
/// as configured. Always `/`-separated, each segment percent-encoded.
pub fn link_path(output_dir: &Path, target: &Path) -> String {
    let path = target.strip_prefix(output_dir).unwrap_or(target);
    path.components()
        .map(|c| match c {
            Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy().into_owned(),
            Component::RootDir => String::new(),
            Component::CurDir => ".".to_string(),
            Component::ParentDir => "..".to_string(),
            Component::Normal(segment) => encode_segment(segment),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn encode_segment(segment: &OsStr) -> String {
    use std::os::unix::ffi::OsStrExt;
    urlencoding::encode_binary(segment.as_bytes()).into_owned()
}

#[cfg(not(unix))]
fn encode_segment(segment: &OsStr) -> String {
    urlencoding::encode(&segment.to_string_lossy()).into_owned()
}

/// A gallery as it appears on the index page.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub name: String,
    /// Thumbnail of the gallery's most recent image.
    pub thumbnail: PathBuf,
    pub image_count: usize,
    pub size_bytes: u64,
}

/// A page ready to be written.
#[derive(Debug)]
pub struct RenderedPage {
    pub title: String,
    pub path: PathBuf,
    pub html: String,
    /// Number of tiles on the page.
    pub tiles: usize,
    pub image_count: usize,
    pub size_bytes: u64,
}

impl RenderedPage {
    pub fn write(&self) -> Result<(), RenderError> {
        fs::write(&self.path, &self.html).map_err(|source| RenderError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(page = %self.path.display(), tiles = self.tiles, "page written");
        Ok(())
    }
}

/// Renders gallery and index pages for one build.
pub struct PageRenderer<'a> {
    template: &'a Template,
    output_dir: &'a Path,
    last_updated: String,
}

impl<'a> PageRenderer<'a> {
    /// `last_updated` is stamped on every page of the run.
    pub fn new(template: &'a Template, output_dir: &'a Path, last_updated: String) -> Self {
        Self {
            template,
            output_dir,
            last_updated,
        }
    }

    /// `<output_dir>/<name>.html`
    pub fn page_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.html", name))
    }

    /// Gallery page: one tile per image with a usable thumbnail, linking the
    /// original. `image_count` counts every scanned image.
    pub fn gallery_page(
        &self,
        thumbs: &GalleryThumbnails,
        image_count: usize,
        size_bytes: u64,
    ) -> RenderedPage {
        let tiles: Vec<Tile> = thumbs
            .succeeded()
            .map(|outcome| Tile {
                href: link_path(self.output_dir, &outcome.source),
                src: link_path(self.output_dir, &outcome.thumbnail),
                alt: outcome.filename.clone(),
            })
            .collect();

        self.page(&thumbs.gallery, &tiles, image_count, size_bytes)
    }

    /// Index page: one tile per entry, linking the gallery page.
    pub fn index_page(&self, title: &str, entries: &[IndexEntry]) -> RenderedPage {
        let tiles: Vec<Tile> = entries
            .iter()
            .map(|entry| Tile {
                href: format!("./{}.html", urlencoding::encode(&entry.name)),
                src: link_path(self.output_dir, &entry.thumbnail),
                alt: entry.name.clone(),
            })
            .collect();
        let image_count = entries.iter().map(|e| e.image_count).sum();
        let size_bytes = entries.iter().map(|e| e.size_bytes).sum();

        let mut page = self.page(title, &tiles, image_count, size_bytes);
        page.path = self.page_path("index");
        page
    }

    fn page(&self, title: &str, tiles: &[Tile], image_count: usize, size_bytes: u64) -> RenderedPage {
        let thumbnails = thumbnail_grid(tiles);
        let html = self.template.render(&PageContext {
            title,
            thumbnails: &thumbnails,
            total_images: image_count,
            total_bytes: size_bytes,
            last_updated: &self.last_updated,
        });
        RenderedPage {
            title: title.to_string(),
            path: self.page_path(title),
            html,
            tiles: tiles.len(),
            image_count,
            size_bytes,
        }
    }
}
