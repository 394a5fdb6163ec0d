//! # thumbgal
//!
//! A flat static photo-gallery generator. Point it at a directory of
//! folders full of images and it writes a thumbnail per image, one HTML page
//! per folder, and an `index.html` linking them all. There is no server and
//! no database: every run re-derives everything from the filesystem.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scan         galleryRoot/  →  Manifest        (folders → ordered image lists)
//! 2. Thumbnails   Manifest      →  thumbs/         (bounded-box resize, cached)
//! 3. Render       Manifest      →  *.html          (template placeholder fill)
//! ```
//!
//! Stages 2 and 3 run gallery by gallery; the index page is rendered last
//! from the galleries that have at least one image. [`pipeline::build`] runs
//! the whole thing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — lists galleries and their images, newest first |
//! | [`process`] | Stage 2 — materializes thumbnails in parallel, skipping failures |
//! | [`render`] | Stage 3 — fills the page template, builds the tile markup with Maud |
//! | [`pipeline`] | Runs the stages and aggregates the index page |
//! | [`config`] | `thumbgal.toml` loading, merging onto defaults, validation |
//! | [`naming`] | Thumbnail file naming (`flat` or per-gallery `namespaced`) |
//! | [`cache`] | Decides whether a thumbnail on disk can be reused |
//! | [`imaging`] | Pure-Rust resize and encode behind the `ImageBackend` trait |
//! | [`size`] | Directory sizes and `2.00 KB`-style formatting |
//! | [`output`] | CLI output formatting for check and build |
//!
//! # Design Decisions
//!
//! ## Flat Templates
//!
//! Pages are one user-editable HTML file with five `{placeholders}`. There
//! are no loops, conditionals or includes: the repeated part (the thumbnail
//! grid) is generated as a fragment and dropped into `{thumbnails}`.
//!
//! ## Thumbnails Keep Their Format
//!
//! A JPEG gets a JPEG thumbnail, a PNG a PNG, a WebP a WebP. The thumbnail
//! name is the source stem plus `_thumb`, so its path is a pure function of
//! the source path and the naming scheme; no index of thumbnails is needed.
//!
//! ## Existence Is the Default Cache
//!
//! A thumbnail that exists is reused. This is cheap and good enough for
//! galleries where photos are added, not edited. The `content` policy hashes
//! sources and settings for galleries where files get replaced in place.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses only the `image` crate (Lanczos3 resampling),
//! so the binary has no system library dependencies.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod scan;
pub mod size;

#[cfg(test)]
pub(crate) mod test_helpers;
