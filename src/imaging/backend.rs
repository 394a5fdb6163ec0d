//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between thumbnail planning and
//! pixel work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests use the
//! recording `MockBackend` below.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Write a thumbnail of `params.source` to `params.output`, fitting inside
    /// the bounding box, and return the dimensions written.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError>;
}
