//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders, format sniffed from content) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` (lossless; quality unused) |
//! | Encode → WebP | `WebPEncoder::new_lossless` (the `image` crate has no lossy WebP encoder) |
//!
//! The output container is chosen from the output path's extension, which
//! always matches the source's.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "Unsupported output format for {}: {}",
            path.display(),
            e
        ))
    })
}

/// Encode `img` into `writer` as `format`.
fn encode<W: Write>(
    img: &DynamicImage,
    format: ImageFormat,
    writer: W,
    quality: u32,
) -> Result<(), BackendError> {
    let result = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(writer, quality as u8)),
        ImageFormat::Png => img.write_with_encoder(PngEncoder::new(writer)),
        // The WebP encoder only takes 8-bit RGB(A)
        ImageFormat::WebP => {
            let eight_bit = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            eight_bit.write_with_encoder(WebPEncoder::new_lossless(writer))
        }
        other => {
            return Err(BackendError::ProcessingFailed(format!(
                "Unsupported output format: {:?}",
                other
            )));
        }
    };
    result.map_err(|e| BackendError::ProcessingFailed(format!("Encode failed: {}", e)))
}

/// Temporary sibling path used while a thumbnail is being written.
fn staging_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(output.file_name().unwrap_or_default());
    name.push(".partial");
    output.with_file_name(name)
}

/// Encode to a staging file, then rename into place.
///
/// A failed encode never leaves a file at `output`, so an existence-based
/// cache cannot pick up a truncated thumbnail.
fn save_image(img: &DynamicImage, output: &Path, quality: u32) -> Result<(), BackendError> {
    let format = output_format(output)?;
    let staging = staging_path(output);

    let written = File::create(&staging)
        .map_err(BackendError::Io)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            encode(img, format, &mut writer, quality)?;
            writer.flush().map_err(BackendError::Io)
        });

    match written {
        Ok(()) => fs::rename(&staging, output).map_err(BackendError::Io),
        Err(e) => {
            let _ = fs::remove_file(&staging);
            Err(e)
        }
    }
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;

        let (width, height) = calculate_fit_dimensions(
            (img.width(), img.height()),
            (params.max_width, params.max_height),
        );
        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        save_image(&resized, &params.output, params.quality.value())?;
        Ok(Dimensions { width, height })
    }
}
