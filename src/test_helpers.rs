//! Shared test utilities for the thumbgal test suite.
//!
//! Fixture writers build gallery trees in a temp directory; lookup helpers
//! panic with a readable message when a gallery is missing.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let dir = write_fake_images(tmp.path(), "vacation", &["old.jpg", "new.jpg"]);
//! set_mtime(&dir.join("old.jpg"), 1_000);
//! set_mtime(&dir.join("new.jpg"), 2_000);
//!
//! let manifest = scan(tmp.path()).unwrap();
//! assert_eq!(image_filenames(find_gallery(&manifest, "vacation")), vec!["new.jpg", "old.jpg"]);
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scan::{Gallery, Manifest};

// =========================================================================
// Fixture writers
// =========================================================================

/// Create `root/gallery/` and write a small placeholder file per name.
///
/// The files are not decodable images; use them where only names and
/// timestamps matter. Returns the gallery directory.
pub fn write_fake_images(root: &Path, gallery: &str, names: &[&str]) -> PathBuf {
    let dir = root.join(gallery);
    fs::create_dir_all(&dir).unwrap();
    for name in names {
        fs::write(dir.join(name), "fake image").unwrap();
    }
    dir
}

/// Set a file's modification time to `secs` after the Unix epoch.
pub fn set_mtime(path: &Path, secs: i64) {
    filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(secs, 0)).unwrap();
}

/// Write a valid JPEG with a gradient pattern.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a valid PNG with an alpha channel.
pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([128, (x % 256) as u8, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Manifest lookups — panic with a clear message on miss
// =========================================================================

/// Find a gallery by directory name. Panics if not found.
pub fn find_gallery<'a>(manifest: &'a Manifest, name: &str) -> &'a Gallery {
    manifest
        .galleries
        .iter()
        .find(|g| g.name == name)
        .unwrap_or_else(|| {
            panic!(
                "gallery '{name}' not found. Available: {:?}",
                gallery_names(manifest)
            )
        })
}

/// Gallery names in manifest order.
pub fn gallery_names(manifest: &Manifest) -> Vec<&str> {
    manifest.galleries.iter().map(|g| g.name.as_str()).collect()
}

/// Image filenames of a gallery in gallery order.
pub fn image_filenames(gallery: &Gallery) -> Vec<String> {
    gallery.images.iter().map(|i| i.filename.clone()).collect()
}
