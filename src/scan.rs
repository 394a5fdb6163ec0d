//! Gallery discovery.
//!
//! Stage 1 of the build. Reads the gallery root one level deep and produces a
//! [`Manifest`] that the thumbnail and render stages consume.
//!
//! ## Directory Structure
//!
//! ```text
//! galleryRoot/                 # Gallery root
//! ├── notes.txt                # Ignored: not a directory
//! ├── vacation/                # Gallery "vacation"
//! │   ├── beach.jpg            # Image
//! │   ├── dunes.PNG            # Image (extension match is case-insensitive)
//! │   ├── readme.txt           # Ignored: not an image (still counts toward size)
//! │   └── raw/                 # Ignored: no recursion below gallery level
//! │       └── beach.jpg
//! └── empty/                   # Gallery with no images
//! ```
//!
//! ## Ordering
//!
//! Galleries are ordered by directory name. Images are ordered newest first by
//! modification time. Entries are sorted by filename before the (stable)
//! timestamp sort, so images with identical timestamps always come out in the
//! same order.

use crate::size::directory_size;
use std::cmp::Reverse;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Gallery root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Everything discovered under the gallery root.
#[derive(Debug)]
pub struct Manifest {
    pub root: PathBuf,
    pub galleries: Vec<Gallery>,
}

impl Manifest {
    /// Galleries with at least one image, in manifest order.
    pub fn non_empty(&self) -> impl Iterator<Item = &Gallery> {
        self.galleries.iter().filter(|g| !g.images.is_empty())
    }

    /// Total image count across all galleries.
    pub fn image_count(&self) -> usize {
        self.galleries.iter().map(|g| g.images.len()).sum()
    }
}

/// One immediate sub-directory of the gallery root.
#[derive(Debug)]
pub struct Gallery {
    /// Directory name; used as page title and output filename stem.
    pub name: String,
    /// Path to the gallery directory.
    pub path: PathBuf,
    /// Images, newest first.
    pub images: Vec<Image>,
}

impl Gallery {
    /// Most recently modified image, if any.
    pub fn preview(&self) -> Option<&Image> {
        self.images.first()
    }

    /// Total size in bytes of every file under the gallery directory.
    pub fn size_bytes(&self) -> u64 {
        directory_size(&self.path)
    }
}

/// An image file inside a gallery.
#[derive(Debug, Clone)]
pub struct Image {
    /// Path to the file on disk, exactly as listed by the filesystem.
    pub path: PathBuf,
    /// File name for display and alt text (lossy if not valid UTF-8).
    pub filename: String,
    /// Path relative to the gallery root, `/`-separated (`vacation/beach.jpg`).
    pub source_path: String,
    pub modified: SystemTime,
}

impl Image {
    /// The file name as stored on disk.
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let galleries = dirs
        .iter()
        .map(|dir| scan_gallery(dir))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Manifest {
        root: root.to_path_buf(),
        galleries,
    })
}

fn scan_gallery(dir: &Path) -> Result<Gallery, ScanError> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_image(p))
        .collect();
    files.sort();

    let mut images: Vec<Image> = files
        .iter()
        .map(|path| {
            let filename = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_default();
            let modified = fs::metadata(path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Image {
                path: path.clone(),
                source_path: format!("{}/{}", name, filename),
                filename,
                modified,
            }
        })
        .collect();

    images.sort_by_key(|img| Reverse(img.modified));

    Ok(Gallery {
        name,
        path: dir.to_path_buf(),
        images,
    })
}

fn is_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}
