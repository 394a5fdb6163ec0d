//! Thumbnail file naming.
//!
//! A thumbnail keeps its source's stem and extension with `_thumb` spliced in
//! between: `beach.jpg` → `beach_thumb.jpg`. The extension is kept verbatim
//! (case included) because the thumbnail is encoded in the source's format.
//!
//! ## Schemes
//!
//! ```text
//! flat:        thumbs/beach_thumb.jpg
//! namespaced:  thumbs/vacation/beach_thumb.jpg
//! ```
//!
//! Under [`ThumbnailNaming::Flat`], `vacation/beach.jpg` and
//! `weekend/beach.jpg` map to the same thumbnail. Whichever gallery is
//! processed first wins and the other gallery shows that thumbnail; keeping
//! filenames unique across galleries is up to the user.
//! [`ThumbnailNaming::Namespaced`] keys the thumbnail by gallery name and
//! filename, so distinct sources never share a thumbnail.

use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

const THUMB_SUFFIX: &str = "_thumb";

/// How thumbnail paths are laid out under the thumbnails directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailNaming {
    /// Every thumbnail directly in the thumbnails directory.
    Flat,
    /// One sub-directory per gallery.
    #[default]
    Namespaced,
}

impl ThumbnailNaming {
    /// Full thumbnail path for `filename` in gallery `gallery`.
    pub fn thumbnail_path(
        self,
        thumbs_dir: &Path,
        gallery: &str,
        filename: impl AsRef<OsStr>,
    ) -> PathBuf {
        let name = thumbnail_file_name(filename);
        match self {
            ThumbnailNaming::Flat => thumbs_dir.join(name),
            ThumbnailNaming::Namespaced => thumbs_dir.join(gallery).join(name),
        }
    }
}

/// `<stem>_thumb.<ext>` for an image filename.
///
/// - `"beach.jpg"` → `"beach_thumb.jpg"`
/// - `"IMG.01.JPEG"` → `"IMG.01_thumb.JPEG"`
/// - `"noext"` → `"noext_thumb"`
///
/// Works on the raw `OsStr`, so names that are not valid UTF-8 map to a
/// thumbnail beside them instead of a lossy lookalike.
pub fn thumbnail_file_name(filename: impl AsRef<OsStr>) -> OsString {
    let path = Path::new(filename.as_ref());
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(THUMB_SUFFIX);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_splices_suffix_before_extension() {
        assert_eq!(thumbnail_file_name("beach.jpg"), "beach_thumb.jpg");
        assert_eq!(thumbnail_file_name("sunset.webp"), "sunset_thumb.webp");
    }

    #[test]
    fn file_name_keeps_extension_case() {
        assert_eq!(thumbnail_file_name("DSC_0001.JPG"), "DSC_0001_thumb.JPG");
    }

    #[test]
    fn file_name_only_strips_last_extension() {
        assert_eq!(thumbnail_file_name("IMG.01.jpeg"), "IMG.01_thumb.jpeg");
    }

    #[test]
    fn file_name_without_extension() {
        assert_eq!(thumbnail_file_name("noext"), "noext_thumb");
    }

    #[cfg(unix)]
    #[test]
    fn file_name_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let name = thumbnail_file_name(OsStr::from_bytes(b"caf\xe9.jpg"));
        assert_eq!(name.as_bytes(), b"caf\xe9_thumb.jpg");
    }

    #[test]
    fn flat_path_ignores_gallery() {
        let path = ThumbnailNaming::Flat.thumbnail_path(Path::new("thumbs"), "vacation", "a.png");
        assert_eq!(path, PathBuf::from("thumbs/a_thumb.png"));
    }

    #[test]
    fn flat_paths_collide_across_galleries() {
        let thumbs = Path::new("thumbs");
        let a = ThumbnailNaming::Flat.thumbnail_path(thumbs, "vacation", "beach.jpg");
        let b = ThumbnailNaming::Flat.thumbnail_path(thumbs, "weekend", "beach.jpg");
        assert_eq!(a, b);
    }

    #[test]
    fn namespaced_paths_are_distinct_across_galleries() {
        let thumbs = Path::new("thumbs");
        let a = ThumbnailNaming::Namespaced.thumbnail_path(thumbs, "vacation", "beach.jpg");
        let b = ThumbnailNaming::Namespaced.thumbnail_path(thumbs, "weekend", "beach.jpg");
        assert_eq!(a, PathBuf::from("thumbs/vacation/beach_thumb.jpg"));
        assert_eq!(b, PathBuf::from("thumbs/weekend/beach_thumb.jpg"));
    }

    #[test]
    fn default_scheme_is_namespaced() {
        assert_eq!(ThumbnailNaming::default(), ThumbnailNaming::Namespaced);
    }
}
