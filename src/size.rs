//! Byte counting and human-readable size strings.
//!
//! Gallery sizes shown on every page are computed from the *source* files on
//! disk, never from generated thumbnails.

use std::path::Path;
use walkdir::WalkDir;

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary (1024) scaling and two decimals.
///
/// The value is scaled to the largest unit that keeps it below 1024, capped
/// at TB:
///
/// ```
/// # use thumbgal::size::human_readable_size;
/// assert_eq!(human_readable_size(0), "0.00 B");
/// assert_eq!(human_readable_size(1536), "1.50 KB");
/// assert_eq!(human_readable_size(2048), "2.00 KB");
/// ```
pub fn human_readable_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let last = UNITS.len() - 1;
    for unit in &UNITS[..last] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} {}", size, UNITS[last])
}

/// Recursively sum the sizes of all regular files under `dir`.
///
/// Entries that cannot be read are skipped; a missing directory counts as
/// zero. Symlinks are not followed.
pub fn directory_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.metadata().map(|m| m.len()).unwrap_or(0))
        .sum()
}
