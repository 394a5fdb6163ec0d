//! CLI output formatting.
//!
//! Output is an inventory of what the build saw and did: galleries with
//! their image counts and sizes, each image's thumbnail status, and the
//! pages written. Diagnostics (warnings about skipped images, debug cache
//! decisions) go through `tracing` to stderr; this module owns stdout.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Galleries
//! 001 alps (2 images, 1.21 MB)
//!     001 peak.jpg
//!     002 valley.png
//! 002 empty (no images, skipped)
//! ```
//!
//! ## Build
//!
//! ```text
//! vacation (3 images)
//!     001 beach.jpg: generated
//!     002 sunset.jpg: cached
//!     003 broken.jpg: failed (Failed to decode …)
//!
//! 001 vacation → vacation.html (2 of 3 images, 4.10 MB)
//! Gallery Albums → index.html (1 gallery, 3 images, 4.10 MB)
//! Thumbnails: 1 cached, 1 generated, 1 failed (3 total)
//! ```
//!
//! Each stage has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::pipeline::{BuildReport, PageSummary};
use crate::process::{ProcessEvent, ThumbnailStatus};
use crate::scan::Manifest;
use crate::size::human_readable_size;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

/// File name of a page for display.
fn page_file(page: &PageSummary) -> String {
    page.path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| page.path.display().to_string())
}

// ============================================================================
// Check
// ============================================================================

/// Format the scanned gallery inventory.
pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Galleries".to_string()];

    if manifest.galleries.is_empty() {
        lines.push(format!("    (none in {})", manifest.root.display()));
        return lines;
    }

    for (i, gallery) in manifest.galleries.iter().enumerate() {
        if gallery.images.is_empty() {
            lines.push(format!(
                "{} {} (no images, skipped)",
                format_index(i + 1),
                gallery.name
            ));
            continue;
        }
        lines.push(format!(
            "{} {} ({}, {})",
            format_index(i + 1),
            gallery.name,
            plural(gallery.images.len(), "image", "images"),
            human_readable_size(gallery.size_bytes())
        ));
        for (j, image) in gallery.images.iter().enumerate() {
            lines.push(format!("    {} {}", format_index(j + 1), image.filename));
        }
    }

    lines
}

pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Thumbnails
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::GalleryStarted { name, image_count } => {
            vec![format!(
                "{} ({})",
                name,
                plural(*image_count, "image", "images")
            )]
        }
        ProcessEvent::ImageProcessed {
            index,
            filename,
            status,
        } => {
            let status = match status {
                ThumbnailStatus::Cached => "cached".to_string(),
                ThumbnailStatus::Generated => "generated".to_string(),
                ThumbnailStatus::Failed(reason) => format!("failed ({})", reason),
            };
            vec![format!("    {} {}: {}", format_index(*index), filename, status)]
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Format the pages written by a build, followed by the thumbnail summary.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, page) in report.gallery_pages().iter().enumerate() {
        let images = if page.tiles == page.image_count {
            plural(page.image_count, "image", "images")
        } else {
            format!("{} of {} images", page.tiles, page.image_count)
        };
        lines.push(format!(
            "{} {} \u{2192} {} ({}, {})",
            format_index(i + 1),
            page.title,
            page_file(page),
            images,
            human_readable_size(page.size_bytes)
        ));
    }

    if let Some(index) = report.index() {
        lines.push(format!(
            "{} \u{2192} {} ({}, {}, {})",
            index.title,
            page_file(index),
            plural(index.tiles, "gallery", "galleries"),
            plural(index.image_count, "image", "images"),
            human_readable_size(index.size_bytes)
        ));
    }

    if report.stats.total() > 0 {
        lines.push(format!("Thumbnails: {}", report.stats));
    }

    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::scan::scan;
    use crate::test_helpers::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn page(title: &str, file: &str, tiles: usize, images: usize, bytes: u64) -> PageSummary {
        PageSummary {
            title: title.to_string(),
            path: PathBuf::from("/site").join(file),
            tiles,
            image_count: images,
            size_bytes: bytes,
        }
    }

    #[test]
    fn scan_output_lists_galleries_and_images() {
        let tmp = TempDir::new().unwrap();
        let dir = write_fake_images(tmp.path(), "alps", &["peak.jpg", "valley.png"]);
        set_mtime(&dir.join("peak.jpg"), 2_000);
        set_mtime(&dir.join("valley.png"), 1_000);
        write_fake_images(tmp.path(), "empty", &[]);

        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest);

        assert_eq!(
            lines,
            vec![
                "Galleries",
                "001 alps (2 images, 20.00 B)",
                "    001 peak.jpg",
                "    002 valley.png",
                "002 empty (no images, skipped)",
            ]
        );
    }

    #[test]
    fn scan_output_empty_root() {
        let tmp = TempDir::new().unwrap();
        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest);
        assert_eq!(lines[0], "Galleries");
        assert!(lines[1].starts_with("    (none in "));
    }

    #[test]
    fn process_event_lines() {
        let started = ProcessEvent::GalleryStarted {
            name: "vacation".to_string(),
            image_count: 1,
        };
        assert_eq!(format_process_event(&started), vec!["vacation (1 image)"]);

        let failed = ProcessEvent::ImageProcessed {
            index: 3,
            filename: "broken.jpg".to_string(),
            status: ThumbnailStatus::Failed("bad data".to_string()),
        };
        assert_eq!(
            format_process_event(&failed),
            vec!["    003 broken.jpg: failed (bad data)"]
        );

        let cached = ProcessEvent::ImageProcessed {
            index: 1,
            filename: "a.jpg".to_string(),
            status: ThumbnailStatus::Cached,
        };
        assert_eq!(format_process_event(&cached), vec!["    001 a.jpg: cached"]);
    }

    #[test]
    fn build_output_lists_pages_and_summary() {
        let report = BuildReport {
            pages: vec![
                page("alps", "alps.html", 2, 2, 2048),
                page("vacation", "vacation.html", 2, 3, 1024),
                page("Gallery Albums", "index.html", 2, 5, 3072),
            ],
            stats: CacheStats {
                cached: 1,
                generated: 3,
                failed: 1,
            },
        };

        assert_eq!(
            format_build_output(&report),
            vec![
                "001 alps \u{2192} alps.html (2 images, 2.00 KB)",
                "002 vacation \u{2192} vacation.html (2 of 3 images, 1.00 KB)",
                "Gallery Albums \u{2192} index.html (2 galleries, 5 images, 3.00 KB)",
                "Thumbnails: 1 cached, 3 generated, 1 failed (5 total)",
            ]
        );
    }

    #[test]
    fn build_output_without_galleries() {
        let report = BuildReport {
            pages: vec![page("Gallery Albums", "index.html", 0, 0, 0)],
            stats: CacheStats::default(),
        };

        assert_eq!(
            format_build_output(&report),
            vec!["Gallery Albums \u{2192} index.html (0 galleries, 0 images, 0.00 B)"]
        );
    }
}
