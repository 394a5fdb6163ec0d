//! End-to-end builds against real images on disk.

use filetime::{FileTime, set_file_mtime};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use thumbgal::config::GalleryConfig;
use thumbgal::naming::ThumbnailNaming;
use thumbgal::pipeline::{BuildError, BuildOptions, build};
use thumbgal::render::{RenderError, Template};

fn write_jpeg(path: &Path, width: u32, height: u32, mtime: i64) {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    img.save(path).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

/// `galleryRoot/vacation` with three JPEGs and an image-less `empty`.
fn vacation_site() -> (TempDir, GalleryConfig) {
    let tmp = TempDir::new().unwrap();
    let config = GalleryConfig::rooted_at(tmp.path());

    let vacation = config.gallery_root.join("vacation");
    fs::create_dir_all(&vacation).unwrap();
    write_jpeg(&vacation.join("beach.jpg"), 640, 480, 3_000);
    write_jpeg(&vacation.join("dunes.jpg"), 300, 600, 1_000);
    write_jpeg(&vacation.join("harbor.jpg"), 100, 80, 2_000);

    let empty = config.gallery_root.join("empty");
    fs::create_dir_all(&empty).unwrap();
    fs::write(empty.join("notes.txt"), "no pictures here").unwrap();

    fs::write(&config.template, Template::stock().source()).unwrap();
    (tmp, config)
}

fn anchors(html: &str) -> Vec<&str> {
    html.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("<a href="))
        .collect()
}

#[test]
fn builds_gallery_and_index_pages() {
    let (_tmp, config) = vacation_site();

    let report = build(&config, BuildOptions::default(), None).unwrap();

    assert_eq!(report.stats.generated, 3);
    let vacation = fs::read_to_string(config.output_dir.join("vacation.html")).unwrap();
    assert!(vacation.contains("<title>vacation</title>"));
    assert!(vacation.contains("Total Images: 3"));
    assert_eq!(
        anchors(&vacation),
        vec![
            "<a href=\"galleryRoot/vacation/beach.jpg\"><img src=\"thumbs/vacation/beach_thumb.jpg\" alt=\"beach.jpg\"></a>",
            "<a href=\"galleryRoot/vacation/harbor.jpg\"><img src=\"thumbs/vacation/harbor_thumb.jpg\" alt=\"harbor.jpg\"></a>",
            "<a href=\"galleryRoot/vacation/dunes.jpg\"><img src=\"thumbs/vacation/dunes_thumb.jpg\" alt=\"dunes.jpg\"></a>",
        ]
    );

    let index = fs::read_to_string(config.output_dir.join("index.html")).unwrap();
    assert!(index.contains("<title>Gallery Albums</title>"));
    assert!(index.contains("Total Images: 3"));
    assert_eq!(
        anchors(&index),
        vec!["<a href=\"./vacation.html\"><img src=\"thumbs/vacation/beach_thumb.jpg\" alt=\"vacation\"></a>"]
    );

    assert!(!config.output_dir.join("empty.html").exists());
}

#[test]
fn thumbnails_fit_the_box_and_keep_format() {
    let (_tmp, config) = vacation_site();

    build(&config, BuildOptions::default(), None).unwrap();

    let thumbs = config.thumbs_dir.join("vacation");
    assert_eq!(image::image_dimensions(thumbs.join("beach_thumb.jpg")).unwrap(), (150, 113));
    assert_eq!(image::image_dimensions(thumbs.join("dunes_thumb.jpg")).unwrap(), (75, 150));
    // Smaller than the box: never upscaled
    assert_eq!(image::image_dimensions(thumbs.join("harbor_thumb.jpg")).unwrap(), (100, 80));
    assert_eq!(
        image::ImageFormat::from_path(thumbs.join("beach_thumb.jpg")).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[test]
fn rebuild_reuses_existing_thumbnails() {
    let (_tmp, config) = vacation_site();
    build(&config, BuildOptions::default(), None).unwrap();

    let thumb = config.thumbs_dir.join("vacation/beach_thumb.jpg");
    set_file_mtime(&thumb, FileTime::from_unix_time(42, 0)).unwrap();

    let report = build(&config, BuildOptions::default(), None).unwrap();

    assert_eq!(report.stats.cached, 3);
    assert_eq!(report.stats.generated, 0);
    assert_eq!(
        FileTime::from_last_modification_time(&fs::metadata(&thumb).unwrap()),
        FileTime::from_unix_time(42, 0)
    );
}

#[test]
fn corrupt_image_is_left_out() {
    let (_tmp, config) = vacation_site();
    let broken = config.gallery_root.join("vacation/broken.jpg");
    fs::write(&broken, "not really a jpeg").unwrap();
    set_file_mtime(&broken, FileTime::from_unix_time(500, 0)).unwrap();

    let report = build(&config, BuildOptions::default(), None).unwrap();

    assert_eq!(report.stats.generated, 3);
    assert_eq!(report.stats.failed, 1);
    let vacation = fs::read_to_string(config.output_dir.join("vacation.html")).unwrap();
    assert_eq!(anchors(&vacation).len(), 3);
    assert!(!vacation.contains("broken.jpg"));
}

#[test]
fn flat_naming_writes_into_thumbs_root() {
    let (_tmp, mut config) = vacation_site();
    config.thumbnails.naming = ThumbnailNaming::Flat;

    build(&config, BuildOptions::default(), None).unwrap();

    assert!(config.thumbs_dir.join("beach_thumb.jpg").exists());
    assert!(!config.thumbs_dir.join("vacation").exists());
}

#[test]
fn missing_template_is_fatal() {
    let (_tmp, config) = vacation_site();
    fs::remove_file(&config.template).unwrap();

    let result = build(&config, BuildOptions::default(), None);

    assert!(matches!(
        result,
        Err(BuildError::Render(RenderError::Template { .. }))
    ));
    assert!(!config.thumbs_dir.exists());
}
