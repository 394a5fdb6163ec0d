//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the size of an image shrunk to fit inside a bounding box.
///
/// The aspect ratio is preserved and images are never enlarged: a source
/// that already fits is returned unchanged. Each output edge is at least 1px.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bound` - Bounding box (max width, max height)
///
/// # Examples
/// ```
/// # use thumbgal::imaging::calculate_fit_dimensions;
/// // Landscape 600x400 into 150x150 → width-limited
/// assert_eq!(calculate_fit_dimensions((600, 400), (150, 150)), (150, 100));
///
/// // Already small enough → untouched
/// assert_eq!(calculate_fit_dimensions((100, 80), (150, 150)), (100, 80));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bound;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}
