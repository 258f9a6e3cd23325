//! In-process raster probing for tile metadata.
//!
//! This is the only place the core touches pixel data. Resampling, masking
//! and color work all stay in external tools; here we only need dimensions
//! and a background-pixel count to score tile validity.

use std::path::Path;

use crate::error::Result;

/// (width, height) of a raster without decoding the pixel data.
pub fn image_size(path: &Path) -> Result<(u32, u32)> {
    Ok(image::image_dimensions(path)?)
}

/// Fraction of pixels that are not background, where background means all
/// bands are zero. Warped images pad the rotated footprint with black, so
/// this measures how much real content a tile carries.
pub fn percent_valid(path: &Path) -> Result<f64> {
    let img = image::open(path)?.into_rgb8();
    let total = (img.width() as u64) * (img.height() as u64);
    if total == 0 {
        return Ok(0.0);
    }
    let background = img
        .pixels()
        .filter(|p| p.0[0] == 0 && p.0[1] == 0 && p.0[2] == 0)
        .count() as u64;
    Ok(1.0 - background as f64 / total as f64)
}
