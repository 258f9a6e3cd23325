//! Multi-stage spatial registration against the basemap.
//!
//! Direct high-resolution content-based registration is expensive and
//! fragile over large search windows, so registration runs on a resolution
//! ladder: a cheap metadata-based estimate at low resolution, an external
//! content-based refinement against the cropped basemap, and an algebraic
//! rescale of the refined result up to the high-resolution pixel space.
//! The result is produced once per source image and shared read-only by
//! every tile derivation.

use std::path::Path;

use tracing::info;

use crate::basemap::{proj_coord_to_pixel_coord, Basemap, GeoInfo, GeoProbe};
use crate::dispatch::{run_if_missing, ToolRunner};
use crate::error::{Result, TileforgeError};
use crate::geometry::{Rect, SpatialTransform};
use crate::pipeline::paths::ImagePaths;
use crate::tools::{register_cmd, ToolPaths};

/// The authoritative registration for one source image: its geographic
/// extent and the transform into high-resolution basemap pixels. Immutable;
/// consumers copy the transform before adjusting it per tile.
#[derive(Clone, Debug)]
pub struct RegistrationResult {
    pub degree_bounds: Rect,
    pub high_res_transform: SpatialTransform,
}

/// Estimate the registration of `target_geo` inside `base_geo` purely from
/// georeferencing metadata and persist it as a transform record.
///
/// Both rasters must share one projection; only a shift is estimated, no
/// rotation or scale.
pub fn estimate_registration(
    base_geo: &GeoInfo,
    target_geo: &GeoInfo,
    output: &Path,
) -> Result<SpatialTransform> {
    let (column, row) = proj_coord_to_pixel_coord(
        target_geo.projection_bounds.min_x,
        target_geo.projection_bounds.max_y,
        base_geo,
    );
    let estimate = SpatialTransform::new(1.0, column, row);
    estimate.write(output)?;
    Ok(estimate)
}

/// Phase B of the registration pipeline: refine the metadata estimate
/// against pixel content and rescale the result to high resolution.
///
/// The refined transform is relative to the basemap crop; shifting by the
/// crop's pixel origin makes it basemap-relative, and the `low -> high`
/// resolution ratio turns the rectangle into the equivalent
/// high-resolution footprint. That rectangle becomes both the
/// authoritative high-resolution transform and the image's reported
/// geographic extent; the phase A estimate is discarded after use.
///
/// Refinement failure is unrecoverable for the whole source image.
#[allow(clippy::too_many_arguments)]
pub fn register_image(
    runner: &dyn ToolRunner,
    geo_probe: &dyn GeoProbe,
    tools: &ToolPaths,
    basemap: &Basemap,
    paths: &ImagePaths,
    low_res_nadir: &Path,
    crop_degree_bounds: &Rect,
    crop_pixel_bounds: &Rect,
    low_res_mask_size: (u32, u32),
    force: bool,
) -> Result<RegistrationResult> {
    // Metadata-only estimate against the cropped basemap.
    let base_geo = basemap.crop_geo_info(crop_degree_bounds);
    let nadir_geo = geo_probe.geo_info(low_res_nadir)?;
    estimate_registration(&base_geo, &nadir_geo, &paths.estimated_cropped_transform)?;

    // Content-based refinement, delegated externally.
    let cmd = register_cmd(
        tools,
        &paths.basemap_gray_crop,
        low_res_nadir,
        &paths.low_res_cropped_registration,
        1.0,
        &paths.estimated_cropped_transform,
    );
    run_if_missing(runner, &cmd, &paths.low_res_cropped_registration, force).map_err(|e| {
        TileforgeError::RegistrationFailed(format!(
            "content-based refinement did not converge: {e}"
        ))
    })?;
    let refined = SpatialTransform::read(&paths.low_res_cropped_registration)?;

    // Crop-relative rect -> basemap-relative -> high-resolution pixels.
    let crop_relative = refined.to_rect(
        low_res_mask_size.0 as f64,
        low_res_mask_size.1 as f64,
    );
    let low_res_rect =
        crop_relative.shifted(crop_pixel_bounds.min_x, crop_pixel_bounds.min_y);
    let high_res_rect = basemap.convert_pixel_roi_resolution(&low_res_rect, true);

    let high_res_transform = SpatialTransform::from_rect(&high_res_rect);
    high_res_transform.write(&paths.high_res_registration)?;
    let degree_bounds = basemap.pixel_roi_to_degree_roi(&high_res_rect, true);

    info!(bounds = %degree_bounds, "Registered image against basemap");
    Ok(RegistrationResult {
        degree_bounds,
        high_res_transform,
    })
}
