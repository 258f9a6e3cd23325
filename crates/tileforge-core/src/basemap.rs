use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::GEO_SIDECAR_SUFFIX;
use crate::error::Result;
use crate::geometry::Rect;

/// Georeferencing metadata for one raster: projected-coordinate bounds,
/// geographic bounds, per-pixel ground size, and pixel dimensions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    pub projection_bounds: Rect,
    pub degree_bounds: Rect,
    /// (x, y) size of one pixel in projected units. `y` is negative for
    /// north-up rasters.
    pub pixel_size: (f64, f64),
    pub image_size: (u32, u32),
}

/// Convert a projected coordinate into (column, row) pixel coordinates of
/// the raster described by `geo`.
pub fn proj_coord_to_pixel_coord(x: f64, y: f64, geo: &GeoInfo) -> (f64, f64) {
    let column = (x - geo.projection_bounds.min_x) / geo.pixel_size.0;
    let row = (y - geo.projection_bounds.max_y) / geo.pixel_size.1;
    (column, row)
}

/// Source of georeferencing metadata for rasters on disk. Injectable so
/// tests can supply canned values.
pub trait GeoProbe: Send + Sync {
    fn geo_info(&self, raster: &Path) -> Result<GeoInfo>;
}

/// Reads the `<raster>.geo.json` sidecar the warp tool emits next to every
/// raster it produces.
pub struct SidecarGeoProbe;

impl GeoProbe for SidecarGeoProbe {
    fn geo_info(&self, raster: &Path) -> Result<GeoInfo> {
        let mut sidecar = raster.as_os_str().to_owned();
        sidecar.push(GEO_SIDECAR_SUFFIX);
        let contents = fs::read_to_string(PathBuf::from(sidecar))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// The reference basemap: a plate-carree raster available at a low and a
/// high meters-per-pixel resolution. The pipeline treats it as a read-only
/// geodesy oracle for degree/pixel conversions; pixel extraction is done by
/// external tools against `color_path` / `gray_path`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Basemap {
    /// Low-resolution color basemap raster.
    pub color_path: PathBuf,
    /// Low-resolution single-band basemap raster.
    pub gray_path: PathBuf,
    /// Projection descriptor passed to the warp tool.
    pub proj4: String,
    pub low_res_mpp: f64,
    pub high_res_mpp: f64,
    /// Pixel dimensions of the full low-resolution basemap.
    pub width_pixels: u32,
    pub height_pixels: u32,
}

impl Basemap {
    /// Ratio converting a low-resolution pixel length into its
    /// high-resolution equivalent (> 1 for a higher-resolution target).
    pub fn low_to_high_factor(&self) -> f64 {
        self.low_res_mpp / self.high_res_mpp
    }

    /// Ratio converting a high-resolution pixel length into its
    /// low-resolution equivalent.
    pub fn high_to_low_factor(&self) -> f64 {
        self.high_res_mpp / self.low_res_mpp
    }

    fn pixels_per_degree(&self, high_res: bool) -> f64 {
        let low = self.width_pixels as f64 / 360.0;
        if high_res {
            low * self.low_to_high_factor()
        } else {
            low
        }
    }

    /// Projected units (meters) per degree at the equator.
    pub fn meters_per_degree(&self) -> f64 {
        self.low_res_mpp * self.pixels_per_degree(false)
    }

    /// Convert a degree ROI into a pixel ROI at the requested resolution.
    /// Pixel row 0 is the north edge (+90 lat), column 0 is -180 lon.
    pub fn degree_roi_to_pixel_roi(&self, roi: &Rect, high_res: bool) -> Rect {
        let ppd = self.pixels_per_degree(high_res);
        Rect::new(
            (roi.min_x + 180.0) * ppd,
            (roi.max_x + 180.0) * ppd,
            (90.0 - roi.max_y) * ppd,
            (90.0 - roi.min_y) * ppd,
        )
    }

    /// Convert a pixel ROI at the given resolution back into degrees.
    pub fn pixel_roi_to_degree_roi(&self, roi: &Rect, high_res: bool) -> Rect {
        let ppd = self.pixels_per_degree(high_res);
        Rect::new(
            roi.min_x / ppd - 180.0,
            roi.max_x / ppd - 180.0,
            90.0 - roi.max_y / ppd,
            90.0 - roi.min_y / ppd,
        )
    }

    /// Rescale a pixel ROI between the two basemap resolutions.
    pub fn convert_pixel_roi_resolution(&self, roi: &Rect, to_high_res: bool) -> Rect {
        if to_high_res {
            roi.scaled(self.low_to_high_factor())
        } else {
            roi.scaled(self.high_to_low_factor())
        }
    }

    /// Georeferencing of a low-resolution crop covering `degree_roi`,
    /// consistent with the sidecars the warp tool writes.
    pub fn crop_geo_info(&self, degree_roi: &Rect) -> GeoInfo {
        let mpd = self.meters_per_degree();
        let pixel_roi = self.degree_roi_to_pixel_roi(degree_roi, false);
        GeoInfo {
            projection_bounds: Rect::new(
                degree_roi.min_x * mpd,
                degree_roi.max_x * mpd,
                degree_roi.min_y * mpd,
                degree_roi.max_y * mpd,
            ),
            degree_bounds: *degree_roi,
            pixel_size: (self.low_res_mpp, -self.low_res_mpp),
            image_size: (
                pixel_roi.width().round() as u32,
                pixel_roi.height().round() as u32,
            ),
        }
    }
}
