use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::basemap::Basemap;
use crate::error::Result;
use crate::geometry::{Rect, SpatialTransform};

/// Standard string key for a tile grid position.
pub fn tile_prefix(tile_row: u32, tile_col: u32) -> String {
    format!("{tile_row}_{tile_col}")
}

/// Cached metadata for one tile file of one channel, persisted as a JSON
/// sidecar next to the tile so reruns never recompute it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMeta {
    pub path: PathBuf,
    pub tile_row: u32,
    pub tile_col: u32,
    pub pixel_row: u32,
    pub pixel_col: u32,
    pub width_pixels: u32,
    pub height_pixels: u32,
    pub percent_valid: f64,
    pub prefix: String,
}

/// Paths of every artifact the external tools will produce for one tile.
#[derive(Clone, Debug)]
pub struct TileArtifacts {
    pub color_pairs: PathBuf,
    pub color_transform: PathBuf,
    pub new_color: PathBuf,
    pub brightness_gains: PathBuf,
    pub tile_mask: PathBuf,
    pub transform_to_low_res_base: PathBuf,
}

impl TileArtifacts {
    pub fn new(tile_folder: &Path, prefix: &str) -> Self {
        let base = tile_folder.join(format!("tile_{prefix}"));
        let with = |suffix: &str| -> PathBuf {
            let mut s = base.as_os_str().to_owned();
            s.push(suffix);
            PathBuf::from(s)
        };
        Self {
            color_pairs: with("_color_pairs.csv"),
            color_transform: with("_color_transform.csv"),
            new_color: with("_new_color.tif"),
            brightness_gains: with("_brightness_gains.csv"),
            tile_mask: with("_tile_mask.tif"),
            transform_to_low_res_base: with("_spatial_transform_to_low_res_base.csv"),
        }
    }
}

/// One surviving tile-grid cell: consolidated metadata across the five
/// channels plus everything downstream stages need to process the tile.
#[derive(Clone, Debug)]
pub struct TileRecord {
    pub prefix: String,
    pub tile_row: u32,
    pub tile_col: u32,
    pub pixel_row: u32,
    pub pixel_col: u32,
    pub width_pixels: u32,
    pub height_pixels: u32,
    /// Minimum valid-pixel fraction across the five channels.
    pub percent_valid: f64,
    /// Tile raster path per channel, in channel order.
    pub channel_paths: [PathBuf; 5],
    pub artifacts: TileArtifacts,
    /// This tile's footprint in high-resolution basemap pixels.
    pub high_res_pixel_rect: Option<Rect>,
    /// This tile's geographic footprint, used for ROI overlap queries.
    pub degree_rect: Option<Rect>,
    /// Cleared when a pipeline stage fails for this tile. Never set back.
    pub still_valid: bool,
}

impl TileRecord {
    /// The five channel tiles followed by the tile mask, the input set most
    /// color tools take.
    pub fn channels_and_mask(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self.channel_paths.iter().map(PathBuf::as_path).collect();
        paths.push(&self.artifacts.tile_mask);
        paths
    }

    /// Derive this tile's basemap footprint and its transform to the
    /// low-resolution basemap, then persist the transform record.
    ///
    /// Starting from the authoritative high-resolution registration, the
    /// tile's pixel origin translates the shift into the tile's local frame;
    /// the footprint converts to degrees through the basemap; and the
    /// `high -> low` resolution ratio rescales the transform so downstream
    /// tools can align the tile against the low-resolution basemap.
    pub fn derive_bounds_and_transform(
        &mut self,
        high_res_registration: &SpatialTransform,
        basemap: &Basemap,
    ) -> Result<SpatialTransform> {
        let min_col = high_res_registration.shift_x + self.pixel_col as f64;
        let min_row = high_res_registration.shift_y + self.pixel_row as f64;

        let high_res_rect = Rect::new(
            min_col,
            min_col + self.width_pixels as f64,
            min_row,
            min_row + self.height_pixels as f64,
        );
        self.high_res_pixel_rect = Some(high_res_rect);
        self.degree_rect = Some(basemap.pixel_roi_to_degree_roi(&high_res_rect, true));

        let scaling = basemap.high_to_low_factor();
        let transform = SpatialTransform::new(scaling, min_col * scaling, min_row * scaling);
        transform.write(&self.artifacts.transform_to_low_res_base)?;
        Ok(transform)
    }
}
