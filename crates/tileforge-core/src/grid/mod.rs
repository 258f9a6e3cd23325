//! Tile-grid construction and metadata consolidation.

pub mod record;
pub mod split;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::basemap::Basemap;
use crate::channels::Channel;
use crate::consts::MIN_TILE_PERCENT_VALID;
use crate::error::{Result, TileforgeError};
use crate::geometry::{Rect, SpatialTransform};

pub use record::{tile_prefix, TileArtifacts, TileMeta, TileRecord};
pub use split::split_image;

/// The tile map for one source image, keyed by `"<row>_<col>"`.
#[derive(Debug, Default)]
pub struct TileGrid {
    tiles: BTreeMap<String, TileRecord>,
}

impl TileGrid {
    /// Consolidate the per-channel tile metadata lists into one record per
    /// grid cell.
    ///
    /// The five channels are tiled independently but from identical raster
    /// geometry, so their tile counts must agree; a mismatch means the
    /// warped channels diverged and the whole image is unusable. Only
    /// `percent_valid` varies by channel, and the consolidated value is the
    /// minimum. Near-empty tiles are dropped before a record is created.
    pub fn consolidate(
        channel_lists: &[Vec<TileMeta>; 5],
        tile_folder: &Path,
    ) -> Result<TileGrid> {
        let expected = channel_lists[0].len();
        for (channel, list) in Channel::ALL.iter().zip(channel_lists.iter()) {
            if list.len() != expected {
                return Err(TileforgeError::ChannelTileCountMismatch {
                    channel: *channel,
                    expected,
                    actual: list.len(),
                });
            }
        }

        let mut tiles = BTreeMap::new();
        let mut dropped = 0usize;
        for i in 0..expected {
            let first = &channel_lists[0][i];
            let percent_valid = channel_lists
                .iter()
                .map(|list| list[i].percent_valid)
                .fold(f64::INFINITY, f64::min);
            if percent_valid < MIN_TILE_PERCENT_VALID {
                dropped += 1;
                continue;
            }

            let channel_paths: [PathBuf; 5] =
                std::array::from_fn(|c| channel_lists[c][i].path.clone());
            let record = TileRecord {
                prefix: first.prefix.clone(),
                tile_row: first.tile_row,
                tile_col: first.tile_col,
                pixel_row: first.pixel_row,
                pixel_col: first.pixel_col,
                width_pixels: first.width_pixels,
                height_pixels: first.height_pixels,
                percent_valid,
                channel_paths,
                artifacts: TileArtifacts::new(tile_folder, &first.prefix),
                high_res_pixel_rect: None,
                degree_rect: None,
                still_valid: true,
            };
            tiles.insert(record.prefix.clone(), record);
        }

        info!(
            kept = tiles.len(),
            dropped, "Consolidated tile grid across channels"
        );
        Ok(TileGrid { tiles })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, prefix: &str) -> Option<&TileRecord> {
        self.tiles.get(prefix)
    }

    pub fn get_mut(&mut self, prefix: &str) -> Option<&mut TileRecord> {
        self.tiles.get_mut(prefix)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.tiles.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TileRecord)> {
        self.tiles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut TileRecord)> {
        self.tiles.iter_mut()
    }

    /// Tiles whose geographic footprint intersects the query ROI.
    pub fn tiles_overlapping<'a>(
        &'a self,
        degree_roi: &'a Rect,
    ) -> impl Iterator<Item = &'a TileRecord> {
        self.tiles.values().filter(move |tile| {
            tile.degree_rect
                .as_ref()
                .is_some_and(|rect| rect.overlaps(degree_roi))
        })
    }

    /// For every tile intersecting `degree_roi`, write a transform mapping
    /// the tile into the ROI's high-resolution pixel frame and return the
    /// transform path per tile key. `transform_id` keeps paths unique across
    /// concurrent queries.
    pub fn write_roi_transforms(
        &self,
        degree_roi: &Rect,
        transform_id: &str,
        basemap: &Basemap,
        tile_folder: &Path,
    ) -> Result<Vec<(String, PathBuf)>> {
        let roi_pixels = basemap.degree_roi_to_pixel_roi(degree_roi, true);
        let scaling = basemap.low_to_high_factor();

        let mut written = Vec::new();
        for tile in self.tiles_overlapping(degree_roi) {
            let file_name = if transform_id.is_empty() {
                format!("tile_to_tile_transform_{}.csv", tile.prefix)
            } else {
                format!("tile_to_tile_transform_{}_{transform_id}.csv", tile.prefix)
            };
            let output = tile_folder.join(file_name);

            // The stored transform targets the low-res basemap; bring it to
            // high res and subtract the ROI origin.
            let tf = SpatialTransform::read(&tile.artifacts.transform_to_low_res_base)?;
            let to_roi = SpatialTransform::new(
                1.0,
                tf.shift_x * scaling - roi_pixels.min_x,
                tf.shift_y * scaling - roi_pixels.min_y,
            );
            to_roi.write(&output)?;
            debug!(tile = %tile.prefix, output = %output.display(), "Wrote ROI transform");
            written.push((tile.prefix.clone(), output));
        }
        Ok(written)
    }
}
