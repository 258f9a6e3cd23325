//! Adjacency-weighted color blending.
//!
//! Each tile's final color transform is a weighted combination of its own
//! solved transform and those of its 8-connected neighbors, weighted by
//! relative valid-pixel fraction. The blend itself is applied by the
//! external compositor; this module only decides the weights.

use std::path::PathBuf;

use crate::grid::{tile_prefix, TileGrid, TileRecord};

/// One neighbor's contribution to a tile's blended color transform.
#[derive(Clone, Debug)]
pub struct NeighborWeight {
    pub color_transform_path: PathBuf,
    /// Normalized blend weight.
    pub weight: f64,
    /// Grid offset of the neighbor relative to the tile, in {-1, 0, 1}.
    pub col_offset: i32,
    pub row_offset: i32,
}

/// The blend recipe for one tile: its own normalized weight plus an ordered
/// neighbor list. `main_weight + sum(neighbor weights) == 1`.
#[derive(Clone, Debug)]
pub struct BlendPlan {
    pub main_weight: f64,
    pub neighbors: Vec<NeighborWeight>,
}

/// Compute the blend plan for `tile` against its still-valid 8-connected
/// neighbors in the grid.
///
/// A neighbor's raw weight is `percent_valid(N) / percent_valid(T)`, so a
/// fully-valid neighbor beside a half-valid tile contributes twice as
/// strongly as the tile itself before normalization. The tile's own raw
/// weight is 1; all weights are normalized by the total so they sum to one
/// regardless of neighbor count.
pub fn blend_plan(tile: &TileRecord, grid: &TileGrid) -> BlendPlan {
    // Row-major over the 3x3 window, matching the compositor's expectation
    // of a stable neighbor order.
    let mut raw: Vec<(f64, &TileRecord, i32, i32)> = Vec::new();
    for row_offset in -1i32..=1 {
        for col_offset in -1i32..=1 {
            if row_offset == 0 && col_offset == 0 {
                continue;
            }
            let row = tile.tile_row as i64 + row_offset as i64;
            let col = tile.tile_col as i64 + col_offset as i64;
            if row < 0 || col < 0 {
                continue;
            }
            let Some(neighbor) = grid.get(&tile_prefix(row as u32, col as u32)) else {
                continue;
            };
            if !neighbor.still_valid {
                continue;
            }
            let weight = neighbor.percent_valid / tile.percent_valid;
            raw.push((weight, neighbor, col_offset, row_offset));
        }
    }

    let total_weight: f64 = 1.0 + raw.iter().map(|(w, ..)| w).sum::<f64>();
    BlendPlan {
        main_weight: 1.0 / total_weight,
        neighbors: raw
            .into_iter()
            .map(|(weight, neighbor, col_offset, row_offset)| NeighborWeight {
                color_transform_path: neighbor.artifacts.color_transform.clone(),
                weight: weight / total_weight,
                col_offset,
                row_offset,
            })
            .collect(),
    }
}
