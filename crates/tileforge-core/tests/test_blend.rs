use std::path::{Path, PathBuf};

use approx::assert_relative_eq;

use tileforge_core::blend::blend_plan;
use tileforge_core::grid::{tile_prefix, TileGrid, TileMeta};

fn meta(tile_row: u32, tile_col: u32, percent_valid: f64) -> TileMeta {
    TileMeta {
        path: PathBuf::from(format!("chan_tile_{tile_row}_{tile_col}.tif")),
        tile_row,
        tile_col,
        pixel_row: tile_row * 1024,
        pixel_col: tile_col * 1024,
        width_pixels: 1024,
        height_pixels: 1024,
        percent_valid,
        prefix: tile_prefix(tile_row, tile_col),
    }
}

fn grid_of(cells: &[(u32, u32, f64)]) -> TileGrid {
    let list: Vec<TileMeta> = cells.iter().map(|&(r, c, v)| meta(r, c, v)).collect();
    let lists = [
        list.clone(),
        list.clone(),
        list.clone(),
        list.clone(),
        list,
    ];
    TileGrid::consolidate(&lists, Path::new("tiles")).unwrap()
}

fn assert_weights_sum_to_one(grid: &TileGrid, key: &str) {
    let tile = grid.get(key).unwrap();
    let plan = blend_plan(tile, grid);
    let total: f64 = plan.main_weight + plan.neighbors.iter().map(|n| n.weight).sum::<f64>();
    assert_relative_eq!(total, 1.0, epsilon = 1e-9);
}

#[test]
fn weights_sum_to_one_for_any_neighbor_count() {
    // Isolated tile: zero neighbors.
    let isolated = grid_of(&[(5, 5, 0.8)]);
    let plan = blend_plan(isolated.get("5_5").unwrap(), &isolated);
    assert_eq!(plan.neighbors.len(), 0);
    assert_relative_eq!(plan.main_weight, 1.0, epsilon = 1e-9);

    // One neighbor.
    let pair = grid_of(&[(0, 0, 0.9), (0, 1, 0.6)]);
    assert_weights_sum_to_one(&pair, "0_0");

    // Three neighbors around a corner tile.
    let corner = grid_of(&[(0, 0, 0.5), (0, 1, 0.9), (1, 0, 0.7), (1, 1, 1.0)]);
    let plan = blend_plan(corner.get("0_0").unwrap(), &corner);
    assert_eq!(plan.neighbors.len(), 3);
    assert_weights_sum_to_one(&corner, "0_0");

    // Full 8-connected neighborhood.
    let mut cells = Vec::new();
    for r in 0..3 {
        for c in 0..3 {
            cells.push((r, c, 0.4 + 0.05 * (r * 3 + c) as f64));
        }
    }
    let full = grid_of(&cells);
    let plan = blend_plan(full.get("1_1").unwrap(), &full);
    assert_eq!(plan.neighbors.len(), 8);
    assert_weights_sum_to_one(&full, "1_1");
}

#[test]
fn fuller_neighbors_contribute_proportionally_more() {
    // A fully-valid neighbor beside a half-valid tile has raw weight 2,
    // twice the tile's own raw weight of 1.
    let grid = grid_of(&[(2, 2, 0.5), (2, 3, 1.0)]);
    let plan = blend_plan(grid.get("2_2").unwrap(), &grid);
    assert_eq!(plan.neighbors.len(), 1);
    assert_relative_eq!(plan.neighbors[0].weight / plan.main_weight, 2.0, epsilon = 1e-12);
}

#[test]
fn invalidated_neighbors_are_excluded() {
    let mut grid = grid_of(&[(1, 1, 0.8), (1, 2, 0.8), (2, 1, 0.8)]);
    grid.get_mut("1_2").unwrap().still_valid = false;

    let plan = blend_plan(grid.get("1_1").unwrap(), &grid);
    assert_eq!(plan.neighbors.len(), 1);
    assert!(plan.neighbors[0]
        .color_transform_path
        .to_string_lossy()
        .contains("2_1"));
    assert_weights_sum_to_one(&grid, "1_1");
}

#[test]
fn neighbor_order_is_row_major_with_offsets() {
    let mut cells = Vec::new();
    for r in 0..3 {
        for c in 0..3 {
            cells.push((r, c, 1.0));
        }
    }
    let grid = grid_of(&cells);
    let plan = blend_plan(grid.get("1_1").unwrap(), &grid);

    let offsets: Vec<(i32, i32)> = plan
        .neighbors
        .iter()
        .map(|n| (n.row_offset, n.col_offset))
        .collect();
    assert_eq!(
        offsets,
        vec![
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ]
    );
}
