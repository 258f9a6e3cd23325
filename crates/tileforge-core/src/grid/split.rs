use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::TILE_METADATA_SUFFIX;
use crate::dispatch::{run_if_missing, ToolRunner};
use crate::error::{Result, TileforgeError};
use crate::grid::record::{tile_prefix, TileMeta};
use crate::probe;
use crate::tools::{tile_cmd, ToolPaths};

/// Parse `(tile_row, tile_col)` from a tile file name of the form
/// `<stem>_tile_<row>_<col>.<ext>`.
fn parse_grid_position(file_name: &str) -> Result<(u32, u32)> {
    let err = || TileforgeError::TileNameParse(file_name.to_string());
    let after_marker = file_name
        .rsplit_once("_tile_")
        .map(|(_, rest)| rest)
        .ok_or_else(err)?;
    let stem = after_marker.rsplit_once('.').map_or(after_marker, |(s, _)| s);
    let (row, col) = stem.split_once('_').ok_or_else(err)?;
    Ok((row.parse().map_err(|_| err())?, col.parse().map_err(|_| err())?))
}

fn is_tile_file(file_name: &str) -> bool {
    file_name.contains("_tile_") && !file_name.ends_with(".json")
}

/// Load a tile's cached metadata record, or recompute and persist it.
///
/// Recomputation probes the raster for its dimensions and scores the
/// valid-pixel fraction as `1 - background / total`; both are expensive
/// enough that the sidecar cache is what keeps reruns cheap.
fn load_or_compute_meta(tile_path: &Path, tile_size: u32, force: bool) -> Result<TileMeta> {
    let mut sidecar = tile_path.as_os_str().to_owned();
    sidecar.push(TILE_METADATA_SUFFIX);
    let sidecar = PathBuf::from(sidecar);

    if !force && sidecar.exists() {
        let contents = fs::read_to_string(&sidecar)?;
        return Ok(serde_json::from_str(&contents)?);
    }

    let file_name = tile_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (tile_row, tile_col) = parse_grid_position(&file_name)?;
    let (width, height) = probe::image_size(tile_path)?;
    let percent_valid = probe::percent_valid(tile_path)?;

    let meta = TileMeta {
        path: tile_path.to_path_buf(),
        tile_row,
        tile_col,
        pixel_row: tile_row * tile_size,
        pixel_col: tile_col * tile_size,
        width_pixels: width,
        height_pixels: height,
        percent_valid,
        prefix: tile_prefix(tile_row, tile_col),
    };
    fs::write(&sidecar, serde_json::to_string(&meta)?)?;
    Ok(meta)
}

/// Split one warped channel raster into a grid of fixed-size tiles and
/// return the metadata record for every tile found on disk, ordered by grid
/// position.
///
/// The external tiler is only invoked when the `0_0` tile is absent, so a
/// rerun over an already-tiled folder touches nothing.
pub fn split_image(
    runner: &dyn ToolRunner,
    tools: &ToolPaths,
    image_path: &Path,
    output_folder: &Path,
    tile_size: u32,
    force: bool,
) -> Result<Vec<TileMeta>> {
    fs::create_dir_all(output_folder)?;

    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_prefix = output_folder.join(format!("{stem}_tile_"));
    let output_prefix = output_prefix.to_string_lossy().into_owned();
    let first_tile = PathBuf::from(format!("{output_prefix}0_0.tif"));

    let cmd = tile_cmd(tools, image_path, tile_size, &output_prefix);
    run_if_missing(runner, &cmd, &first_tile, force)?;

    let mut metas = Vec::new();
    for entry in fs::read_dir(output_folder)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_tile_file(&name) {
            continue;
        }
        metas.push(load_or_compute_meta(&entry.path(), tile_size, force)?);
    }
    metas.sort_by_key(|m| (m.tile_row, m.tile_col));
    debug!(
        image = %image_path.display(),
        tiles = metas.len(),
        "Split image into tiles"
    );
    Ok(metas)
}
