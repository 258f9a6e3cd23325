use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::basemap::GeoProbe;
use crate::blend::blend_plan;
use crate::brightness::BrightnessProfile;
use crate::channels::Channel;
use crate::consts::{CROP_BUFFER_LAT, CROP_BUFFER_LON};
use crate::dispatch::{run_if_missing, run_items, ItemOutcome, ToolRunner, WorkItem};
use crate::error::Result;
use crate::grid::{split_image, TileGrid, TileMeta};
use crate::probe;
use crate::register::register_image;
use crate::tools::{
    brightness_cmd, color_composite_cmd, color_pairs_cmd, color_solve_cmd, crop_degrees_cmd,
    grayscale_cmd, mask_cmd, warp_cmd,
};

use super::config::PipelineConfig;
use super::paths::ImagePaths;
use super::types::{PipelineStage, ProgressReporter, RunSummary};

/// Return the first failure among fan-out outcomes. Used for the warp
/// phases, where a missing warped channel makes the whole image unusable.
fn fail_fast(outcomes: Vec<(String, ItemOutcome)>) -> Result<()> {
    for (_, outcome) in outcomes {
        if let ItemOutcome::Failed(e) = outcome {
            return Err(e);
        }
    }
    Ok(())
}

/// Clear `still_valid` on every tile whose work item failed. Sibling tiles
/// keep processing; a cleared tile is never resurrected.
fn mark_failures(grid: &mut TileGrid, outcomes: Vec<(String, ItemOutcome)>) {
    for (key, outcome) in outcomes {
        if outcome.is_failed() {
            if let Some(tile) = grid.get_mut(&key) {
                tile.still_valid = false;
            }
        }
    }
}

/// Warp all five channels to the given ground resolution through the worker
/// pool and return the warped paths in channel order. Acts as a barrier:
/// every warp completes before the caller continues.
fn warp_channels(
    config: &PipelineConfig,
    runner: &dyn ToolRunner,
    paths: &ImagePaths,
    sources: &[(Channel, PathBuf)],
    postfix: &str,
    meters_per_pixel: f64,
) -> Result<Vec<PathBuf>> {
    let warped: Vec<PathBuf> = sources
        .iter()
        .map(|(_, src)| paths.warped_path(src, postfix))
        .collect();
    let items: Vec<WorkItem> = sources
        .iter()
        .zip(&warped)
        .map(|((channel, src), out)| WorkItem {
            key: channel.name().to_string(),
            command: warp_cmd(
                &config.tools,
                src,
                out,
                &config.basemap.proj4,
                meters_per_pixel,
            ),
            expected_output: out.clone(),
        })
        .collect();
    fail_fast(run_items(runner, &items, config.workers, config.force)?)?;
    Ok(warped)
}

/// Run the full registration and harmonization pipeline for one source
/// image.
///
/// Whole-image failures (missing channel, registration refinement, channel
/// tile-count mismatch) abort with an error; per-tile failures clear the
/// tile's `still_valid` flag and are reported in the summary without
/// stopping sibling tiles.
pub fn run_pipeline(
    config: &PipelineConfig,
    runner: &dyn ToolRunner,
    geo_probe: &dyn GeoProbe,
    reporter: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let channels = config.channel_set()?;
    let sources: Vec<(Channel, PathBuf)> = channels
        .iter()
        .map(|(c, p)| (c, p.to_path_buf()))
        .collect();
    let paths = ImagePaths::new(&config.output_folder, &config.set_name);
    fs::create_dir_all(&paths.output_folder)?;
    fs::create_dir_all(&paths.tile_folder)?;
    let force = config.force;
    let basemap = &config.basemap;

    info!(set = %config.set_name, "Starting low resolution processing");

    reporter.begin_stage(PipelineStage::LowResWarp, Some(sources.len()));
    let low_warped = warp_channels(
        config,
        runner,
        &paths,
        &sources,
        "_basemap_res",
        basemap.low_res_mpp,
    )?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::LowResMask, None);
    let cmd = mask_cmd(
        &config.tools,
        &paths.low_res_mask,
        low_warped.iter().map(PathBuf::as_path),
    );
    run_if_missing(runner, &cmd, &paths.low_res_mask, force)?;
    let low_res_mask_size = probe::image_size(&paths.low_res_mask)?;
    reporter.finish_stage();

    // Estimate the image's geographic extent from the warped nadir channel
    // and cut a basemap window around it. The margin absorbs registration
    // error so the refinement has a search window.
    let low_res_nadir = &low_warped[Channel::Nadir.index()];
    let mut crop_degree_bounds = geo_probe.geo_info(low_res_nadir)?.degree_bounds;
    info!(bounds = %crop_degree_bounds, "Estimated image bounds");
    crop_degree_bounds.expand(CROP_BUFFER_LON, CROP_BUFFER_LAT);
    let crop_pixel_bounds = basemap.degree_roi_to_pixel_roi(&crop_degree_bounds, false);

    reporter.begin_stage(PipelineStage::BasemapCrop, None);
    let cmd = crop_degrees_cmd(
        &config.tools,
        &basemap.color_path,
        &paths.basemap_crop,
        &crop_degree_bounds,
    );
    run_if_missing(runner, &cmd, &paths.basemap_crop, force)?;
    let cmd = grayscale_cmd(&config.tools, &paths.basemap_crop, &paths.basemap_gray_crop);
    run_if_missing(runner, &cmd, &paths.basemap_gray_crop, force)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Registration, None);
    let registration = register_image(
        runner,
        geo_probe,
        &config.tools,
        basemap,
        &paths,
        low_res_nadir,
        &crop_degree_bounds,
        &crop_pixel_bounds,
        low_res_mask_size,
        force,
    )?;
    reporter.finish_stage();

    // Whole-image brightness gains, one value per cropped-basemap row.
    reporter.begin_stage(PipelineStage::BrightnessGains, None);
    let cmd = brightness_cmd(
        &config.tools,
        &paths.basemap_crop,
        low_warped.iter().map(PathBuf::as_path),
        &paths.low_res_cropped_registration,
        &paths.brightness_gains,
    );
    run_if_missing(runner, &cmd, &paths.brightness_gains, force)?;
    reporter.finish_stage();

    info!(set = %config.set_name, "Starting high resolution processing");

    reporter.begin_stage(PipelineStage::HighResWarp, Some(sources.len()));
    let high_warped = warp_channels(
        config,
        runner,
        &paths,
        &sources,
        "_output_res",
        basemap.high_res_mpp,
    )?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::HighResMask, None);
    let cmd = mask_cmd(
        &config.tools,
        &paths.high_res_mask,
        high_warped.iter().map(PathBuf::as_path),
    );
    run_if_missing(runner, &cmd, &paths.high_res_mask, force)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Tiling, Some(sources.len()));
    let mut channel_lists: [Vec<TileMeta>; 5] = Default::default();
    for (i, (channel, _)) in sources.iter().enumerate() {
        channel_lists[channel.index()] = split_image(
            runner,
            &config.tools,
            &high_warped[channel.index()],
            &paths.channel_tile_folder(*channel),
            config.tile_size,
            force,
        )?;
        reporter.advance(i + 1);
    }
    let mut grid = TileGrid::consolidate(&channel_lists, &paths.tile_folder)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::TileTransforms, Some(grid.len()));
    let mut done = 0;
    for (_, tile) in grid.iter_mut() {
        tile.derive_bounds_and_transform(&registration.high_res_transform, basemap)?;
        done += 1;
        reporter.advance(done);
    }
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::TileMasks, Some(grid.len()));
    let items: Vec<WorkItem> = grid
        .iter()
        .map(|(key, tile)| WorkItem {
            key: key.clone(),
            command: mask_cmd(
                &config.tools,
                &tile.artifacts.tile_mask,
                tile.channel_paths.iter().map(PathBuf::as_path),
            ),
            expected_output: tile.artifacts.tile_mask.clone(),
        })
        .collect();
    let outcomes = run_items(runner, &items, config.workers, force)?;
    mark_failures(&mut grid, outcomes);
    reporter.finish_stage();

    // Personalized brightness gains per tile, resampled from the shared
    // low-resolution curve.
    reporter.begin_stage(PipelineStage::TileBrightness, Some(grid.len()));
    let profile = BrightnessProfile::read(&paths.brightness_gains)?;
    let scaling = basemap.high_to_low_factor();
    let mut done = 0;
    for (_, tile) in grid.iter() {
        done += 1;
        if !tile.still_valid || (!force && tile.artifacts.brightness_gains.exists()) {
            reporter.advance(done);
            continue;
        }
        let gains = profile.resample_for_tile(tile.pixel_row, tile.height_pixels, scaling);
        BrightnessProfile::write(&tile.artifacts.brightness_gains, &gains)?;
        reporter.advance(done);
    }
    reporter.finish_stage();

    // Phase 1: solve every tile's color transform. This must fully drain
    // before any composite runs, because compositing reads neighbors'
    // transform files.
    reporter.begin_stage(PipelineStage::ColorTransforms, Some(grid.len()));
    let keys: Vec<String> = grid.keys().cloned().collect();
    for (i, key) in keys.iter().enumerate() {
        let cmds = {
            let Some(tile) = grid.get(key) else { continue };
            if !tile.still_valid {
                continue;
            }
            let inputs = tile.channels_and_mask();
            let pairs = color_pairs_cmd(
                &config.tools,
                &basemap.color_path,
                inputs.iter().copied(),
                &tile.artifacts.transform_to_low_res_base,
                &tile.artifacts.brightness_gains,
                &tile.artifacts.color_pairs,
            );
            let solve = color_solve_cmd(
                &config.tools,
                &tile.artifacts.color_transform,
                &tile.artifacts.color_pairs,
            );
            (
                pairs,
                tile.artifacts.color_pairs.clone(),
                solve,
                tile.artifacts.color_transform.clone(),
            )
        };
        let (pairs_cmd, pairs_out, solve_cmd, solve_out) = cmds;
        let result = run_if_missing(runner, &pairs_cmd, &pairs_out, force)
            .and_then(|_| run_if_missing(runner, &solve_cmd, &solve_out, force));
        if let Err(e) = result {
            warn!(tile = %key, error = %e, "Color transform failed, excluding tile");
            if let Some(tile) = grid.get_mut(key) {
                tile.still_valid = false;
            }
        }
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    // Phase 2: adjacency-weighted composites, parallel across tiles.
    reporter.begin_stage(PipelineStage::ColorComposite, Some(grid.len()));
    let items: Vec<WorkItem> = grid
        .iter()
        .filter(|(_, tile)| tile.still_valid)
        .map(|(key, tile)| {
            let plan = blend_plan(tile, &grid);
            let inputs = tile.channels_and_mask();
            WorkItem {
                key: key.clone(),
                command: color_composite_cmd(
                    &config.tools,
                    inputs.iter().copied(),
                    &tile.artifacts.brightness_gains,
                    &tile.artifacts.new_color,
                    &tile.artifacts.color_transform,
                    &plan,
                ),
                expected_output: tile.artifacts.new_color.clone(),
            }
        })
        .collect();
    let outcomes = run_items(runner, &items, config.workers, force)?;
    mark_failures(&mut grid, outcomes);
    reporter.finish_stage();

    let failed_tiles: Vec<String> = grid
        .iter()
        .filter(|(_, tile)| !tile.still_valid)
        .map(|(key, _)| key.clone())
        .collect();
    let summary = RunSummary {
        tiles_total: grid.len(),
        tiles_completed: grid.len() - failed_tiles.len(),
        failed_tiles,
    };
    info!(
        set = %config.set_name,
        tiles = summary.tiles_total,
        failed = summary.failed_tiles.len(),
        "Pipeline finished"
    );
    Ok(summary)
}
