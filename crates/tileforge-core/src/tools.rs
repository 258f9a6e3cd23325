//! Command builders for the external collaborators.
//!
//! Every tool is invoked by path only: the contract is exit status plus
//! presence of the expected output file. The core decides when to run each
//! tool, with what arguments, and how to combine the outputs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blend::BlendPlan;
use crate::dispatch::ToolCommand;
use crate::geometry::Rect;

/// Program names (or full paths) of the external tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// Raster reprojection/resampling tool.
    pub warp: String,
    /// Band extraction and pixel-window cropping tool.
    pub translate: String,
    /// Grid tiler splitting one raster into fixed-size tiles.
    pub tiler: String,
    /// Binary valid-pixel mask generator.
    pub mask: String,
    /// Content-based registration refiner.
    pub register: String,
    /// Per-row brightness correction solver.
    pub brightness: String,
    /// Color-pair extractor.
    pub color_pairs: String,
    /// Color-transform solver.
    pub color_solve: String,
    /// Color compositor applying blended transforms and gains.
    pub color_composite: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            warp: "gdalwarp".into(),
            translate: "gdal_translate".into(),
            tiler: "convert".into(),
            mask: "makeImageMask".into(),
            register: "registerImage".into(),
            brightness: "computeBrightnessCorrection".into(),
            color_pairs: "writeColorPairs".into(),
            color_solve: "solveColorTransform".into(),
            color_composite: "transformImageColor".into(),
        }
    }
}

fn p(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Warp a raster into the basemap projection at the given ground resolution.
pub fn warp_cmd(
    tools: &ToolPaths,
    source: &Path,
    output: &Path,
    proj4: &str,
    meters_per_pixel: f64,
) -> ToolCommand {
    ToolCommand::new(&tools.warp)
        .arg(p(source))
        .arg(p(output))
        .args(["-r", "cubicspline", "-t_srs"])
        .arg(proj4)
        .arg("-tr")
        .arg(meters_per_pixel.to_string())
        .arg(meters_per_pixel.to_string())
        .arg("-overwrite")
}

/// Extract the first band of a raster, yielding a grayscale copy.
pub fn grayscale_cmd(tools: &ToolPaths, source: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new(&tools.translate)
        .args(["-b", "1"])
        .arg(p(source))
        .arg(p(output))
}

/// Crop a georeferenced raster to a degree ROI.
pub fn crop_degrees_cmd(
    tools: &ToolPaths,
    source: &Path,
    output: &Path,
    degree_roi: &Rect,
) -> ToolCommand {
    // -projwin takes upper-left then lower-right corners.
    ToolCommand::new(&tools.translate)
        .arg("-projwin")
        .arg(degree_roi.min_x.to_string())
        .arg(degree_roi.max_y.to_string())
        .arg(degree_roi.max_x.to_string())
        .arg(degree_roi.min_y.to_string())
        .arg(p(source))
        .arg(p(output))
}

/// Split a raster into a grid of `tile_size` tiles named
/// `<prefix><row>_<col>.tif`. Edge tiles are truncated by the tiler.
pub fn tile_cmd(
    tools: &ToolPaths,
    image: &Path,
    tile_size: u32,
    output_prefix: &str,
) -> ToolCommand {
    ToolCommand::new(&tools.tiler)
        .arg(p(image))
        .arg("-crop")
        .arg(format!("{tile_size}x{tile_size}"))
        .args(["-set", "filename:tile"])
        .arg(format!(
            "%[fx:page.y/{tile_size}]_%[fx:page.x/{tile_size}]"
        ))
        .args(["+repage", "+adjoin"])
        .arg(format!("{output_prefix}%[filename:tile].tif"))
}

/// Build a binary valid-pixel mask over a set of co-registered rasters.
pub fn mask_cmd<'a>(
    tools: &ToolPaths,
    output_mask: &Path,
    inputs: impl IntoIterator<Item = &'a Path>,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(&tools.mask).arg(p(output_mask));
    for input in inputs {
        cmd = cmd.arg(p(input));
    }
    cmd
}

/// Refine a spatial registration estimate against actual pixel content.
pub fn register_cmd(
    tools: &ToolPaths,
    base_gray: &Path,
    target: &Path,
    output_transform: &Path,
    scale: f64,
    estimate: &Path,
) -> ToolCommand {
    ToolCommand::new(&tools.register)
        .arg(p(base_gray))
        .arg(p(target))
        .arg(p(output_transform))
        .arg(scale.to_string())
        .arg(p(estimate))
}

/// Solve per-row brightness gains of the warped channels against the
/// cropped basemap.
pub fn brightness_cmd<'a>(
    tools: &ToolPaths,
    basemap_crop: &Path,
    low_res_channels: impl IntoIterator<Item = &'a Path>,
    cropped_registration: &Path,
    output_gains: &Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(&tools.brightness).arg(p(basemap_crop));
    for channel in low_res_channels {
        cmd = cmd.arg(p(channel));
    }
    cmd.arg(p(cropped_registration)).arg(p(output_gains))
}

/// Extract color pairs between one high-resolution tile and the basemap.
pub fn color_pairs_cmd<'a>(
    tools: &ToolPaths,
    basemap_color: &Path,
    tile_channels_and_mask: impl IntoIterator<Item = &'a Path>,
    tile_transform: &Path,
    tile_gains: &Path,
    output_pairs: &Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(&tools.color_pairs).arg(p(basemap_color));
    for input in tile_channels_and_mask {
        cmd = cmd.arg(p(input));
    }
    cmd.arg(p(tile_transform))
        .arg(p(tile_gains))
        .arg(p(output_pairs))
}

/// Solve a tile's color transform from its extracted color pairs.
pub fn color_solve_cmd(
    tools: &ToolPaths,
    output_transform: &Path,
    pairs: &Path,
) -> ToolCommand {
    ToolCommand::new(&tools.color_solve)
        .arg(p(output_transform))
        .arg(p(pairs))
}

/// Composite a tile's final color from its own transform, its brightness
/// gains, and the adjacency-weighted neighbor transforms.
pub fn color_composite_cmd<'a>(
    tools: &ToolPaths,
    tile_channels_and_mask: impl IntoIterator<Item = &'a Path>,
    tile_gains: &Path,
    output_color: &Path,
    tile_transform: &Path,
    plan: &BlendPlan,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(&tools.color_composite);
    for input in tile_channels_and_mask {
        cmd = cmd.arg(p(input));
    }
    cmd = cmd
        .arg(p(tile_gains))
        .arg(p(output_color))
        .arg(p(tile_transform))
        .arg(plan.main_weight.to_string());
    for neighbor in &plan.neighbors {
        cmd = cmd
            .arg(p(&neighbor.color_transform_path))
            .arg(neighbor.weight.to_string())
            .arg(neighbor.col_offset.to_string())
            .arg(neighbor.row_offset.to_string());
    }
    cmd
}
