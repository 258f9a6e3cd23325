#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use image::{Rgb, RgbImage};
use tileforge_core::basemap::{Basemap, GeoInfo, GeoProbe};
use tileforge_core::dispatch::{ToolCommand, ToolRunner};
use tileforge_core::error::{Result, TileforgeError};
use tileforge_core::geometry::Rect;

/// Basemap used across tests: 50 -> 5 m/px, 20 px/deg at low resolution.
pub fn test_basemap(dir: &Path) -> Basemap {
    Basemap {
        color_path: dir.join("basemap_color.tif"),
        gray_path: dir.join("basemap_gray.tif"),
        proj4: "+proj=eqc +R=3396190 +units=m".into(),
        low_res_mpp: 50.0,
        high_res_mpp: 5.0,
        width_pixels: 7200,
        height_pixels: 3600,
    }
}

/// Write a small RGB raster where the first `valid_fraction` of pixels are
/// bright and the rest are background black.
pub fn write_raster(path: &Path, width: u32, height: u32, valid_fraction: f64) {
    let total = (width * height) as f64;
    let img = RgbImage::from_fn(width, height, |x, y| {
        let index = (y * width + x) as f64;
        if index < valid_fraction * total {
            Rgb([200, 180, 160])
        } else {
            Rgb([0, 0, 0])
        }
    });
    img.save(path).expect("write test raster");
}

/// Canned georeferencing for the warped nadir channel, consistent with
/// `test_basemap` (1000 projected units per degree).
pub fn nadir_geo_info() -> GeoInfo {
    GeoInfo {
        projection_bounds: Rect::new(10_000.0, 10_500.0, 20_000.0, 20_400.0),
        degree_bounds: Rect::new(10.0, 10.5, 20.0, 20.4),
        pixel_size: (50.0, -50.0),
        image_size: (8, 8),
    }
}

pub struct FakeGeoProbe {
    pub info: GeoInfo,
}

impl GeoProbe for FakeGeoProbe {
    fn geo_info(&self, _raster: &Path) -> Result<GeoInfo> {
        Ok(self.info.clone())
    }
}

/// Tool runner that simulates every external collaborator by writing the
/// output file its argument layout names, while recording all invocations.
/// Any invocation whose arguments contain a configured fail marker fails
/// instead.
pub struct SimulatedTools {
    pub invocations: Mutex<Vec<ToolCommand>>,
    pub fail_markers: HashSet<String>,
    /// Row count of the simulated whole-image brightness gains record.
    pub gains_rows: usize,
    /// Valid fraction per tile key for the simulated tiler, row-major over
    /// a 2x2 grid: 0_0, 0_1, 1_0, 1_1.
    pub tile_valid: [f64; 4],
}

impl Default for SimulatedTools {
    fn default() -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            fail_markers: HashSet::new(),
            gains_rows: 4,
            tile_valid: [1.0, 1.0, 0.5, 0.0],
        }
    }
}

impl SimulatedTools {
    pub fn failing_on(marker: &str) -> Self {
        let mut tools = Self::default();
        tools.fail_markers.insert(marker.to_string());
        tools
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    fn touch(path: &str) {
        fs::write(path, b"artifact").expect("write simulated artifact");
    }
}

impl ToolRunner for SimulatedTools {
    fn run(&self, command: &ToolCommand) -> Result<()> {
        self.invocations.lock().unwrap().push(command.clone());
        for marker in &self.fail_markers {
            if command.args.iter().any(|a| a.contains(marker.as_str())) {
                return Err(TileforgeError::ExternalTool {
                    program: command.program.clone(),
                    detail: format!("simulated failure ({marker})"),
                });
            }
        }

        let args = &command.args;
        let last = args.last().cloned().unwrap_or_default();
        match command.program.as_str() {
            // warp: <src> <out> -r cubicspline ...
            "gdalwarp" => Self::touch(&args[1]),
            // translate: band extraction or degree crop; output is last
            "gdal_translate" => Self::touch(&last),
            // tiler: last arg is "<prefix>%[filename:tile].tif"
            "convert" => {
                let prefix = last
                    .strip_suffix("%[filename:tile].tif")
                    .expect("tiler output template");
                let keys = ["0_0", "0_1", "1_0", "1_1"];
                for (key, valid) in keys.iter().zip(self.tile_valid) {
                    write_raster(Path::new(&format!("{prefix}{key}.tif")), 8, 8, valid);
                }
            }
            // mask: <out> <inputs...>; the low-res mask gets probed for size
            "makeImageMask" => write_raster(Path::new(&args[0]), 8, 8, 1.0),
            // register: <base> <target> <out> <scale> <estimate>
            "registerImage" => {
                fs::write(&args[2], "1.0, 10.0, 5.0\n").expect("write refined transform");
            }
            // brightness: <crop> <channels...> <registration> <out>
            "computeBrightnessCorrection" => {
                let mut record = format!("{}\n", self.gains_rows);
                for i in 0..self.gains_rows {
                    record.push_str(&format!("{}.000000, 0.0\n", i + 1));
                }
                fs::write(&last, record).expect("write gains");
            }
            // pairs: output last; solve: output first; composite: output
            // follows channels+mask and gains
            "writeColorPairs" => Self::touch(&last),
            "solveColorTransform" => Self::touch(&args[0]),
            "transformImageColor" => Self::touch(&args[7]),
            other => {
                return Err(TileforgeError::ExternalTool {
                    program: other.to_string(),
                    detail: "unknown simulated tool".into(),
                })
            }
        }
        Ok(())
    }
}
