use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::basemap::Basemap;
use crate::channels::{Channel, ChannelSet};
use crate::consts::HIGH_RES_TILE_SIZE;
use crate::error::{Result, TileforgeError};
use crate::tools::ToolPaths;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the source image set; prefixes every artifact file.
    pub set_name: String,
    /// Common base path of the five channel rasters
    /// (`<base>_<channel>.tif`). Ignored when `channels` is given.
    pub channel_base: Option<PathBuf>,
    /// Explicit per-channel raster paths in red, green, blue, nir, nadir
    /// order.
    pub channels: Option<Vec<PathBuf>>,
    pub output_folder: PathBuf,
    pub basemap: Basemap,
    #[serde(default)]
    pub tools: ToolPaths,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Worker-pool size for external-process fan-out. 1 runs serially.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Recompute every artifact even when its output already exists.
    #[serde(default)]
    pub force: bool,
}

fn default_tile_size() -> u32 {
    HIGH_RES_TILE_SIZE
}

fn default_workers() -> usize {
    4
}

impl PipelineConfig {
    /// Resolve the channel raster set, verifying all five files exist.
    pub fn channel_set(&self) -> Result<ChannelSet> {
        if let Some(paths) = &self.channels {
            let mut fixed: [PathBuf; 5] = Default::default();
            for (i, channel) in Channel::ALL.iter().enumerate() {
                fixed[i] = paths
                    .get(i)
                    .cloned()
                    .ok_or(TileforgeError::MissingChannel(*channel))?;
            }
            ChannelSet::new(fixed)
        } else {
            let base = self.channel_base.clone().unwrap_or_default();
            ChannelSet::from_base_path(&base)
        }
    }
}
