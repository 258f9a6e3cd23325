use std::path::{Path, PathBuf};

use crate::channels::Channel;

/// Filesystem layout of every per-image artifact, derived once from the
/// output folder and the image set name.
#[derive(Clone, Debug)]
pub struct ImagePaths {
    pub output_folder: PathBuf,
    pub tile_folder: PathBuf,
    pub low_res_mask: PathBuf,
    pub high_res_mask: PathBuf,
    pub brightness_gains: PathBuf,
    pub basemap_crop: PathBuf,
    pub basemap_gray_crop: PathBuf,
    pub estimated_cropped_transform: PathBuf,
    pub low_res_cropped_registration: PathBuf,
    pub high_res_registration: PathBuf,
}

impl ImagePaths {
    pub fn new(output_folder: &Path, set_name: &str) -> Self {
        let base = output_folder.join(set_name);
        let with = |suffix: &str| -> PathBuf {
            let mut s = base.as_os_str().to_owned();
            s.push(suffix);
            PathBuf::from(s)
        };
        Self {
            output_folder: output_folder.to_path_buf(),
            tile_folder: output_folder.join("tiles"),
            low_res_mask: with("_low_res_mask.tif"),
            high_res_mask: with("_high_res_mask.tif"),
            brightness_gains: with("_brightness_gains.csv"),
            basemap_crop: with("_local_cropped_basemap.tif"),
            basemap_gray_crop: with("_local_gray_cropped_basemap.tif"),
            estimated_cropped_transform: with("_spatial_transform_cropped_estimated.csv"),
            low_res_cropped_registration: with("_low_res_cropped_spatial_transform.csv"),
            high_res_registration: with("_high_res_spatial_transform_basemap.csv"),
        }
    }

    /// Output path for a warped copy of `source`: the source file stem with
    /// a resolution postfix, placed in the output folder.
    pub fn warped_path(&self, source: &Path, postfix: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_folder.join(format!("{stem}{postfix}.tif"))
    }

    /// Folder holding one channel's tiles.
    pub fn channel_tile_folder(&self, channel: Channel) -> PathBuf {
        self.tile_folder.join(channel.name())
    }
}
