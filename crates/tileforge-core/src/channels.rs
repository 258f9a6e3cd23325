use std::path::{Path, PathBuf};

use crate::error::{Result, TileforgeError};

/// One spectral band of the source multi-band image.
///
/// The order is significant and fixed for the lifetime of a source image:
/// every per-channel artifact list is indexed in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Nir,
    Nadir,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Red,
        Channel::Green,
        Channel::Blue,
        Channel::Nir,
        Channel::Nadir,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Nir => "nir",
            Channel::Nadir => "nadir",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Nir => 3,
            Channel::Nadir => 4,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered, fixed-cardinality set of the five channel raster paths for one
/// source image.
#[derive(Clone, Debug)]
pub struct ChannelSet {
    paths: [PathBuf; 5],
}

impl ChannelSet {
    /// Build from explicit per-channel paths, verifying each file exists.
    /// A missing channel is fatal for the whole image.
    pub fn new(paths: [PathBuf; 5]) -> Result<Self> {
        for (channel, path) in Channel::ALL.iter().zip(paths.iter()) {
            if !path.exists() {
                return Err(TileforgeError::MissingChannel(*channel));
            }
        }
        Ok(Self { paths })
    }

    /// Derive the conventional channel paths from a common base path:
    /// `<base>_<channel>.tif` for each of the five channels.
    pub fn from_base_path(base: &Path) -> Result<Self> {
        let base_str = base.to_string_lossy();
        let paths = Channel::ALL.map(|c| PathBuf::from(format!("{base_str}_{}.tif", c.name())));
        Self::new(paths)
    }

    pub fn path(&self, channel: Channel) -> &Path {
        &self.paths[channel.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &Path)> {
        Channel::ALL
            .iter()
            .map(move |c| (*c, self.paths[c.index()].as_path()))
    }
}
