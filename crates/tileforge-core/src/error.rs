use std::path::PathBuf;

use thiserror::Error;

use crate::channels::Channel;

#[derive(Error, Debug)]
pub enum TileforgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Missing input channel: {0}")]
    MissingChannel(Channel),

    #[error("Channel {channel} produced {actual} tiles, expected {expected}")]
    ChannelTileCountMismatch {
        channel: Channel,
        expected: usize,
        actual: usize,
    },

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("External tool `{program}` failed: {detail}")]
    ExternalTool { program: String, detail: String },

    #[error("Malformed record {path}: {detail}")]
    MalformedRecord { path: PathBuf, detail: String },

    #[error("Cannot parse tile grid position from file name: {0}")]
    TileNameParse(String),

    #[error("Brightness profile is empty")]
    EmptyProfile,
}

pub type Result<T> = std::result::Result<T, TileforgeError>;
