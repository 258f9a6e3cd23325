/// Edge length (pixels) of a high-resolution tile. Edge tiles are truncated.
pub const HIGH_RES_TILE_SIZE: u32 = 1024;

/// Tiles with a smaller valid-pixel fraction than this are dropped outright.
pub const MIN_TILE_PERCENT_VALID: f64 = 0.01;

/// Margin (degrees longitude) added around the estimated image bounds when
/// cropping the basemap. Absorbs registration error so the content-based
/// refinement has a search window.
pub const CROP_BUFFER_LON: f64 = 1.0;

/// Margin (degrees latitude) added around the estimated image bounds.
pub const CROP_BUFFER_LAT: f64 = 1.0;

/// Number of spectral channels in a source image set.
pub const CHANNEL_COUNT: usize = 5;

/// Suffix appended to a tile raster path for its cached metadata record.
pub const TILE_METADATA_SUFFIX: &str = "_metadata.json";

/// Suffix appended to a warped raster path for its georeferencing sidecar.
pub const GEO_SIDECAR_SUFFIX: &str = ".geo.json";
