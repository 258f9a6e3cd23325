//! Brightness-gain resampling.
//!
//! The external brightness solver produces one gain per low-resolution
//! basemap row for the whole image. Each tile needs that curve resampled
//! onto its own high-resolution row range; linear interpolation against the
//! shared low-resolution curve keeps adjacent tiles free of brightness
//! seams.

use std::fs;
use std::path::Path;

use ndarray::Array1;

use crate::error::{Result, TileforgeError};

/// Per-row brightness gains indexed by low-resolution basemap row.
/// Immutable once loaded.
#[derive(Clone, Debug)]
pub struct BrightnessProfile {
    gains: Array1<f64>,
}

impl BrightnessProfile {
    pub fn new(gains: Array1<f64>) -> Result<Self> {
        if gains.is_empty() {
            return Err(TileforgeError::EmptyProfile);
        }
        Ok(Self { gains })
    }

    /// Load a gains record: a header line with the row count, then one
    /// `gain, 0.0` line per row (second column reserved).
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut lines = contents.lines();
        let header = lines.next().ok_or_else(|| TileforgeError::MalformedRecord {
            path: path.to_path_buf(),
            detail: "missing header line".into(),
        })?;
        let expected: usize =
            header
                .trim()
                .parse()
                .map_err(|_| TileforgeError::MalformedRecord {
                    path: path.to_path_buf(),
                    detail: format!("header is not a row count: {header}"),
                })?;
        let mut gains = Vec::with_capacity(expected);
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let first = line.split(',').next().unwrap_or("").trim();
            let value: f64 = first.parse().map_err(|_| TileforgeError::MalformedRecord {
                path: path.to_path_buf(),
                detail: format!("not a number: {first}"),
            })?;
            gains.push(value);
        }
        if gains.len() != expected {
            return Err(TileforgeError::MalformedRecord {
                path: path.to_path_buf(),
                detail: format!("header says {expected} rows, found {}", gains.len()),
            });
        }
        Self::new(Array1::from(gains))
    }

    /// Persist in the same record shape `read` accepts.
    pub fn write(path: &Path, gains: &Array1<f64>) -> Result<()> {
        let mut out = String::with_capacity(16 * (gains.len() + 1));
        out.push_str(&format!("{}\n", gains.len()));
        for gain in gains {
            out.push_str(&format!("{gain:.6}, 0.0\n"));
        }
        fs::write(path, out)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Linearly interpolate the gain at a fractional row position, clamped
    /// to the profile bounds.
    pub fn sample(&self, position: f64) -> f64 {
        let last = (self.gains.len() - 1) as f64;
        let pos = position.clamp(0.0, last);
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;
        if lower == upper {
            return self.gains[lower];
        }
        let frac = pos - lower as f64;
        self.gains[lower] * (1.0 - frac) + self.gains[upper] * frac
    }

    /// Resample the profile onto a tile's row range. High-resolution row `r`
    /// in `[pixel_row, pixel_row + height)` samples the profile at
    /// `r * scaling`, where `scaling` converts high-resolution rows to their
    /// low-resolution equivalent.
    pub fn resample_for_tile(&self, pixel_row: u32, height: u32, scaling: f64) -> Array1<f64> {
        Array1::from_iter(
            (pixel_row..pixel_row + height).map(|r| self.sample(r as f64 * scaling)),
        )
    }
}
