use std::fs;
use std::path::Path;

use crate::error::{Result, TileforgeError};
use crate::geometry::Rect;

/// Affine scale + shift mapping between two pixel coordinate spaces.
///
/// A source pixel `(x, y)` maps to `(scale*x + shift_x, scale*y + shift_y)`
/// in the target raster. `scale` is always positive. Values are created fresh
/// per transform stage and never mutated after being handed to a consumer;
/// callers copy before adjusting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialTransform {
    pub scale: f64,
    pub shift_x: f64,
    pub shift_y: f64,
}

impl Default for SpatialTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }
}

impl SpatialTransform {
    pub fn new(scale: f64, shift_x: f64, shift_y: f64) -> Self {
        debug_assert!(scale > 0.0);
        Self {
            scale,
            shift_x,
            shift_y,
        }
    }

    /// Apply the transform to a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.scale * x + self.shift_x, self.scale * y + self.shift_y)
    }

    /// Compose with a resolution change: scale and both shift components are
    /// multiplied by `factor`.
    pub fn rescaled(&self, factor: f64) -> SpatialTransform {
        SpatialTransform {
            scale: self.scale * factor,
            shift_x: self.shift_x * factor,
            shift_y: self.shift_y * factor,
        }
    }

    /// The rectangle of the given pixel size anchored at this transform's
    /// shift in the target raster.
    pub fn to_rect(&self, width: f64, height: f64) -> Rect {
        Rect::new(
            self.shift_x,
            self.shift_x + width,
            self.shift_y,
            self.shift_y + height,
        )
    }

    /// Identity-scale transform whose shift is the rectangle's minimum corner.
    pub fn from_rect(rect: &Rect) -> SpatialTransform {
        SpatialTransform {
            scale: 1.0,
            shift_x: rect.min_x,
            shift_y: rect.min_y,
        }
    }

    /// Read the three-field textual record every pipeline stage shares.
    pub fn read(path: &Path) -> Result<SpatialTransform> {
        let contents = fs::read_to_string(path)?;
        let fields: Vec<&str> = contents
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if fields.len() != 3 {
            return Err(TileforgeError::MalformedRecord {
                path: path.to_path_buf(),
                detail: format!("expected 3 fields, found {}", fields.len()),
            });
        }
        let parse = |s: &str| -> Result<f64> {
            s.parse().map_err(|_| TileforgeError::MalformedRecord {
                path: path.to_path_buf(),
                detail: format!("not a number: {s}"),
            })
        };
        let scale = parse(fields[0])?;
        if scale <= 0.0 {
            return Err(TileforgeError::MalformedRecord {
                path: path.to_path_buf(),
                detail: format!("scale must be positive, found {scale}"),
            });
        }
        Ok(SpatialTransform {
            scale,
            shift_x: parse(fields[1])?,
            shift_y: parse(fields[2])?,
        })
    }

    /// Persist as `scale, shiftX, shiftY` on a single line.
    pub fn write(&self, path: &Path) -> Result<()> {
        let record = format!("{:.12}, {:.12}, {:.12}\n", self.scale, self.shift_x, self.shift_y);
        fs::write(path, record)?;
        Ok(())
    }
}
