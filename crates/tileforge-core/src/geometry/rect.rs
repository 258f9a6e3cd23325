use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box. Units are either raster pixels or geographic
/// degrees, never mixed within one value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when the two rectangles share any area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Inflate the rectangle outward by `dx` on each side horizontally and
    /// `dy` vertically. Negative margins are ignored; expansion never shrinks.
    pub fn expand(&mut self, dx: f64, dy: f64) {
        let dx = dx.max(0.0);
        let dy = dy.max(0.0);
        self.min_x -= dx;
        self.max_x += dx;
        self.min_y -= dy;
        self.max_y += dy;
    }

    /// Translate by `(dx, dy)`.
    pub fn shifted(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            min_x: self.min_x + dx,
            max_x: self.max_x + dx,
            min_y: self.min_y + dy,
            max_y: self.max_y + dy,
        }
    }

    /// Scale all four edges by a positive factor about the origin.
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect {
            min_x: self.min_x * factor,
            max_x: self.max_x * factor,
            min_y: self.min_y * factor,
            max_y: self.max_y * factor,
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}] x [{:.4}, {:.4}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}
