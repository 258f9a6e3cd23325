//! Spatial-transform algebra and axis-aligned rectangles.
//!
//! These value types are the foundation for composing the multi-stage
//! scale/shift chains between camera pixels, basemap pixels at two
//! resolutions, and geographic degrees.

pub mod rect;
pub mod transform;

pub use rect::Rect;
pub use transform::SpatialTransform;
