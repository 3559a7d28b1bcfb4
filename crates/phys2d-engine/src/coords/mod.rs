//! Coordinate and color value types.
//!
//! Canonical space for window placement:
//! - Physical pixels (integers)
//! - Origin top-left of the primary display
//! - +X right, +Y down

mod color;
mod point;

pub use color::ColorRgba;
pub use point::Point2D;
