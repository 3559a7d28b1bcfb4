//! Scene placeholders.
//!
//! The scene is an append-only list of shape descriptors. It is kept as an
//! extension point; the render loop only clears and presents.

mod list;
mod shape;

pub use list::ShapeList;
pub use shape::{Shape, ShapeKind};
