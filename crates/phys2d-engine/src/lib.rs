//! Phys2D engine crate.
//!
//! Minimal windowed-rendering bootstrap: open a window, bind a graphics
//! context, clear/present/poll until escape or close, release everything.

pub mod coords;
pub mod device;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod platform;
pub mod scene;
pub mod time;

pub use coords::Point2D;
pub use engine::{EngineConfig, RenderEngine, RunOutcome};
pub use error::EngineError;
pub use scene::{Shape, ShapeKind};
