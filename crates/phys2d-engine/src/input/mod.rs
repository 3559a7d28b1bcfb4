//! Input types.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Platform backends translate their events into `KeyEvent`s.

pub(crate) mod platform;
mod types;

pub use types::{Key, KeyEvent, KeyState, Modifiers};
