//! Window/render lifecycle controller.
//!
//! [`RenderEngine`] is the single owner of the window for a run. It sequences
//! platform init, window creation, callback wiring, centering and the frame
//! loop, and always finishes with teardown.

mod config;
mod frame;
mod lifecycle;

pub use config::EngineConfig;
pub use frame::{AppControl, FrameCtx, FrameHook};
pub use lifecycle::{LifecycleState, Phase, RenderEngine, RunOutcome};
