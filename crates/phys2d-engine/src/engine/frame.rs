use crate::scene::ShapeList;
use crate::time::FrameTime;

/// Control directive returned by frame hooks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    /// Sets the close-requested flag; the loop ends before the next frame.
    Exit,
}

/// Per-frame context passed to the frame hook.
pub struct FrameCtx<'a> {
    pub time: FrameTime,
    pub shapes: &'a ShapeList,
}

/// Callback invoked once per frame, between clear and present.
pub type FrameHook = Box<dyn FnMut(&FrameCtx<'_>) -> AppControl>;
