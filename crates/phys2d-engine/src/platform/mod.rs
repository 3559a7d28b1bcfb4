//! Windowing + graphics platform boundary.
//!
//! The lifecycle controller drives everything through [`Platform`]; it never
//! touches winit or wgpu directly. [`WinitPlatform`] is the production backend.

mod winit;

#[cfg(test)]
pub(crate) mod fake;

use core::fmt;
use core::num::NonZeroU64;

use anyhow::Result;

use crate::coords::{ColorRgba, Point2D};
use crate::input::KeyEvent;

pub use self::winit::WinitPlatform;

/// Opaque window identifier issued by a platform.
///
/// Non-zero by construction; "no window" is `Option::None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WindowHandle(NonZeroU64);

impl WindowHandle {
    pub const fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Hands out sequential non-zero window handles.
#[derive(Debug)]
pub(crate) struct HandleAllocator {
    next: NonZeroU64,
}

impl HandleAllocator {
    pub(crate) fn next(&mut self) -> WindowHandle {
        let handle = WindowHandle(self.next);
        self.next = self.next.checked_add(1).unwrap_or(NonZeroU64::MIN);
        handle
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self { next: NonZeroU64::MIN }
    }
}

/// Parameters for a window creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    pub title: String,
    /// Requested inner size. Non-positive values are left to the platform to reject.
    pub width: i32,
    pub height: i32,
    pub visible: bool,
    pub resizable: bool,
}

/// Primary display mode, in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VideoMode {
    pub width: i32,
    pub height: i32,
    pub refresh_rate_millihertz: Option<u32>,
}

/// Non-fatal diagnostic raised by a platform backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Short category, e.g. "position" or "surface".
    pub code: &'static str,
    pub description: String,
}

impl ErrorReport {
    pub fn new(code: &'static str, description: impl Into<String>) -> Self {
        Self { code, description: description.into() }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)
    }
}

pub type ErrorReporter = Box<dyn FnMut(&ErrorReport)>;
pub type KeyCallback = Box<dyn FnMut(&KeyEvent)>;
pub type CloseCallback = Box<dyn FnMut()>;

/// Reporter that logs every diagnostic at error level and never fails.
pub fn log_error_reporter() -> ErrorReporter {
    Box::new(|report: &ErrorReport| {
        log::error!(target: "phys2d_engine::platform", "{report}");
    })
}

/// Services the lifecycle controller needs from a windowing + graphics stack.
///
/// All methods are called from the thread that owns the platform. Methods taking
/// a `WindowHandle` may assume it was returned by `create_window` and not yet
/// destroyed; teardown methods must tolerate repeated calls.
pub trait Platform {
    /// Human-readable backend name and version, for the startup log line.
    fn describe(&self) -> String;

    // ── subsystem ─────────────────────────────────────────────────────────

    /// Installs the diagnostic reporter, returning the previous one.
    fn set_error_reporter(&mut self, reporter: Option<ErrorReporter>) -> Option<ErrorReporter>;

    fn init(&mut self) -> Result<()>;

    /// Shuts the subsystem down, destroying any window still alive.
    /// Safe to call when not initialized.
    fn terminate(&mut self);

    // ── windows ───────────────────────────────────────────────────────────

    fn create_window(&mut self, request: &WindowRequest) -> Result<WindowHandle>;

    fn destroy_window(&mut self, window: WindowHandle);

    fn set_key_callback(&mut self, window: WindowHandle, callback: KeyCallback);

    /// Callback for OS close requests (title-bar close button and similar).
    fn set_close_callback(&mut self, window: WindowHandle, callback: CloseCallback);

    /// Detaches and drops every callback bound to `window`.
    fn clear_callbacks(&mut self, window: WindowHandle);

    /// Outer window size as `(width, height)`.
    fn window_size(&self, window: WindowHandle) -> Result<(i32, i32)>;

    fn set_window_pos(&mut self, window: WindowHandle, pos: Point2D) -> Result<()>;

    fn show_window(&mut self, window: WindowHandle) -> Result<()>;

    /// `None` when no primary display can be determined.
    fn primary_video_mode(&self) -> Option<VideoMode>;

    /// Dispatches pending events to callbacks without blocking.
    fn poll_events(&mut self) -> Result<()>;

    // ── graphics ──────────────────────────────────────────────────────────

    /// Binds a graphics context to `window` on the calling thread.
    fn make_context_current(&mut self, window: WindowHandle) -> Result<()>;

    /// 0 disables vsync; 1 waits for one display refresh per present.
    fn set_swap_interval(&mut self, window: WindowHandle, interval: u32) -> Result<()>;

    /// Clears the back buffer's color and depth.
    fn clear(&mut self, window: WindowHandle, color: ColorRgba) -> Result<()>;

    /// Presents the back buffer.
    fn swap_buffers(&mut self, window: WindowHandle) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_sequential_and_non_zero() {
        let mut alloc = HandleAllocator::default();
        assert_eq!(alloc.next().get(), 1);
        assert_eq!(alloc.next().get(), 2);
    }

    #[test]
    fn report_display() {
        let r = ErrorReport::new("surface", "timeout");
        assert_eq!(r.to_string(), "[surface] timeout");
    }
}
