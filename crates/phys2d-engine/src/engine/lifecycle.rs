use core::fmt;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::coords::Point2D;
use crate::error::EngineError;
use crate::input::{Key, KeyEvent};
use crate::platform::{
    log_error_reporter, Platform, VideoMode, WindowHandle, WindowRequest, WinitPlatform,
};
use crate::scene::{Shape, ShapeList};
use crate::time::FrameClock;

use super::config::EngineConfig;
use super::frame::{AppControl, FrameCtx, FrameHook};

/// Where the controller is in its lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    WindowCreated,
    Visible,
    Running,
    /// Torn down. Reachable from every other state.
    Closed,
}

/// Lifecycle phases, in execution order. Used to attribute failures.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Init,
    CreateWindow,
    WireCallbacks,
    Center,
    FrameLoop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "platform init",
            Phase::CreateWindow => "window creation",
            Phase::WireCallbacks => "callback wiring",
            Phase::Center => "centering",
            Phase::FrameLoop => "frame loop",
        };
        f.write_str(name)
    }
}

/// Result of one `run()`. Teardown has completed in both cases.
#[derive(Debug)]
#[must_use]
pub enum RunOutcome {
    /// The loop observed the close-requested flag.
    Closed,
    /// A phase failed; the error was already logged.
    Failed { phase: Phase, error: EngineError },
}

impl RunOutcome {
    pub fn is_closed(&self) -> bool {
        matches!(self, RunOutcome::Closed)
    }

    pub fn failure(&self) -> Option<(Phase, &EngineError)> {
        match self {
            RunOutcome::Closed => None,
            RunOutcome::Failed { phase, error } => Some((*phase, error)),
        }
    }
}

type PhaseResult = Result<(), (Phase, EngineError)>;

/// Owns one window for one or more synchronous runs.
///
/// `run()` walks init → create → wire → center/show → loop and always ends in
/// teardown. Every acquisition is recorded in a field and released by
/// [`close`](Self::close), which is also called on drop.
pub struct RenderEngine<P: Platform = WinitPlatform> {
    config: EngineConfig,
    platform: P,

    /// `None` outside the window's lifetime; checked before every teardown step.
    window: Option<WindowHandle>,
    state: LifecycleState,
    active_phase: Phase,

    shapes: ShapeList,
    close_requested: Rc<Cell<bool>>,
    frame_hook: Option<FrameHook>,
    clock: FrameClock,

    // Teardown obligations.
    callbacks_bound: bool,
    subsystem_touched: bool,
    reporter_installed: bool,
}

impl RenderEngine<WinitPlatform> {
    /// Creates an engine on the winit/wgpu backend.
    pub fn new(width: i32, height: i32, title: &str) -> Result<Self, EngineError> {
        Self::with_platform(EngineConfig::new(width, height, title), WinitPlatform::new())
    }
}

impl<P: Platform> RenderEngine<P> {
    /// Creates an engine on an explicit platform. Nothing is acquired until `run()`.
    pub fn with_platform(config: EngineConfig, platform: P) -> Result<Self, EngineError> {
        config.validate()?;

        Ok(Self {
            config,
            platform,
            window: None,
            state: LifecycleState::Uninitialized,
            active_phase: Phase::Init,
            shapes: ShapeList::new(),
            close_requested: Rc::new(Cell::new(false)),
            frame_hook: None,
            clock: FrameClock::new(),
            callbacks_bound: false,
            subsystem_touched: false,
            reporter_installed: false,
        })
    }

    /// Installs the per-frame hook, replacing any previous one.
    pub fn on_frame<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&FrameCtx<'_>) -> AppControl + 'static,
    {
        self.frame_hook = Some(Box::new(hook));
        self
    }

    /// Appends a shape placeholder. It is not drawn.
    pub fn add_object(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &ShapeList {
        &self.shapes
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Runs the full lifecycle on the calling thread and blocks until the window
    /// closes or a phase fails.
    ///
    /// Never panics and never returns an error to the caller: failures (including
    /// panics raised inside a phase) are logged, teardown runs, and the outcome
    /// is returned for inspection.
    pub fn run(&mut self) -> RunOutcome {
        log::info!(
            "starting {} {} on {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            self.platform.describe()
        );

        self.state = LifecycleState::Uninitialized;
        self.close_requested.set(false);

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run_phases()));

        let outcome = match result {
            Ok(Ok(())) => RunOutcome::Closed,
            Ok(Err((phase, error))) => RunOutcome::Failed { phase, error },
            Err(payload) => RunOutcome::Failed {
                phase: self.active_phase,
                error: EngineError::Runtime(anyhow::anyhow!(
                    "panicked: {}",
                    panic_message(payload.as_ref())
                )),
            },
        };

        self.close();

        match &outcome {
            RunOutcome::Closed => {
                log::info!("window closed after {} frames", self.clock.frames());
            }
            RunOutcome::Failed { phase, error } => {
                log::error!(
                    "render engine failed during {phase} ({}): {}",
                    error.kind(),
                    error.report()
                );
            }
        }

        outcome
    }

    fn run_phases(&mut self) -> PhaseResult {
        self.enter(Phase::Init);
        self.init_platform().map_err(|e| (Phase::Init, e))?;

        self.enter(Phase::CreateWindow);
        let window = self.create_window().map_err(|e| (Phase::CreateWindow, e))?;

        self.enter(Phase::WireCallbacks);
        self.wire_callbacks(window).map_err(|e| (Phase::WireCallbacks, e))?;

        self.enter(Phase::Center);
        self.center_and_show(window).map_err(|e| (Phase::Center, e))?;

        self.enter(Phase::FrameLoop);
        self.frame_loop(window).map_err(|e| (Phase::FrameLoop, e))
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("entering {phase}");
        self.active_phase = phase;
    }

    fn init_platform(&mut self) -> Result<(), EngineError> {
        if self.platform.set_error_reporter(Some(log_error_reporter())).is_some() {
            log::debug!("replaced an existing platform error reporter");
        }
        self.reporter_installed = true;

        // Terminate is owed from the first attempt, even if init fails halfway.
        self.subsystem_touched = true;
        self.platform.init().map_err(EngineError::Initialization)?;

        self.state = LifecycleState::Initialized;
        Ok(())
    }

    fn create_window(&mut self) -> Result<WindowHandle, EngineError> {
        let request = WindowRequest {
            title: self.config.title.clone(),
            width: self.config.width,
            height: self.config.height,
            visible: false,
            resizable: self.config.resizable,
        };

        let window = self
            .platform
            .create_window(&request)
            .map_err(EngineError::WindowCreation)?;

        log::debug!(
            "created {window} ({}x{}, \"{}\")",
            request.width,
            request.height,
            request.title
        );

        self.window = Some(window);
        self.state = LifecycleState::WindowCreated;
        Ok(window)
    }

    fn wire_callbacks(&mut self, window: WindowHandle) -> Result<(), EngineError> {
        let flag = Rc::clone(&self.close_requested);
        self.platform.set_key_callback(
            window,
            Box::new(move |ev: &KeyEvent| {
                if ev.is_release_of(Key::Escape) {
                    log::debug!("escape released; close requested");
                    flag.set(true);
                }
            }),
        );

        let flag = Rc::clone(&self.close_requested);
        self.platform.set_close_callback(
            window,
            Box::new(move || {
                log::debug!("platform close request");
                flag.set(true);
            }),
        );
        self.callbacks_bound = true;

        self.platform
            .make_context_current(window)
            .map_err(EngineError::Runtime)?;
        self.platform
            .set_swap_interval(window, self.config.swap_interval)
            .map_err(EngineError::Runtime)?;

        Ok(())
    }

    fn center_and_show(&mut self, window: WindowHandle) -> Result<(), EngineError> {
        match self.platform.primary_video_mode() {
            Some(mode) => {
                let size = self.platform.window_size(window).map_err(EngineError::Runtime)?;
                let pos = centered_position(mode, size);
                self.platform
                    .set_window_pos(window, pos)
                    .map_err(EngineError::Runtime)?;
                log::debug!("centered {window} at {pos} on {}x{}", mode.width, mode.height);
            }
            None => log::debug!("no primary display; leaving {window} where the platform put it"),
        }

        self.platform.show_window(window).map_err(EngineError::Runtime)?;
        self.state = LifecycleState::Visible;
        Ok(())
    }

    fn frame_loop(&mut self, window: WindowHandle) -> Result<(), EngineError> {
        self.state = LifecycleState::Running;
        self.clock.reset();
        let clear_color = self.config.clear_color;

        while !self.close_requested.get() {
            self.platform
                .clear(window, clear_color)
                .map_err(EngineError::Runtime)?;

            let time = self.clock.tick();
            if let Some(hook) = self.frame_hook.as_mut() {
                let ctx = FrameCtx { time, shapes: &self.shapes };
                if hook(&ctx) == AppControl::Exit {
                    log::debug!("frame hook requested exit");
                    self.close_requested.set(true);
                }
            }

            self.platform
                .swap_buffers(window)
                .map_err(EngineError::Runtime)?;
            self.platform.poll_events().map_err(EngineError::Runtime)?;
        }

        Ok(())
    }

    /// Releases whatever `run()` acquired: callbacks, window, subsystem, error
    /// reporter, in that order. Repeated calls do nothing; before `run()` nothing
    /// is touched.
    pub fn close(&mut self) {
        let owed = self.window.is_some() || self.subsystem_touched || self.reporter_installed;

        if let Some(window) = self.window.take() {
            if std::mem::take(&mut self.callbacks_bound) {
                self.platform.clear_callbacks(window);
            }
            self.platform.destroy_window(window);
            log::debug!("destroyed {window}");
        }
        self.callbacks_bound = false;

        if std::mem::take(&mut self.subsystem_touched) {
            self.platform.terminate();
        }

        if std::mem::take(&mut self.reporter_installed) {
            drop(self.platform.set_error_reporter(None));
        }

        if owed || self.state != LifecycleState::Uninitialized {
            self.state = LifecycleState::Closed;
        }
    }
}

impl<P: Platform> Drop for RenderEngine<P> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Top-left position that centers a `window` (width, height) on `display`.
fn centered_position(display: VideoMode, window: (i32, i32)) -> Point2D {
    let free = Point2D::new(display.width, display.height).subtract(Point2D::from(window));
    Point2D::new(free.x / 2, free.y / 2)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
