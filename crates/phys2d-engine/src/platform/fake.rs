//! Recording platform for headless lifecycle tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::coords::{ColorRgba, Point2D};
use crate::input::KeyEvent;

use super::{
    CloseCallback, ErrorReport, ErrorReporter, HandleAllocator, KeyCallback, Platform, VideoMode,
    WindowHandle, WindowRequest,
};

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SetErrorReporter(bool),
    Init,
    Terminate,
    CreateWindow(WindowRequest),
    DestroyWindow(WindowHandle),
    SetKeyCallback(WindowHandle),
    SetCloseCallback(WindowHandle),
    ClearCallbacks(WindowHandle),
    WindowSize(WindowHandle),
    SetWindowPos(Point2D),
    ShowWindow(WindowHandle),
    PrimaryVideoMode,
    PollEvents,
    MakeContextCurrent(WindowHandle),
    SetSwapInterval(u32),
    Clear(ColorRgba),
    SwapBuffers(WindowHandle),
}

impl Call {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Call::SetErrorReporter(_) => "set_error_reporter",
            Call::Init => "init",
            Call::Terminate => "terminate",
            Call::CreateWindow(_) => "create_window",
            Call::DestroyWindow(_) => "destroy_window",
            Call::SetKeyCallback(_) => "set_key_callback",
            Call::SetCloseCallback(_) => "set_close_callback",
            Call::ClearCallbacks(_) => "clear_callbacks",
            Call::WindowSize(_) => "window_size",
            Call::SetWindowPos(_) => "set_window_pos",
            Call::ShowWindow(_) => "show_window",
            Call::PrimaryVideoMode => "primary_video_mode",
            Call::PollEvents => "poll_events",
            Call::MakeContextCurrent(_) => "make_context_current",
            Call::SetSwapInterval(_) => "set_swap_interval",
            Call::Clear(_) => "clear",
            Call::SwapBuffers(_) => "swap_buffers",
        }
    }
}

/// Input delivered to callbacks during a scripted `poll_events`.
#[derive(Debug, Clone)]
pub(crate) enum FakeEvent {
    Key(KeyEvent),
    CloseRequest,
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<Call>,
    live_windows: HashSet<WindowHandle>,
    reporter_installed: bool,
}

/// Shared view of what a `FakePlatform` saw. Outlives the platform itself.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Rc<RefCell<Recorded>>);

impl CallLog {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.0.borrow().calls.iter().map(Call::name).collect()
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.0.borrow().calls.iter().filter(|c| c.name() == name).count()
    }

    pub(crate) fn live_windows(&self) -> usize {
        self.0.borrow().live_windows.len()
    }

    pub(crate) fn reporters_installed(&self) -> usize {
        usize::from(self.0.borrow().reporter_installed)
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }
}

/// In-memory `Platform` with failure injection and scripted input.
///
/// `poll_events` gives up with an error after `poll_budget` polls so a test
/// that never closes the window fails instead of hanging.
pub(crate) struct FakePlatform {
    log: CallLog,
    failing: HashSet<&'static str>,
    panicking: HashSet<&'static str>,
    video_mode: Option<VideoMode>,
    window_size: (i32, i32),
    script: HashMap<usize, Vec<FakeEvent>>,
    poll_budget: usize,

    polls: usize,
    initialized: bool,
    handles: HandleAllocator,
    reporter: Option<ErrorReporter>,
    key_callbacks: HashMap<WindowHandle, KeyCallback>,
    close_callbacks: HashMap<WindowHandle, CloseCallback>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self {
            log: CallLog::default(),
            failing: HashSet::new(),
            panicking: HashSet::new(),
            video_mode: Some(VideoMode { width: 1920, height: 1080, refresh_rate_millihertz: None }),
            window_size: (500, 500),
            script: HashMap::new(),
            poll_budget: 1_000,
            polls: 0,
            initialized: false,
            handles: HandleAllocator::default(),
            reporter: None,
            key_callbacks: HashMap::new(),
            close_callbacks: HashMap::new(),
        }
    }

    pub(crate) fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Makes the named call return an error.
    pub(crate) fn failing(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    /// Makes the named call panic.
    pub(crate) fn panicking(mut self, op: &'static str) -> Self {
        self.panicking.insert(op);
        self
    }

    pub(crate) fn with_video_mode(mut self, mode: Option<VideoMode>) -> Self {
        self.video_mode = mode;
        self
    }

    pub(crate) fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Delivers `events` during the `index`-th call to `poll_events` (0-based).
    pub(crate) fn on_poll(mut self, index: usize, events: impl IntoIterator<Item = FakeEvent>) -> Self {
        self.script.entry(index).or_default().extend(events);
        self
    }

    fn record(&mut self, call: Call) -> Result<()> {
        let name = call.name();
        self.log.push(call);

        if self.panicking.contains(name) {
            panic!("injected panic in {name}");
        }
        if self.failing.contains(name) {
            if let Some(reporter) = self.reporter.as_mut() {
                reporter(&ErrorReport::new("fake", format!("injected failure in {name}")));
            }
            bail!("injected failure in {name}");
        }
        Ok(())
    }

    /// Records a call whose trait signature cannot fail.
    fn record_infallible(&mut self, call: Call) {
        let name = call.name();
        if let Err(e) = self.record(call) {
            panic!("{name} cannot fail in the Platform contract: {e}");
        }
    }
}

impl Platform for FakePlatform {
    fn describe(&self) -> String {
        "fake platform".to_string()
    }

    fn set_error_reporter(&mut self, reporter: Option<ErrorReporter>) -> Option<ErrorReporter> {
        self.log.push(Call::SetErrorReporter(reporter.is_some()));
        self.log.0.borrow_mut().reporter_installed = reporter.is_some();
        std::mem::replace(&mut self.reporter, reporter)
    }

    fn init(&mut self) -> Result<()> {
        self.record(Call::Init)?;
        self.initialized = true;
        Ok(())
    }

    fn terminate(&mut self) {
        self.record_infallible(Call::Terminate);
        self.initialized = false;
        self.key_callbacks.clear();
        self.close_callbacks.clear();
        self.log.0.borrow_mut().live_windows.clear();
    }

    fn create_window(&mut self, request: &WindowRequest) -> Result<WindowHandle> {
        self.record(Call::CreateWindow(request.clone()))?;
        if !self.initialized {
            bail!("create_window before init");
        }

        let handle = self.handles.next();
        self.log.0.borrow_mut().live_windows.insert(handle);
        Ok(handle)
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        self.record_infallible(Call::DestroyWindow(window));
        let removed = self.log.0.borrow_mut().live_windows.remove(&window);
        assert!(removed, "destroy_window on unknown handle {window}");
    }

    fn set_key_callback(&mut self, window: WindowHandle, callback: KeyCallback) {
        self.record_infallible(Call::SetKeyCallback(window));
        self.key_callbacks.insert(window, callback);
    }

    fn set_close_callback(&mut self, window: WindowHandle, callback: CloseCallback) {
        self.record_infallible(Call::SetCloseCallback(window));
        self.close_callbacks.insert(window, callback);
    }

    fn clear_callbacks(&mut self, window: WindowHandle) {
        self.record_infallible(Call::ClearCallbacks(window));
        self.key_callbacks.remove(&window);
        self.close_callbacks.remove(&window);
    }

    fn window_size(&self, window: WindowHandle) -> Result<(i32, i32)> {
        let call = Call::WindowSize(window);
        let name = call.name();
        self.log.push(call);
        if self.failing.contains(name) {
            bail!("injected failure in {name}");
        }
        Ok(self.window_size)
    }

    fn set_window_pos(&mut self, _window: WindowHandle, pos: Point2D) -> Result<()> {
        self.record(Call::SetWindowPos(pos))
    }

    fn show_window(&mut self, window: WindowHandle) -> Result<()> {
        self.record(Call::ShowWindow(window))
    }

    fn primary_video_mode(&self) -> Option<VideoMode> {
        self.log.push(Call::PrimaryVideoMode);
        self.video_mode
    }

    fn poll_events(&mut self) -> Result<()> {
        self.record(Call::PollEvents)?;

        let index = self.polls;
        self.polls += 1;
        if self.polls > self.poll_budget {
            bail!("poll budget of {} exhausted", self.poll_budget);
        }

        for event in self.script.remove(&index).unwrap_or_default() {
            match event {
                FakeEvent::Key(ev) => {
                    for cb in self.key_callbacks.values_mut() {
                        cb(&ev);
                    }
                }
                FakeEvent::CloseRequest => {
                    for cb in self.close_callbacks.values_mut() {
                        cb();
                    }
                }
            }
        }
        Ok(())
    }

    fn make_context_current(&mut self, window: WindowHandle) -> Result<()> {
        self.record(Call::MakeContextCurrent(window))
    }

    fn set_swap_interval(&mut self, _window: WindowHandle, interval: u32) -> Result<()> {
        self.record(Call::SetSwapInterval(interval))
    }

    fn clear(&mut self, _window: WindowHandle, color: ColorRgba) -> Result<()> {
        self.record(Call::Clear(color))
    }

    fn swap_buffers(&mut self, window: WindowHandle) -> Result<()> {
        self.record(Call::SwapBuffers(window))
    }
}
