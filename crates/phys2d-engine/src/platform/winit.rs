use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::error::OsError;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::coords::{ColorRgba, Point2D};
use crate::device::{present_mode_for_interval, Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
use crate::input::platform::{map_modifiers, translate_key_event};
use crate::input::Modifiers;

use super::{
    CloseCallback, ErrorReport, ErrorReporter, HandleAllocator, KeyCallback, Platform, VideoMode,
    WindowHandle, WindowRequest,
};

/// Production platform: winit for windows/input, wgpu for the graphics context.
///
/// The winit `EventLoop` is created on the first `init` and kept for the life of
/// the platform, since winit refuses to create a second one in a process.
/// `terminate` destroys every window and GPU context but leaves the loop alive.
///
/// Events are dispatched with `pump_app_events` and a zero timeout, so
/// `poll_events` never blocks.
pub struct WinitPlatform {
    gpu_init: GpuInit,
    event_loop: Option<EventLoop<()>>,
    initialized: bool,
    state: PlatformState,
}

impl WinitPlatform {
    pub fn new() -> Self {
        Self::with_gpu_init(GpuInit::default())
    }

    pub fn with_gpu_init(gpu_init: GpuInit) -> Self {
        Self {
            gpu_init,
            event_loop: None,
            initialized: false,
            state: PlatformState::default(),
        }
    }

    fn pump(&mut self) -> Result<()> {
        let event_loop = self
            .event_loop
            .as_mut()
            .context("windowing subsystem is not initialized")?;

        match event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
            PumpStatus::Continue => Ok(()),
            PumpStatus::Exit(code) => {
                self.state.report(ErrorReport::new(
                    "event-loop",
                    format!("event loop exited with code {code}"),
                ));
                bail!("winit event loop exited with code {code}")
            }
        }
    }
}

impl Default for WinitPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Option<Gpu<'this>>,
}

struct WindowSlot {
    // Declared first so an in-flight frame drops before its surface.
    pending: Option<GpuFrame>,
    key_callback: Option<KeyCallback>,
    close_callback: Option<CloseCallback>,
    id: WindowId,
    entry: WindowEntry,
}

/// Everything the winit `ApplicationHandler` touches while events are pumped.
#[derive(Default)]
struct PlatformState {
    reporter: Option<ErrorReporter>,
    handles: HandleAllocator,
    windows: HashMap<WindowHandle, WindowSlot>,
    ids: HashMap<WindowId, WindowHandle>,
    modifiers: Modifiers,

    create_request: Option<WindowAttributes>,
    create_result: Option<std::result::Result<Window, OsError>>,
}

impl PlatformState {
    fn report(&mut self, report: ErrorReport) {
        match self.reporter.as_mut() {
            Some(reporter) => reporter(&report),
            None => log::warn!(target: "phys2d_engine::platform", "unreported: {report}"),
        }
    }

    fn slot(&self, handle: WindowHandle) -> Result<&WindowSlot> {
        self.windows
            .get(&handle)
            .ok_or_else(|| anyhow!("unknown window handle {handle}"))
    }

    fn slot_mut(&mut self, handle: WindowHandle) -> Result<&mut WindowSlot> {
        self.windows
            .get_mut(&handle)
            .ok_or_else(|| anyhow!("unknown window handle {handle}"))
    }

    fn service_create_request(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attrs) = self.create_request.take() {
            self.create_result = Some(event_loop.create_window(attrs));
        }
    }

    fn remove_window(&mut self, handle: WindowHandle) -> bool {
        match self.windows.remove(&handle) {
            Some(slot) => {
                self.ids.remove(&slot.id);
                true
            }
            None => false,
        }
    }
}

impl ApplicationHandler for PlatformState {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, _cause: StartCause) {
        self.service_create_request(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.service_create_request(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(&handle) = self.ids.get(&window_id) else {
            return;
        };
        let modifiers = self.modifiers;
        let Some(slot) = self.windows.get_mut(&handle) else {
            return;
        };

        match &event {
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let ev = translate_key_event(event, modifiers);
                if let Some(cb) = slot.key_callback.as_mut() {
                    cb(&ev);
                }
            }

            WindowEvent::CloseRequested => {
                if let Some(cb) = slot.close_callback.as_mut() {
                    cb();
                }
            }

            // Keeps the swapchain matching the window; no layout is involved.
            WindowEvent::Resized(new_size) => {
                slot.pending = None;
                slot.entry.with_gpu_mut(|gpu| {
                    if let Some(gpu) = gpu {
                        gpu.resize(*new_size);
                    }
                });
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                slot.pending = None;
                let new_size = slot.entry.with_window(|w| w.inner_size());
                slot.entry.with_gpu_mut(|gpu| {
                    if let Some(gpu) = gpu {
                        gpu.resize(new_size);
                    }
                });
            }

            _ => {}
        }
    }
}

impl Platform for WinitPlatform {
    fn describe(&self) -> String {
        "winit 0.30 + wgpu 28".to_string()
    }

    fn set_error_reporter(&mut self, reporter: Option<ErrorReporter>) -> Option<ErrorReporter> {
        std::mem::replace(&mut self.state.reporter, reporter)
    }

    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        if self.event_loop.is_none() {
            let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
            event_loop.set_control_flow(ControlFlow::Poll);
            self.event_loop = Some(event_loop);
        }

        self.initialized = true;
        log::debug!("winit event loop ready");
        Ok(())
    }

    fn terminate(&mut self) {
        if !self.initialized {
            return;
        }

        let handles: Vec<_> = self.state.windows.keys().copied().collect();
        for handle in handles {
            log::warn!("window {handle} still alive at terminate; destroying it");
            self.state.remove_window(handle);
        }

        // Let the OS see the destroyed windows before going idle.
        if let Err(e) = self.pump() {
            log::debug!("final event pump failed: {e:#}");
        }

        self.state.create_request = None;
        self.state.create_result = None;
        self.initialized = false;
        log::debug!("windowing subsystem terminated");
    }

    fn create_window(&mut self, request: &WindowRequest) -> Result<WindowHandle> {
        anyhow::ensure!(self.initialized, "windowing subsystem is not initialized");
        anyhow::ensure!(
            request.width > 0 && request.height > 0,
            "invalid window size {}x{}",
            request.width,
            request.height
        );

        let attrs = Window::default_attributes()
            .with_title(request.title.clone())
            .with_inner_size(LogicalSize::new(request.width as f64, request.height as f64))
            .with_visible(request.visible)
            .with_resizable(request.resizable);

        // winit 0.30 only creates windows from inside the running loop.
        self.state.create_request = Some(attrs);
        self.state.create_result = None;
        self.pump()?;

        let window = self
            .state
            .create_result
            .take()
            .context("event loop did not service the window request")?
            .context("failed to create window")?;

        let id = window.id();
        let entry = WindowEntryBuilder {
            window,
            gpu_builder: |_| None,
        }
        .build();

        let handle = self.state.handles.next();
        self.state.ids.insert(id, handle);
        self.state.windows.insert(
            handle,
            WindowSlot {
                pending: None,
                key_callback: None,
                close_callback: None,
                id,
                entry,
            },
        );

        Ok(handle)
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        if !self.state.remove_window(window) {
            log::debug!("destroy_window: {window} already gone");
        }
    }

    fn set_key_callback(&mut self, window: WindowHandle, callback: KeyCallback) {
        match self.state.slot_mut(window) {
            Ok(slot) => slot.key_callback = Some(callback),
            Err(e) => log::warn!("set_key_callback: {e:#}"),
        }
    }

    fn set_close_callback(&mut self, window: WindowHandle, callback: CloseCallback) {
        match self.state.slot_mut(window) {
            Ok(slot) => slot.close_callback = Some(callback),
            Err(e) => log::warn!("set_close_callback: {e:#}"),
        }
    }

    fn clear_callbacks(&mut self, window: WindowHandle) {
        if let Ok(slot) = self.state.slot_mut(window) {
            slot.key_callback = None;
            slot.close_callback = None;
        }
    }

    fn window_size(&self, window: WindowHandle) -> Result<(i32, i32)> {
        let size = self.state.slot(window)?.entry.with_window(|w| w.outer_size());
        Ok((size.width as i32, size.height as i32))
    }

    fn set_window_pos(&mut self, window: WindowHandle, pos: Point2D) -> Result<()> {
        let supported = self.state.slot(window)?.entry.with_window(|w| {
            // Wayland has no global positions; `outer_position` is the only probe winit offers.
            let supported = w.outer_position().is_ok();
            if supported {
                w.set_outer_position(PhysicalPosition::new(pos.x, pos.y));
            }
            supported
        });

        if !supported {
            log::debug!("{window}: window positioning unsupported; leaving it where the compositor put it");
        }
        Ok(())
    }

    fn show_window(&mut self, window: WindowHandle) -> Result<()> {
        self.state.slot(window)?.entry.with_window(|w| w.set_visible(true));
        Ok(())
    }

    fn primary_video_mode(&self) -> Option<VideoMode> {
        let monitor = self
            .state
            .windows
            .values()
            .find_map(|slot| slot.entry.with_window(|w| w.primary_monitor()))?;

        let size = monitor.size();
        Some(VideoMode {
            width: size.width as i32,
            height: size.height as i32,
            refresh_rate_millihertz: monitor.refresh_rate_millihertz(),
        })
    }

    fn poll_events(&mut self) -> Result<()> {
        self.pump()
    }

    fn make_context_current(&mut self, window: WindowHandle) -> Result<()> {
        let gpu_init = self.gpu_init.clone();
        let slot = self.state.slot_mut(window)?;

        slot.entry.with_mut(|fields| -> Result<()> {
            if fields.gpu.is_some() {
                return Ok(());
            }

            let gpu = pollster::block_on(Gpu::new(fields.window, gpu_init))
                .context("failed to create graphics context")?;

            let info = gpu.adapter_info();
            log::info!(
                "graphics context bound: {} ({:?}), surface format {:?}",
                info.name,
                info.backend,
                gpu.surface_format()
            );

            *fields.gpu = Some(gpu);
            Ok(())
        })
    }

    fn set_swap_interval(&mut self, window: WindowHandle, interval: u32) -> Result<()> {
        let requested = present_mode_for_interval(interval);
        let active = self.state.slot_mut(window)?.entry.with_gpu_mut(|gpu| {
            let gpu = gpu.as_mut().context("no graphics context bound to window")?;
            gpu.set_present_mode(requested);
            Ok::<_, anyhow::Error>(gpu.present_mode())
        })?;

        log::debug!("{window}: swap interval {interval} -> {active:?}");
        Ok(())
    }

    fn clear(&mut self, window: WindowHandle, color: ColorRgba) -> Result<()> {
        let state = &mut self.state;
        let slot = state
            .windows
            .get_mut(&window)
            .ok_or_else(|| anyhow!("unknown window handle {window}"))?;

        let pending = &mut slot.pending;
        let skipped = slot.entry.with_gpu_mut(|gpu| -> Result<Option<SurfaceErrorAction>> {
            let gpu = gpu.as_mut().context("no graphics context bound to window")?;

            if let Some(frame) = pending.as_mut() {
                gpu.clear(frame, color);
                return Ok(None);
            }

            match gpu.begin_frame() {
                Ok(mut frame) => {
                    gpu.clear(&mut frame, color);
                    *pending = Some(frame);
                    Ok(None)
                }
                Err(err) => {
                    let detail = err.to_string();
                    match gpu.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => bail!("surface acquisition failed: {detail}"),
                        action => Ok(Some(action)),
                    }
                }
            }
        })?;

        if let Some(action) = skipped {
            state.report(ErrorReport::new(
                "surface",
                format!("{window}: frame skipped ({action:?})"),
            ));
        }
        Ok(())
    }

    fn swap_buffers(&mut self, window: WindowHandle) -> Result<()> {
        let slot = self.state.slot_mut(window)?;
        let Some(frame) = slot.pending.take() else {
            return Ok(());
        };

        slot.entry.with(|fields| {
            if let Some(gpu) = fields.gpu.as_ref() {
                fields.window.pre_present_notify();
                gpu.submit(frame);
            }
        });
        Ok(())
    }
}
