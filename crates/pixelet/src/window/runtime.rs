use std::time::Duration;

use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as NativeWindow, WindowAttributes, WindowId};

use crate::coords::Viewport;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::error::{PixeletError, Result};
use crate::input::platform::translate_window_event;
use crate::input::{InputFrame, InputState, Key, KeyDispatcher, SubscriptionId};
use crate::paint::Color;
use crate::render::{Canvas, Gfx, WgpuBackend};
use crate::time::{FrameClock, FrameTime};

use super::config::{size_limits, WindowConfig};

/// Pumps allowed for the platform to deliver `resumed` at startup.
const STARTUP_PUMPS: usize = 16;

#[self_referencing]
struct WindowEntry {
    window: NativeWindow,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// `ApplicationHandler` that creates the window on resume and queues events.
///
/// The window drains the queue itself after each pump, so no user code runs
/// inside winit callbacks.
struct EventCollector {
    attributes: Option<WindowAttributes>,
    created: Option<std::result::Result<NativeWindow, OsError>>,
    events: Vec<WindowEvent>,
}

impl EventCollector {
    fn new(attributes: WindowAttributes) -> Self {
        Self {
            attributes: Some(attributes),
            created: None,
            events: Vec::new(),
        }
    }
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attrs) = self.attributes.take() {
            self.created = Some(event_loop.create_window(attrs));
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.events.push(event);
    }
}

/// Maps the outcome of startup window creation.
fn take_created(created: Option<std::result::Result<NativeWindow, OsError>>) -> Result<NativeWindow> {
    match created {
        Some(Ok(window)) => Ok(window),
        Some(Err(e)) => Err(PixeletError::Creation(format!("native window: {e}"))),
        None => Err(PixeletError::Creation(
            "event loop never resumed; no window was created".to_string(),
        )),
    }
}

/// GPU setup failures (surface, adapter, device) are creation errors.
fn gpu_creation_error(err: anyhow::Error) -> PixeletError {
    PixeletError::Creation(format!("{err:#}"))
}

/// A native window with its GPU surface, drawing context and input.
///
/// Drive it with one [`render`](Self::render) and one
/// [`poll_and_swap`](Self::poll_and_swap) per loop iteration:
///
/// ```no_run
/// use pixelet::{Color, Rect, Shape, Window};
///
/// let mut window = Window::open(100.0, 100.0, 640.0, 480.0, "demo")?;
/// let mut rect: Rect = Rect::with_bounds(10.0, 10.0, 50.0, 30.0);
/// rect.set_fill(Color::rgb(255.0, 128.0, 0.0));
///
/// while window.poll_and_swap() {
///     window.render(|canvas| rect.draw(canvas).map(|_| ()))?;
/// }
/// # Ok::<(), pixelet::PixeletError>(())
/// ```
pub struct Window {
    // Field order is drop order: the pending frame and every GPU object go
    // before the surface, device and native window.
    pending: Option<wgpu::SurfaceTexture>,
    gfx: Gfx<WgpuBackend>,
    entry: WindowEntry,

    collector: EventCollector,
    event_loop: EventLoop<()>,

    input_state: InputState,
    input_frame: InputFrame,
    keys: KeyDispatcher,

    clock: FrameClock,
    frame_time: Option<FrameTime>,

    background: Color,
    open: bool,
}

impl Window {
    /// Opens a window at `(x, y)` with a `width` x `height` drawable area.
    pub fn open(x: f32, y: f32, width: f32, height: f32, title: &str) -> Result<Self> {
        let config = WindowConfig::new(title, width, height).with_position(x, y);
        Self::with_config(config, GpuInit::default())
    }

    pub fn with_config(config: WindowConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new()
            .map_err(|e| PixeletError::Creation(format!("event loop: {e}")))?;

        let mut collector = EventCollector::new(config.attributes());
        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut collector);
            if let PumpStatus::Exit(code) = status {
                return Err(PixeletError::Creation(format!(
                    "event loop exited during startup (code {code})"
                )));
            }
            if collector.created.is_some() {
                break;
            }
        }
        let native = take_created(collector.created.take())?;

        let entry = WindowEntryTryBuilder {
            window: native,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .map_err(gpu_creation_error)?;

        let viewport = entry.with_window(logical_viewport);
        let gfx = Gfx::new(entry.with_gpu(|gpu| gpu.backend()), viewport)?;

        log::info!(
            "window `{}` opened ({}x{})",
            config.title,
            viewport.width,
            viewport.height
        );

        Ok(Self {
            pending: None,
            gfx,
            entry,
            collector,
            event_loop,
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            keys: KeyDispatcher::new(),
            clock: FrameClock::new(),
            frame_time: None,
            background: config.background,
            open: true,
        })
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Drawable width in logical pixels.
    pub fn width(&self) -> f32 {
        self.viewport().width
    }

    /// Drawable height in logical pixels.
    pub fn height(&self) -> f32 {
        self.viewport().height
    }

    pub fn viewport(&self) -> Viewport {
        self.entry.with_window(logical_viewport)
    }

    /// Moves the window's outer top-left corner.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.entry
            .with_window(|w| w.set_outer_position(LogicalPosition::new(x, y)));
    }

    /// Requests a new drawable size. Some platforms apply it asynchronously;
    /// the surface follows on the resulting resize event.
    pub fn set_size(&mut self, width: f32, height: f32) {
        let applied = self
            .entry
            .with_window(|w| w.request_inner_size(LogicalSize::new(width, height)));
        if let Some(size) = applied {
            self.entry.with_gpu_mut(|gpu| gpu.resize(size));
        }
    }

    /// Non-positive values leave that side unlimited.
    pub fn set_size_limits(&mut self, min_width: f32, min_height: f32, max_width: f32, max_height: f32) {
        let (min, max) = size_limits(min_width, min_height, max_width, max_height);
        self.entry.with_window(|w| {
            w.set_min_inner_size(min);
            w.set_max_inner_size(max);
        });
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn set_title(&mut self, title: &str) {
        self.entry.with_window(|w| w.set_title(title));
    }

    /// Marks the window closed and hides it. It is destroyed on drop.
    pub fn close(&mut self) {
        if self.open {
            log::info!("window closed");
            self.open = false;
            self.entry.with_window(|w| w.set_visible(false));
        }
    }

    /// Drawing context: viewport and shader registry.
    #[inline]
    pub fn gfx(&mut self) -> &mut Gfx<WgpuBackend> {
        &mut self.gfx
    }

    /// Held keys and buttons, pointer position.
    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input_state
    }

    /// Events and transitions from the last [`poll_and_swap`](Self::poll_and_swap).
    #[inline]
    pub fn input_frame(&self) -> &InputFrame {
        &self.input_frame
    }

    /// Timing of the last [`poll_and_swap`](Self::poll_and_swap); `None` before
    /// the first one.
    #[inline]
    pub fn frame_time(&self) -> Option<FrameTime> {
        self.frame_time
    }

    /// Frames per second over the last completed second.
    #[inline]
    pub fn fps(&self) -> Option<u32> {
        self.clock.fps()
    }

    /// Calls `callback` for every key press, repeats included.
    pub fn on_key_press(&mut self, callback: impl FnMut(Key) + 'static) -> SubscriptionId {
        self.keys.subscribe(callback)
    }

    pub fn remove_key_listener(&mut self, id: SubscriptionId) -> bool {
        self.keys.unsubscribe(id)
    }

    /// Clears the next frame to the background color and runs `draw` on it.
    ///
    /// The frame is submitted but shown only by the next
    /// [`poll_and_swap`](Self::poll_and_swap). Does nothing while the window is
    /// closed or minimized, or when the surface asks to skip a frame.
    pub fn render<F>(&mut self, draw: F) -> Result<()>
    where
        F: FnOnce(&mut Canvas<'_, WgpuBackend>) -> Result<()>,
    {
        if !self.open {
            return Ok(());
        }
        // Only one surface texture can be held at a time.
        self.present_pending();

        let viewport = self.viewport();
        if !viewport.is_valid() {
            return Ok(());
        }
        self.gfx.set_viewport(viewport);

        let mut frame = match self.entry.with_gpu(|gpu| gpu.begin_frame()) {
            Ok(frame) => frame,
            Err(err) => {
                return match self.entry.with_gpu_mut(|gpu| gpu.handle_surface_error(&err)) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface error: {err}");
                        Err(PixeletError::Surface(err.to_string()))
                    }
                    action => {
                        log::warn!("surface error: {err} ({action:?})");
                        Ok(())
                    }
                };
            }
        };

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pixelet frame"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mut canvas = self.gfx.canvas(&mut pass);
            draw(&mut canvas)?;
        }

        let texture = self.entry.with_gpu(|gpu| gpu.submit(frame));
        self.pending = Some(texture);
        Ok(())
    }

    /// Presents the last rendered frame, then processes pending platform events.
    ///
    /// Updates input, runs key subscribers, handles resize and close, and
    /// ticks the frame clock. Returns [`is_open`](Self::is_open).
    pub fn poll_and_swap(&mut self) -> bool {
        self.present_pending();
        if !self.open {
            return false;
        }

        let time = self.clock.tick();
        if let Some(fps) = time.fps {
            log::debug!("fps: {fps}");
        }
        self.frame_time = Some(time);

        self.input_frame.clear();
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.collector);

        for event in std::mem::take(&mut self.collector.events) {
            self.handle_event(event);
        }

        if let PumpStatus::Exit(code) = status {
            log::info!("event loop exited (code {code})");
            self.open = false;
        }
        self.open
    }

    fn present_pending(&mut self) {
        if let Some(texture) = self.pending.take() {
            self.entry.with_window(|w| w.pre_present_notify());
            texture.present();
        }
    }

    fn handle_event(&mut self, event: WindowEvent) {
        let scale = self.entry.with_window(|w| w.scale_factor());
        if let Some(ev) = translate_window_event(scale, &self.input_state, &event) {
            self.keys.dispatch(&ev);
            self.input_state.apply_event(&mut self.input_frame, ev);
        }

        match event {
            WindowEvent::CloseRequested => self.close(),

            WindowEvent::Resized(size) => {
                self.entry.with_gpu_mut(|gpu| gpu.resize(size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.entry.with_window(|w| w.inner_size());
                self.entry.with_gpu_mut(|gpu| gpu.resize(size));
            }

            _ => {}
        }
    }
}

fn logical_viewport(window: &NativeWindow) -> Viewport {
    let size = window.inner_size().to_logical::<f32>(window.scale_factor());
    Viewport::new(size.width, size.height)
}
