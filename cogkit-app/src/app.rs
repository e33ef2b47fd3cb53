use crate::session::ActiveTask;
use anyhow::{Result, anyhow};
use cogkit_core::Point;
use cogkit_render::{FrameStats, SkiaRenderer};
use cogkit_timing::{HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    task: ActiveTask,
    timer: HighPrecisionTimer,
    frame_budget: Option<Duration>,
    cursor: Point,
    title: String,
    refresh_rate: Option<f64>,
    should_exit: bool,
}

impl App {
    pub fn new(task: ActiveTask, timer: HighPrecisionTimer, fps_cap: Option<u32>) -> Self {
        Self {
            window: None,
            pixels: None,
            renderer: None,
            task,
            timer,
            frame_budget: fps_cap
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / fps as f64)),
            cursor: Point::default(),
            title: String::new(),
            refresh_rate: None,
            should_exit: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "starting; ESC exits, R restarts"
        );
        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.refresh_rate = event_loop
            .primary_monitor()
            .and_then(|m| m.refresh_rate_millihertz())
            .map(|rate| rate as f64 / 1000.0);

        let (width, height) = self.task.canvas_size();
        self.title = self.task.title();
        let window_attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        info!(
            canvas_width = width,
            canvas_height = height,
            surface_width = physical_size.width,
            surface_height = physical_size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = self.refresh_rate,
            "window created"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(width, height, surface_texture)?);
        self.renderer = Some(SkiaRenderer::new(width, height)?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let pix = self
            .pixels
            .as_mut()
            .ok_or_else(|| anyhow!("render before surface creation"))?;
        let renderer = self
            .renderer
            .as_mut()
            .ok_or_else(|| anyhow!("render before renderer creation"))?;

        let frame_start = self.timer.now();
        let stats: FrameStats = self.task.render(renderer, pix.frame_mut(), &mut self.timer)?;
        pix.render()?;
        let elapsed = self.timer.elapsed(frame_start);

        trace!(
            outer_ms = elapsed.as_secs_f64() * 1e3,
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );

        if let Some(budget) = self.frame_budget {
            if let Some(rest) = budget.checked_sub(elapsed) {
                self.timer.sleep(rest);
            }
        }
        Ok(())
    }

    fn update(&mut self) {
        self.task.tick();
        let title = self.task.title();
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::Escape => self.cleanup_and_exit(event_loop),
            KeyCode::KeyR => {
                info!(state = ?self.task.state(), "restarting");
                self.task.reset();
            }
            other => {
                if self.task.key(other) {
                    debug!(key = ?other, "key handled");
                }
            }
        }
    }

    /// Window pixels to canvas pixels; the surface may be scaled.
    fn to_canvas(&self, position: PhysicalPosition<f64>) -> Point {
        let pos = (position.x as f32, position.y as f32);
        let (x, y) = match &self.pixels {
            Some(pixels) => match pixels.window_pos_to_pixel(pos) {
                Ok((x, y)) => (x as f64, y as f64),
                Err((x, y)) => (x as f64, y as f64),
            },
            None => (position.x, position.y),
        };
        Point::new(x, y)
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                error!("failed to resize surface: {e}");
            }
        }
        debug!(width = new_size.width, height = new_size.height, "surface resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        let stats = self.timer.calibration_stats();
        info!(
            frames = self.timer.frame_count(),
            avg_ms = stats.average_frame_time_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            max_ms = stats.max_frame_time_ns / 1e6,
            fps = stats.effective_fps,
            "render timing"
        );
        info!(state = ?self.task.state(), "exiting");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("failed to create window and surface: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    error!("render failed: {e:#}");
                    self.cleanup_and_exit(event_loop);
                    return;
                }
                if let Some(win) = &self.window {
                    win.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = self.to_canvas(position);
                self.task.pointer_moved(self.cursor);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.task.pointer_down(self.cursor),
                ElementState::Released => self.task.pointer_up(self.cursor),
            },
            WindowEvent::Resized(sz) => self.handle_resize(sz),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
