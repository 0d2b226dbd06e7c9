//! Windowed underwater viewer: hardcoded manifest, keyboard/mouse camera, fish school.
//! Run from the directory holding `assets/`: cargo run -p debug --bin underwater
//!
//! Keys: w/s move along z, a/d along x, r/f along y, q/e turn.
//! Drag with the left button to orbit, wheel to zoom.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use reef_bridge::ReefWindowBackend;
use reef_scene::{SceneConfig, SceneContext, SceneManifest, ScrollDirection};
use render_api::RenderBackendWindow;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

const WINDOW_SIZE: (u32, u32) = (800, 600);

struct App {
    window: Option<Window>,
    backend: Option<ReefWindowBackend>,
    scene: Option<SceneContext>,
    size: (u32, u32),
    cursor: (f64, f64),
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            backend: None,
            scene: None,
            size: WINDOW_SIZE,
            cursor: (0.0, 0.0),
        }
    }

    /// Creates the window, the backend (shader build included) and loads the scene.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Underwater")
            .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1));
        let window = event_loop.create_window(attrs)?;
        let phys = window.inner_size();
        self.size = (phys.width.max(1), phys.height.max(1));

        let mut backend = ReefWindowBackend::from_window(&window).map_err(anyhow::Error::msg)?;
        let manifest = SceneManifest::underwater();
        let scene = SceneContext::load(SceneConfig::default(), &manifest, &mut backend);
        log::info!(
            "scene loaded: {} models, {} fish",
            scene.registry.models().len(),
            scene.registry.fish().len()
        );

        window.request_redraw();
        self.window = Some(window);
        self.backend = Some(backend);
        self.scene = Some(scene);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(backend), Some(scene)) = (&self.window, &mut self.backend, &self.scene) else {
            return;
        };
        let (raw_window, raw_display) = match (window.window_handle(), window.display_handle()) {
            (Ok(wh), Ok(dh)) => (wh.as_raw(), dh.as_raw()),
            _ => return,
        };
        let frame = scene.extract(self.size);
        if let Err(e) = backend.render_frame_to_window(&frame, raw_window, raw_display) {
            log::warn!("frame dropped: {}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical) => {
                self.size = (physical.width.max(1), physical.height.max(1));
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let Key::Character(text) = &event.logical_key {
                    for c in text.chars() {
                        scene.key_press(c);
                    }
                }
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                scene.mouse_button(state == ElementState::Pressed, self.cursor.0, self.cursor.1);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                scene.mouse_motion(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(p) => p.y,
                };
                if dy > 0.0 {
                    scene.scroll(ScrollDirection::Up);
                } else if dy < 0.0 {
                    scene.scroll(ScrollDirection::Down);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(scene) = self.scene.as_mut() {
            scene.tick();
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let event_loop = winit::event_loop::EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
