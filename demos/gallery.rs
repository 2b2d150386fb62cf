//! Opens a window with a bent gallery.
//!
//! ```sh
//! cargo run --example gallery -- photos/one.jpg photos/two.jpg photos/three.jpg
//! ```
//!
//! Without arguments the built-in project list is shown. Set `GALLERY_FALLBACK=1` to skip
//! the GPU and try the CPU card row.

use std::sync::Arc;
use std::time::Instant;

use circular_gallery::{Gallery, GalleryConfig, GalleryItem, InputEvent, PointerId};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

struct App {
    config: GalleryConfig,
    force_fallback: bool,
    window: Option<Arc<Window>>,
    gallery: Option<Gallery<Arc<Window>>>,
    cursor: PhysicalPosition<f64>,
}

impl App {
    fn new(config: GalleryConfig, force_fallback: bool) -> Self {
        Self {
            config,
            force_fallback,
            window: None,
            gallery: None,
            cursor: PhysicalPosition::new(0.0, 0.0),
        }
    }

    fn send(&mut self, event: InputEvent) {
        if let Some(gallery) = self.gallery.as_mut() {
            gallery.handle_input(event, Instant::now());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes().with_title("circular gallery");
        let window = Arc::new(event_loop.create_window(attributes).unwrap());
        let size = window.inner_size();
        let physical_size = (size.width, size.height);

        let mounted = if self.force_fallback {
            Gallery::mount_fallback(window.clone(), physical_size, self.config.clone())
        } else {
            futures::executor::block_on(Gallery::mount(
                window.clone(),
                physical_size,
                window.scale_factor(),
                self.config.clone(),
            ))
        };

        match mounted {
            Ok(gallery) => {
                println!(
                    "mounted on the {}",
                    if gallery.is_accelerated() { "GPU" } else { "CPU" }
                );
                self.gallery = Some(gallery);
                window.request_redraw();
            }
            Err(error) => {
                eprintln!("could not mount the gallery: {error}");
                event_loop.exit();
            }
        }
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(gallery) = self.gallery.take() {
                    gallery.destroy();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gallery) = self.gallery.as_mut() {
                    if let Err(error) = gallery.resize((size.width, size.height)) {
                        eprintln!("resize failed: {error}");
                    }
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.change_scale_factor(scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                self.send(InputEvent::PointerMove {
                    pointer: PointerId::Mouse,
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::CursorLeft { .. } => self.send(InputEvent::PointerCancel {
                pointer: PointerId::Mouse,
            }),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let event = match state {
                    ElementState::Pressed => InputEvent::PointerDown {
                        pointer: PointerId::Mouse,
                        x: self.cursor.x as f32,
                        y: self.cursor.y as f32,
                    },
                    ElementState::Released => InputEvent::PointerUp {
                        pointer: PointerId::Mouse,
                    },
                };
                self.send(event);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Positive wheel deltas in winit mean "scroll up"; the gallery moves forward
                // on scroll down.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                if delta_y != 0.0 {
                    self.send(InputEvent::Wheel { delta_y });
                }
            }
            WindowEvent::Touch(touch) => {
                let pointer = PointerId::Touch(touch.id);
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                let event = match touch.phase {
                    TouchPhase::Started => InputEvent::PointerDown { pointer, x, y },
                    TouchPhase::Moved => InputEvent::PointerMove { pointer, x, y },
                    TouchPhase::Ended => InputEvent::PointerUp { pointer },
                    TouchPhase::Cancelled => InputEvent::PointerCancel { pointer },
                };
                self.send(event);
            }
            WindowEvent::RedrawRequested => {
                let Some(gallery) = self.gallery.as_mut() else {
                    return;
                };
                if let Err(error) = gallery.frame(Instant::now()) {
                    eprintln!("frame failed: {error}");
                }
                if gallery.is_running() {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let mut config = GalleryConfig::default();
    if !paths.is_empty() {
        let items = paths
            .iter()
            .map(|path| {
                let name = std::path::Path::new(path)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.clone());
                GalleryItem::new(path.as_str(), name)
            })
            .collect();
        config = config.with_items(items);
    }
    let force_fallback = std::env::var("GALLERY_FALLBACK").is_ok_and(|value| value == "1");

    let event_loop = EventLoop::new().unwrap();
    let mut app = App::new(config, force_fallback);
    event_loop.run_app(&mut app).unwrap();
}
