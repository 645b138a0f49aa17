// src/lib.rs
//
// Gravelbox: a small real-time driving demo. Procedural terrain, scattered
// obstacles, an arcade single-body vehicle model and a chase/orbit camera,
// running on wgpu + winit, native or in the browser.
//
// The interesting part lives in `physics`, `sim`, `camera` and `terrain`;
// this file is the winit/wgpu plumbing that feeds them.

pub mod asset;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod mesh;
pub mod physics;
pub mod renderer;
pub mod sim;
pub mod terrain;
pub mod time;
pub mod vehicle;

pub use error::{Error, Result};

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use winit::platform::web::WindowExtWebSys;

use camera::{Camera, CameraMode};
use config::SimConfig;
use renderer::Renderer;
use sim::{PoseBuffer, SimulationContext};
use terrain::Terrain;
use time::FrameClock;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn run() {
    run_inner().await;
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_native() {
    pollster::block_on(run_inner());
}

// ----------------------------------------------------------------------------
// winit 0.30 + wgpu 22 App State
// ----------------------------------------------------------------------------
struct DriveApp {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    // Simulation (alive before any window exists)
    terrain: Terrain,
    sim: SimulationContext,
    camera: Camera,
    clock: FrameClock,
    vehicle_pose: PoseBuffer,

    // Pointer state for the orbit camera
    cursor: Option<(f64, f64)>,
    dragging: bool,

    // Created inside the `resumed` event
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<Renderer>,
}

impl DriveApp {
    fn new(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        config: SimConfig,
    ) -> Self {
        Self {
            instance,
            adapter,
            device,
            queue,
            terrain: Terrain::new(config.terrain),
            sim: SimulationContext::new(config.vehicle),
            camera: Camera::new(16.0 / 9.0),
            clock: FrameClock::new(),
            vehicle_pose: PoseBuffer::default(),
            cursor: None,
            dragging: false,
            window: None,
            surface: None,
            surface_config: None,
            renderer: None,
        }
    }

    /// Build the scene: terrain + obstacles once, then the vehicle model
    /// with placeholder fallback. Only after the vehicle is attached does
    /// the simulation start ticking.
    fn build_scene(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.add_static_mesh(&self.terrain.build_mesh(), "terrain");
        renderer.add_static_mesh(&self.terrain.build_obstacle_mesh(), "obstacles");

        let model_bytes = load_vehicle_model_bytes();
        let vehicle_mesh = asset::vehicle_mesh_or_placeholder(model_bytes.as_deref());
        renderer.attach_vehicle(&vehicle_mesh);
    }

    fn render_frame(&mut self) {
        let time = self.clock.tick();

        // Simulation first, so the frame draws this tick's pose.
        if let Some(renderer) = self.renderer.as_mut() {
            let sink = renderer
                .has_vehicle()
                .then_some(&mut self.vehicle_pose as &mut dyn sim::TransformSink);
            self.sim
                .tick(&self.terrain, &mut self.camera, sink, time.raw_delta);
            renderer.set_vehicle_matrix(self.vehicle_pose.matrix());
        }

        let (Some(surface), Some(config), Some(renderer)) = (
            self.surface.as_ref(),
            self.surface_config.as_ref(),
            self.renderer.as_ref(),
        ) else {
            return;
        };

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("failed to acquire swap chain texture: {err:?}; reconfiguring");
                surface.configure(&self.device, config);
                match surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(e) => {
                        log::error!("failed to acquire frame after reconfigure: {e:?}");
                        return;
                    }
                }
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        renderer.draw(&view, &self.camera);
        frame.present();

        if time.frame % 300 == 0 {
            log::debug!(
                "frame {}: {:.0} fps, speed {:.1} m/s",
                time.frame,
                time.fps,
                self.sim.vehicle.velocity.length()
            );
        }
    }
}

impl ApplicationHandler for DriveApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        if self.window.is_some() {
            return;
        }

        // 1. Create Window
        let attrs = Window::default_attributes().with_title("Gravelbox");
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("Failed to create window"),
        );
        self.window = Some(window.clone());

        #[cfg(target_arch = "wasm32")]
        {
            let canvas = window.canvas().expect("No canvas available from winit window");
            let canvas_el: web_sys::Element = canvas.into();

            let document = web_sys::window()
                .and_then(|w| w.document())
                .expect("No document");

            if let Some(dst) = document.get_element_by_id("gravelbox-container") {
                dst.append_child(&canvas_el).unwrap();
            } else {
                document.body().unwrap().append_child(&canvas_el).unwrap();
            }
        }

        // 2. Create and configure Surface
        let surface = self
            .instance
            .create_surface(window.clone())
            .expect("Failed to create surface");
        let size = window.inner_size();
        let caps = surface.get_capabilities(&self.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: caps.present_modes[0],
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2u32,
        };
        surface.configure(&self.device, &config);

        self.camera
            .set_aspect(config.width as f32 / config.height as f32);
        self.renderer = Some(Renderer::new(
            self.device.clone(),
            self.queue.clone(),
            format,
            config.width,
            config.height,
        ));
        self.surface = Some(surface);
        self.surface_config = Some(config);

        self.build_scene();
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        // Clone the Arc so the handle stays usable across &mut self calls
        // below (render_frame needs the whole app).
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    if let (Some(surface), Some(config)) =
                        (self.surface.as_ref(), self.surface_config.as_mut())
                    {
                        config.width = new_size.width;
                        config.height = new_size.height;
                        surface.configure(&self.device, config);
                    }
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.resize(new_size.width, new_size.height);
                    }
                    self.camera
                        .set_aspect(new_size.width as f32 / new_size.height as f32);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.sim.input.apply_key_event(&event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.dragging = state == ElementState::Pressed;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x, position.y);
                if let Some((px, py)) = self.cursor {
                    if self.dragging && self.sim.rig.mode == CameraMode::Orbit {
                        self.sim
                            .rig
                            .orbit
                            .rotate((x - px) as f32, (y - py) as f32);
                    }
                }
                self.cursor = Some((x, y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * 2.0,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 * 0.05,
                };
                if self.sim.rig.mode == CameraMode::Orbit {
                    self.sim.rig.orbit.zoom(amount);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::debug!("Scale factor changed: {scale_factor}");
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
                window.request_redraw();
            }
            _ => {}
        }
    }
}

// ----------------------------------------------------------------------------
// Async Runner
// ----------------------------------------------------------------------------
async fn run_inner() {
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        let _ = console_log::init_with_level(log::Level::Debug);
    }

    let config = load_config();

    let event_loop = EventLoop::new().expect("Failed to create event loop");

    // === WGPU setup ===

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let (adapter, device, queue) = match init_gpu(&instance).await {
        Ok(gpu) => gpu,
        Err(e) => {
            log::error!("graphics init failed: {e}");
            return;
        }
    };

    let mut app = DriveApp::new(
        instance,
        adapter,
        Arc::new(device),
        Arc::new(queue),
        config,
    );

    // === Main event loop ===

    // Web needs `.spawn_app()` instead of `.run_app()` so it doesn't block
    // the browser loop.
    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }

    // Native desktop apps use `.run_app()`.
    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run_app(&mut app).expect("Event loop failed");
    }
}

/// Adapter and device acquisition. `compatible_surface: None` so async init
/// can finish before winit's loop takes control.
async fn init_gpu(
    instance: &wgpu::Instance,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| Error::graphics("no compatible GPU adapter found"))?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gravelbox_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| Error::graphics(format!("device request failed: {e}")))?;

    Ok((adapter, device, queue))
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> SimConfig {
    SimConfig::load_or_default("gravelbox.json")
}

#[cfg(target_arch = "wasm32")]
fn load_config() -> SimConfig {
    SimConfig::default()
}

/// Vehicle model bytes, if a model is available at all. On the web the
/// placeholder ships by default; natively an optional `assets/vehicle.glb`
/// is picked up when present.
#[cfg(not(target_arch = "wasm32"))]
fn load_vehicle_model_bytes() -> Option<Vec<u8>> {
    std::fs::read("assets/vehicle.glb").ok()
}

#[cfg(target_arch = "wasm32")]
fn load_vehicle_model_bytes() -> Option<Vec<u8>> {
    None
}
