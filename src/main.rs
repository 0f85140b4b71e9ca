use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use skydome::{
    Camera, Color, Fog, RenderPipeline, RendererConfig, Scene, ShaderPass, SharedCamera,
    SkyMaterial, SkyMesh, Vec3,
};

/// Arc rotation advanced per second; one full day cycle takes 50 seconds.
const DAY_CYCLE_SPEED: f32 = 0.02;
const ORBIT_SPEED: f32 = 0.1;
const ORBIT_RADIUS: f32 = 8.0;

/// The per-frame driver: updates the sky material, then draws a frame.
enum Experience {
    Pending(RendererConfig),
    Running(Box<Running>),
    Closed,
    Failed(anyhow::Error),
}

struct Running {
    window: Arc<Window>,
    pipeline: RenderPipeline,
    material: Rc<RefCell<SkyMaterial>>,
    camera: SharedCamera,
    start_time: Instant,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &RendererConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // winit reports physical pixels, so the surface is sized 1:1.
        let size = window.inner_size();
        let config = config.clone().size(size.width, size.height).pixel_ratio(1.0);

        let fog = Fog::new(config.clear_color, 1.0, 60.0);
        let scene = Scene::new().with_fog(fog).shared();
        let camera = Camera::new().at(0.0, 2.0, ORBIT_RADIUS).looking_at(Vec3::ZERO).shared();

        let material = SkyMaterial::new(&scene).shared();
        scene.borrow_mut().add(SkyMesh::new(Rc::clone(&material)));

        let mut pipeline = RenderPipeline::initialize(Arc::clone(&window), &config, scene, Rc::clone(&camera))?;
        let vignette = ShaderPass::vignette(pipeline.device());
        pipeline.add_pass(vignette);
        material.borrow_mut().set_resolution(pipeline.viewport().resolution());

        tracing::info!("press P to toggle post-processing");
        window.request_redraw();

        Ok(Self {
            window,
            pipeline,
            material,
            camera,
            start_time: Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match self.pipeline.resize(width, height, 1.0) {
            Ok(()) => self
                .material
                .borrow_mut()
                .set_resolution(self.pipeline.viewport().resolution()),
            Err(err) => tracing::error!(%err, "resize failed"),
        }
    }

    fn toggle_postprocess(&mut self) {
        let enabled = !self.pipeline.use_postprocess();
        self.pipeline.set_use_postprocess(enabled);
        tracing::info!(enabled, "post-processing");
    }

    fn frame(&mut self) {
        let time = self.start_time.elapsed().as_secs_f32();
        let arc_rotation = (time * DAY_CYCLE_SPEED).fract();

        let angle = time * ORBIT_SPEED;
        *self.camera.borrow_mut() = Camera::new()
            .at(ORBIT_RADIUS * angle.sin(), 2.0, ORBIT_RADIUS * angle.cos())
            .looking_at(Vec3::ZERO);

        self.material
            .borrow_mut()
            .update(time, 1.0, arc_rotation, 0.4, arc_rotation);
        self.pipeline.update();

        self.window.request_redraw();
    }
}

impl Experience {
    fn close(&mut self) {
        if let Experience::Running(running) = std::mem::replace(self, Experience::Closed) {
            running.pipeline.destroy();
        }
    }

    fn finish(self) -> Result<()> {
        match self {
            Experience::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }
}

impl ApplicationHandler for Experience {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Experience::Pending(config) = self else {
            return;
        };
        match Running::start(event_loop, config) {
            Ok(running) => *self = Experience::Running(Box::new(running)),
            Err(err) => {
                *self = Experience::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            self.close();
            event_loop.exit();
            return;
        }

        let Experience::Running(running) = self else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => running.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::KeyP)
                {
                    running.toggle_postprocess();
                }
            }
            WindowEvent::RedrawRequested => running.frame(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.close();
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    initialise_tracing();

    let config = RendererConfig::new()
        .title("Skydome")
        .size(1280, 720)
        .clear_color(Color::from_u32(0xddf0ff));

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = Experience::Pending(config);
    event_loop.run_app(&mut app)?;
    app.finish()
}
