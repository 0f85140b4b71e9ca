//! The frame renderer: device, clear color, render target and pass chain.

use std::rc::Rc;
use std::sync::Arc;

use winit::window::Window;

use crate::camera::SharedCamera;
use crate::color::Color;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::render_graph::{Composer, Pass, RenderDevice, RenderOutput, ScenePass};
use crate::scene::SharedScene;
use crate::viewport::Viewport;

const RENDER_TARGET_LABEL: &str = "Render Target";

/// Owns the render device and everything allocated from it, and draws one
/// frame per [`update`](Self::update).
///
/// With post-processing off the scene is drawn straight to the screen. With
/// it on, the [`Composer`] runs its passes, starting with the scene pass
/// registered at construction.
///
/// # Example
///
/// ```ignore
/// let mut pipeline = RenderPipeline::initialize(window, &config, scene, camera)?;
/// let vignette = ShaderPass::vignette(pipeline.device());
/// pipeline.add_pass(vignette);
/// pipeline.set_use_postprocess(true);
///
/// // Each frame:
/// material.borrow_mut().update(time, progress, height, step, arc);
/// pipeline.update();
///
/// // On exit:
/// pipeline.destroy();
/// ```
pub struct RenderPipeline<D: RenderDevice = GpuContext> {
    device: D,
    clear_color: Color,
    use_postprocess: bool,
    viewport: Viewport,
    scene: SharedScene,
    camera: SharedCamera,
    composer: Composer<D>,
}

impl RenderPipeline<GpuContext> {
    /// Create the GPU context for `window` and build the pipeline on it.
    ///
    /// Surface, adapter and device failures are returned, not logged.
    pub fn initialize(
        window: Arc<Window>,
        config: &RendererConfig,
        scene: SharedScene,
        camera: SharedCamera,
    ) -> Result<Self, RenderError> {
        let viewport = config.viewport()?;
        let gpu = GpuContext::new(window, viewport)?;
        Self::with_device(gpu, config, scene, camera)
    }
}

impl<D: RenderDevice> RenderPipeline<D> {
    /// Build the pipeline on an existing device.
    pub fn with_device(
        mut device: D,
        config: &RendererConfig,
        scene: SharedScene,
        camera: SharedCamera,
    ) -> Result<Self, RenderError> {
        let viewport = config.viewport()?;
        device.set_clear_color(config.clear_color);
        device.set_viewport(viewport)?;

        let render_target = device.create_render_target(RENDER_TARGET_LABEL, viewport.drawing_size())?;
        let mut composer = Composer::new(&mut device, render_target, viewport)?;
        composer.add_pass(ScenePass::new(Rc::clone(&scene), Rc::clone(&camera)));

        let size = viewport.drawing_size();
        tracing::info!(
            width = size.width,
            height = size.height,
            pixel_ratio = viewport.pixel_ratio(),
            postprocess = config.use_postprocess,
            "render pipeline initialized"
        );

        Ok(Self {
            device,
            clear_color: config.clear_color,
            use_postprocess: config.use_postprocess,
            viewport,
            scene,
            camera,
            composer,
        })
    }

    /// Resize the output and every chain buffer to `width × height` logical
    /// pixels at `pixel_ratio`.
    ///
    /// Buffers already at the new drawing size are left alone. On failure the
    /// device output and every buffer keep the previous size.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Result<(), RenderError> {
        let viewport = Viewport::new(width, height, pixel_ratio)?;
        self.composer.set_viewport(&mut self.device, viewport)?;
        if let Err(err) = self.device.set_viewport(viewport) {
            if let Err(restore) = self.composer.set_viewport(&mut self.device, self.viewport) {
                tracing::warn!(%restore, "failed to restore chain buffers");
            }
            return Err(err);
        }
        self.viewport = viewport;

        let size = viewport.drawing_size();
        tracing::debug!(
            width = size.width,
            height = size.height,
            pixel_ratio,
            "resized render pipeline"
        );
        Ok(())
    }

    /// Draw one frame.
    ///
    /// A frame whose output cannot be acquired is skipped.
    pub fn update(&mut self) {
        let mut frame = match self.device.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%err, "skipping frame");
                return;
            }
        };

        if self.use_postprocess {
            self.composer.render(&mut self.device, &mut frame);
        } else {
            let scene = self.scene.borrow();
            let camera = self.camera.borrow();
            self.device
                .render_scene(&mut frame, &scene, &camera, RenderOutput::Screen);
        }

        self.device.end_frame(frame);
    }

    /// Release the render lists, every chain buffer and finally the device.
    pub fn destroy(self) {
        let Self {
            mut device,
            composer,
            ..
        } = self;
        device.release_render_lists();
        composer.release(&mut device);
        device.dispose();
        tracing::debug!("render pipeline destroyed");
    }

    /// Append a pass after the existing ones.
    pub fn add_pass<P: Pass<D> + 'static>(&mut self, pass: P) {
        self.composer.add_pass(pass);
    }

    pub fn set_use_postprocess(&mut self, enabled: bool) {
        self.use_postprocess = enabled;
    }

    pub fn use_postprocess(&self) -> bool {
        self.use_postprocess
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
        self.device.set_clear_color(color);
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The buffer the scene pass draws into when post-processing.
    pub fn render_target(&self) -> &D::Target {
        self.composer.render_target()
    }

    pub fn composer(&self) -> &Composer<D> {
        &self.composer
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
