//! Passes in the composer chain.

use crate::camera::SharedCamera;
use crate::render_graph::{RenderDevice, RenderOutput};
use crate::scene::SharedScene;

/// One step of the post-processing chain.
///
/// Each pass receives the previous pass's output (if any) and writes to
/// `output`, which is either an intermediate buffer or the screen.
///
/// # Implementing Custom Passes
///
/// ```ignore
/// struct Invert { pass: ShaderPass }
///
/// impl Pass<GpuContext> for Invert {
///     fn label(&self) -> &str { "invert" }
///
///     fn render(
///         &self,
///         device: &mut GpuContext,
///         frame: &mut GpuFrame,
///         input: Option<&RenderTarget>,
///         output: RenderOutput<'_, RenderTarget>,
///     ) {
///         self.pass.render(device, frame, input, output);
///     }
/// }
/// ```
pub trait Pass<D: RenderDevice> {
    fn label(&self) -> &str;

    /// Records this pass's work into `frame`.
    ///
    /// `input` is `None` only for the first pass in the chain.
    fn render(
        &self,
        device: &mut D,
        frame: &mut D::Frame,
        input: Option<&D::Target>,
        output: RenderOutput<'_, D::Target>,
    );
}

/// Draws the scene through the camera. Always the first pass of a chain.
pub struct ScenePass {
    scene: SharedScene,
    camera: SharedCamera,
}

impl ScenePass {
    pub fn new(scene: SharedScene, camera: SharedCamera) -> Self {
        Self { scene, camera }
    }
}

impl<D: RenderDevice> Pass<D> for ScenePass {
    fn label(&self) -> &str {
        "scene"
    }

    fn render(
        &self,
        device: &mut D,
        frame: &mut D::Frame,
        _input: Option<&D::Target>,
        output: RenderOutput<'_, D::Target>,
    ) {
        let scene = self.scene.borrow();
        let camera = self.camera.borrow();
        device.render_scene(frame, &scene, &camera, output);
    }
}
