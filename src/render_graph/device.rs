//! The device seam the pipeline is written against.

use crate::camera::Camera;
use crate::color::Color;
use crate::error::RenderError;
use crate::scene::Scene;
use crate::viewport::{Extent, Viewport};

/// An off-screen buffer a pass can render into and the next pass can sample.
pub trait RenderBuffer {
    /// Current size in physical pixels.
    fn size(&self) -> Extent;
}

/// Where a pass writes its output.
pub enum RenderOutput<'a, T> {
    /// The presentable surface for this frame.
    Screen,
    /// An off-screen buffer owned by the pass chain.
    Target(&'a T),
}

impl<T> Clone for RenderOutput<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RenderOutput<'_, T> {}

/// GPU device and output context owned by a [`RenderPipeline`](crate::RenderPipeline).
///
/// [`GpuContext`](crate::GpuContext) is the wgpu implementation. Render
/// targets are created, resized and released only through the device that
/// made them; [`release_render_target`](Self::release_render_target) and
/// [`dispose`](Self::dispose) take ownership so nothing can be freed twice.
pub trait RenderDevice {
    type Target: RenderBuffer;
    /// Per-frame recording state, from [`begin_frame`](Self::begin_frame) to
    /// [`end_frame`](Self::end_frame).
    type Frame;

    /// Resize the presentable output to the viewport's drawing size.
    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError>;

    fn set_clear_color(&mut self, color: Color);

    fn create_render_target(&mut self, label: &str, size: Extent) -> Result<Self::Target, RenderError>;

    /// Bring `target` to `size`. A target already at `size` is left untouched.
    fn resize_render_target(&mut self, target: &mut Self::Target, size: Extent) -> Result<(), RenderError>;

    fn release_render_target(&mut self, target: Self::Target);

    fn begin_frame(&mut self) -> Result<Self::Frame, RenderError>;

    /// Clear `output` and draw every visible scene object through `camera`.
    fn render_scene(
        &mut self,
        frame: &mut Self::Frame,
        scene: &Scene,
        camera: &Camera,
        output: RenderOutput<'_, Self::Target>,
    );

    /// Submit the frame's work and present it.
    fn end_frame(&mut self, frame: Self::Frame);

    /// Drop cached per-scene draw lists.
    fn release_render_lists(&mut self);

    /// Tear down the device itself. Targets must be released first.
    fn dispose(self);
}
