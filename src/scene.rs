//! Scene state consumed by the sky material and the scene pass.
//!
//! The scene is deliberately thin: an optional [`Fog`] component and a list of
//! [`Drawable`]s. Building the scene graph is left to the caller; the pipeline
//! only draws what is here, in render order.

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::Camera;
use crate::color::Color;
use crate::gpu::GpuContext;

/// Scene handle shared between the frame driver, the scene pass and materials.
pub type SharedScene = Rc<RefCell<Scene>>;

/// Linear distance fog.
///
/// Shaders fade toward `color` between `near` and `far`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn new(color: Color, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }
}

impl Default for Fog {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0, 1000.0)
    }
}

/// Something the scene pass can draw into an open render pass.
///
/// Implementors upload their own uniforms through `gpu.queue` and record draw
/// commands into `pass`. Lazy GPU setup (such as compiling a program on first
/// use) goes through interior mutability since drawing only borrows the scene.
pub trait Drawable {
    fn draw(&self, gpu: &GpuContext, pass: &mut wgpu::RenderPass<'_>, camera: &Camera);

    /// Lower values draw first. Backdrops use `i32::MIN`.
    fn render_order(&self) -> i32 {
        0
    }

    fn visible(&self) -> bool {
        true
    }
}

/// The scene graph root.
#[derive(Default)]
pub struct Scene {
    pub fog: Option<Fog>,
    objects: Vec<Box<dyn Drawable>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fog(mut self, fog: Fog) -> Self {
        self.fog = Some(fog);
        self
    }

    pub fn shared(self) -> SharedScene {
        Rc::new(RefCell::new(self))
    }

    /// Add a drawable and return its index.
    pub fn add<D: Drawable + 'static>(&mut self, drawable: D) -> usize {
        self.objects.push(Box::new(drawable));
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[Box<dyn Drawable>] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
