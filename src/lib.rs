//! # Skydome
//!
//! **A procedural sky backdrop and the frame pipeline that draws it.**
//!
//! Two pieces do the work:
//!
//! - [`SkyMaterial`] turns a handful of per-frame signals (time, transition
//!   progress, height, band step and an arc rotation) into the sky program's
//!   parameters, blending the gradient toward a target gradient as the arc
//!   rotation leaves its midpoint and keeping scene fog in sync.
//! - [`RenderPipeline`] owns the GPU context, the render target and the pass
//!   chain, and draws one frame per [`update`](RenderPipeline::update), either
//!   straight to the screen or through post-processing passes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use skydome::*;
//!
//! let scene = Scene::new().with_fog(Fog::new(Color::hex("#ddf0ff")?, 1.0, 60.0)).shared();
//! let camera = Camera::new().shared();
//!
//! let material = SkyMaterial::new(&scene).shared();
//! scene.borrow_mut().add(SkyMesh::new(material.clone()));
//!
//! let mut pipeline = RenderPipeline::initialize(window, &config, scene, camera)?;
//!
//! // Every frame, material first:
//! material.borrow_mut().update(time, 1.0, 0.0, 0.4, arc_rotation);
//! pipeline.update();
//! ```

mod camera;
mod color;
mod config;
mod error;
mod gpu;
pub mod render_graph;
mod renderer;
pub mod scene;
pub mod sky;
mod viewport;

pub use camera::{Camera, SharedCamera};
pub use color::Color;
pub use config::{RendererConfig, SkyConfig};
pub use error::{ParseColorError, RenderError};
pub use gpu::{GpuContext, GpuFrame};
pub use render_graph::{
    Composer, Pass, RenderBuffer, RenderDevice, RenderOutput, RenderTarget, ScenePass, ShaderPass,
};
pub use renderer::RenderPipeline;
pub use scene::{Drawable, Fog, Scene, SharedScene};
pub use sky::{ShaderProgram, SkyMaterial, SkyMesh, calculate_a};
pub use viewport::{Extent, Viewport};

// Re-export glam math types for convenience
pub use glam::{Vec3, Vec4};
