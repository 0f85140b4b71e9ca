//! Pass chain for multi-pass rendering with ping-pong buffers.
//!
//! The chain is linear. The first pass draws the scene, every following pass
//! samples the previous pass's output, and the last pass writes the screen:
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ ScenePass   │───▶│ ShaderPass  │───▶│ ShaderPass  │───▶ Screen
//! └─────────────┘    └─────────────┘    └─────────────┘
//!       │                  │
//!       ▼                  ▼
//!   Target A ◀────────▶ Target B        (ping-pong)
//! ```
//!
//! Everything here is written against [`RenderDevice`], so the chain logic
//! runs the same on [`GpuContext`](crate::GpuContext) and on the recording
//! device used in tests.
//!
//! # Example
//!
//! ```ignore
//! let mut composer = Composer::new(&mut gpu, render_target, viewport)?;
//! composer.add_pass(ScenePass::new(scene, camera));
//! composer.add_pass(ShaderPass::vignette(&gpu));
//!
//! let mut frame = gpu.begin_frame()?;
//! composer.render(&mut gpu, &mut frame);
//! gpu.end_frame(frame);
//! ```

mod composer;
mod device;
mod pass;
mod render_target;
mod shader_pass;

#[cfg(test)]
pub(crate) mod testing;

pub use composer::Composer;
pub use device::{RenderBuffer, RenderDevice, RenderOutput};
pub use pass::{Pass, ScenePass};
pub use render_target::RenderTarget;
pub use shader_pass::{ShaderPass, ShaderPassUniforms};
