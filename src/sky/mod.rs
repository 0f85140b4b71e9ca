//! Procedural sky material and backdrop.
//!
//! ```text
//!   driver ──update(time, progress, height, step, arc)──▶ SkyMaterial
//!                                                            │ writes (weak)
//!                                                            ▼
//!   SkyMesh ──on_before_compile──▶ ShaderProgram ──owns──▶ SkyUniforms
//!      │                                                     │ reads
//!      └────────────── draw: upload SkyGpuUniforms ◀─────────┘
//! ```
//!
//! [`SkyMaterial`] is the only writer of the live parameters. The program
//! instance owns them, so a recompile (new instance) or teardown drops the old
//! record and the material goes back to doing nothing until the next bind.

mod material;
mod mesh;
mod program;
mod uniforms;

pub use material::{ProgramKey, SkyMaterial, calculate_a, lerp};
pub use mesh::SkyMesh;
pub use program::ShaderProgram;
pub use uniforms::{FogUniforms, SkyGpuUniforms, SkyUniforms};
