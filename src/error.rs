//! Error types for device setup, render-target allocation and color parsing.

use thiserror::Error;

/// Failures surfaced by [`RenderPipeline`](crate::RenderPipeline) and the render devices.
///
/// Resource acquisition is fatal for the frame loop, so every variant here is
/// returned to the caller rather than logged and dropped.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported {0}")]
    UnsupportedSurface(&'static str),

    #[error("failed to acquire surface texture: {0}")]
    SurfaceFrame(#[from] wgpu::SurfaceError),

    #[error("invalid viewport {width}x{height} @ {pixel_ratio}")]
    InvalidViewport {
        width: u32,
        height: u32,
        pixel_ratio: f32,
    },

    #[error("render target {width}x{height} exceeds device limit of {max}")]
    TargetTooLarge { width: u32, height: u32, max: u32 },
}

/// A hex color string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color '{0}', expected #rrggbb")]
pub struct ParseColorError(pub String);
