//! Builder-style configuration for the renderer and the sky material.

use crate::color::Color;
use crate::error::RenderError;
use crate::viewport::Viewport;

/// Configuration for the window and [`RenderPipeline`](crate::RenderPipeline).
#[derive(Clone, Debug)]
pub struct RendererConfig {
    pub title: String,
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
    pub pixel_ratio: f32,
    pub clear_color: Color,
    /// Start with the pass chain active instead of the direct draw.
    pub use_postprocess: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "Skydome".to_string(),
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
            clear_color: Color::from_u32(0xddf0ff),
            use_postprocess: false,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn postprocess(mut self, enabled: bool) -> Self {
        self.use_postprocess = enabled;
        self
    }

    /// Validated viewport for the configured size and ratio.
    pub fn viewport(&self) -> Result<Viewport, RenderError> {
        Viewport::new(self.width, self.height, self.pixel_ratio)
    }
}

/// Defaults and gradients for [`SkyMaterial`](crate::sky::SkyMaterial).
///
/// The base gradient is what the sky shows at the neutral arc rotation (0.5);
/// the target gradient is what it blends to at either end of the cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyConfig {
    pub color_a: Color,
    pub color_b: Color,
    pub target_a: Color,
    pub target_b: Color,
    pub progress: f32,
    pub height: f32,
    pub step: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            color_a: Color::from_u32(0xE1D3B3),
            color_b: Color::from_u32(0x52B3F0),
            target_a: Color::from_u32(0x4140C2),
            target_b: Color::from_u32(0x0D1E8A),
            progress: 1.0,
            height: 0.0,
            step: 0.4,
        }
    }
}

impl SkyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gradient(mut self, color_a: Color, color_b: Color) -> Self {
        self.color_a = color_a;
        self.color_b = color_b;
        self
    }

    pub fn target_gradient(mut self, target_a: Color, target_b: Color) -> Self {
        self.target_a = target_a;
        self.target_b = target_b;
        self
    }

    pub fn step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }
}
