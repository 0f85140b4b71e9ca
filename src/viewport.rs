//! Viewport dimensions and their pixel-ratio-scaled drawing size.

use glam::Vec4;

use crate::error::RenderError;

/// Size of a GPU buffer in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Logical viewport size plus device pixel ratio.
///
/// Every buffer the pipeline owns is sized by [`drawing_size`](Self::drawing_size),
/// never by the logical size directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f32,
}

impl Viewport {
    /// Create a viewport, rejecting zero sizes and non-positive or non-finite ratios.
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Result<Self, RenderError> {
        let viewport = Self {
            width,
            height,
            pixel_ratio,
        };
        let drawing = viewport.drawing_size();
        if width == 0
            || height == 0
            || !pixel_ratio.is_finite()
            || pixel_ratio <= 0.0
            || drawing.width == 0
            || drawing.height == 0
        {
            return Err(RenderError::InvalidViewport {
                width,
                height,
                pixel_ratio,
            });
        }
        Ok(viewport)
    }

    /// Logical width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Physical buffer size: `floor(width * ratio) x floor(height * ratio)`.
    pub fn drawing_size(&self) -> Extent {
        Extent::new(
            (self.width as f32 * self.pixel_ratio).floor() as u32,
            (self.height as f32 * self.pixel_ratio).floor() as u32,
        )
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// The sky `resolution` parameter: `(drawing_w, drawing_h, pixel_ratio, aspect)`.
    pub fn resolution(&self) -> Vec4 {
        let drawing = self.drawing_size();
        Vec4::new(
            drawing.width as f32,
            drawing.height as f32,
            self.pixel_ratio,
            self.aspect(),
        )
    }
}
