//! RGB colors for sky gradients, fog and clear colors.

use glam::Vec3;

use crate::error::ParseColorError;

/// An RGB color with components in `[0, 1]`.
///
/// Components are stored as authored (sRGB, the way hex strings are written).
/// Use [`to_linear`](Self::to_linear) before handing a color to a shader that
/// renders into an sRGB surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Parse a `#rrggbb` (or `rrggbb`) hex string.
    pub fn hex(value: &str) -> Result<Self, ParseColorError> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ParseColorError(value.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ParseColorError(value.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_u32(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    /// Component-wise `(1 - t) * self + t * other`.
    ///
    /// Returns `self` exactly at `t == 0` and `other` exactly at `t == 1`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::from(Vec3::from(self) * (1.0 - t) + Vec3::from(other) * t)
    }

    /// Convert sRGB-encoded components to linear light.
    pub fn to_linear(self) -> Color {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Color::rgb(channel(self.r), channel(self.g), channel(self.b))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Linear, opaque clear color for render pass load ops.
    pub fn to_wgpu(self) -> wgpu::Color {
        let linear = self.to_linear();
        wgpu::Color {
            r: linear.r as f64,
            g: linear.g as f64,
            b: linear.b as f64,
            a: 1.0,
        }
    }
}

impl From<Color> for Vec3 {
    fn from(color: Color) -> Self {
        Vec3::new(color.r, color.g, color.b)
    }
}

impl From<Vec3> for Color {
    fn from(v: Vec3) -> Self {
        Color::rgb(v.x, v.y, v.z)
    }
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::hex(s)
    }
}
