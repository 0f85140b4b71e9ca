//! The sky program's parameter record and its GPU layout.

use glam::Vec4;

use crate::camera::Camera;
use crate::color::Color;
use crate::scene::Fog;

/// Fog parameters mirrored into the sky program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogUniforms {
    pub near: f32,
    pub far: f32,
    pub color: Color,
}

impl From<Fog> for FogUniforms {
    fn from(fog: Fog) -> Self {
        Self {
            near: fog.near,
            far: fog.far,
            color: fog.color,
        }
    }
}

/// Named parameters of the procedural sky program.
///
/// `fog` is `Some` only if the scene had fog when the program was bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyUniforms {
    /// Seconds.
    pub time: f32,
    pub progress: f32,
    /// Horizon height, 0..1.
    pub height: f32,
    /// Gradient band width.
    pub step: f32,
    pub color_a: Color,
    pub color_b: Color,
    /// `(drawing_w, drawing_h, pixel_ratio, aspect)`.
    pub resolution: Vec4,
    pub fog: Option<FogUniforms>,
}

impl SkyUniforms {
    /// Pack for upload. Colors are converted to linear for the sRGB surface.
    pub fn to_gpu(&self, camera: &Camera, aspect: f32) -> SkyGpuUniforms {
        let (fog_near, fog_far, fog_color, fog_enabled) = match self.fog {
            Some(fog) => (fog.near, fog.far, fog.color.to_linear().to_array(), 1.0),
            None => (0.0, 0.0, [0.0; 3], 0.0),
        };
        SkyGpuUniforms {
            color_a: self.color_a.to_linear().to_array(),
            time: self.time,
            color_b: self.color_b.to_linear().to_array(),
            progress: self.progress,
            fog_color,
            height: self.height,
            resolution: self.resolution.to_array(),
            step: self.step,
            fog_near,
            fog_far,
            fog_enabled,
            camera_forward: camera.forward.to_array(),
            fov: camera.fov,
            camera_right: camera.right().to_array(),
            aspect,
            camera_up: camera.orthogonal_up().to_array(),
            _padding: 0.0,
        }
    }
}

/// Uniform buffer layout bound at `@group(0) @binding(0)` in `sky.wgsl`.
///
/// Every `vec3f` is followed by a scalar so the struct packs into 16-byte rows.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyGpuUniforms {
    pub color_a: [f32; 3],
    pub time: f32,
    pub color_b: [f32; 3],
    pub progress: f32,
    pub fog_color: [f32; 3],
    pub height: f32,
    pub resolution: [f32; 4],
    pub step: f32,
    pub fog_near: f32,
    pub fog_far: f32,
    pub fog_enabled: f32,
    pub camera_forward: [f32; 3],
    pub fov: f32,
    pub camera_right: [f32; 3],
    pub aspect: f32,
    pub camera_up: [f32; 3],
    pub _padding: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_layout_is_row_aligned() {
        assert_eq!(std::mem::size_of::<SkyGpuUniforms>(), 128);
    }

    #[test]
    fn fog_flag_follows_fog_slot() {
        let mut uniforms = SkyUniforms {
            time: 1.0,
            progress: 1.0,
            height: 0.0,
            step: 0.4,
            color_a: Color::WHITE,
            color_b: Color::BLACK,
            resolution: Vec4::ZERO,
            fog: None,
        };
        let camera = Camera::default();
        assert_eq!(uniforms.to_gpu(&camera, 1.0).fog_enabled, 0.0);

        uniforms.fog = Some(Fog::new(Color::WHITE, 10.0, 100.0).into());
        let gpu = uniforms.to_gpu(&camera, 1.5);
        assert_eq!(gpu.fog_enabled, 1.0);
        assert_eq!(gpu.fog_near, 10.0);
        assert_eq!(gpu.fog_far, 100.0);
        assert_eq!(gpu.aspect, 1.5);
    }
}
