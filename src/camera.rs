use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

/// Camera handle shared between the frame driver and the scene pass.
pub type SharedCamera = Rc<RefCell<Camera>>;

/// A simple perspective camera.
///
/// The sky shader only needs orientation and field of view to build view rays;
/// position is kept for drawables that care about it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 60f32.to_radians(),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedCamera {
        Rc::new(RefCell::new(self))
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.forward = (target - self.position).normalize_or_zero();
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    /// Up re-orthogonalized against forward and right.
    pub fn orthogonal_up(&self) -> Vec3 {
        self.right().cross(self.forward).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_orthonormal() {
        let camera = Camera::new().at(0.0, 2.0, 5.0).looking_at(Vec3::ZERO);
        let right = camera.right();
        let up = camera.orthogonal_up();
        assert!(right.dot(camera.forward).abs() < 1e-5);
        assert!(up.dot(camera.forward).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(up.y > 0.0);
    }
}
