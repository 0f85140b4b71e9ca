//! The sky material: default parameters, the arc-rotation blend policy and the
//! per-frame sync of the live program parameters.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec4;

use super::program::ShaderProgram;
use super::uniforms::{FogUniforms, SkyUniforms};
use crate::color::Color;
use crate::config::SkyConfig;
use crate::scene::{Fog, Scene, SharedScene};

const SKY_SHADER: &str = include_str!("../shaders/sky.wgsl");

/// `(1 - t) * start + t * end`.
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    (1.0 - t) * start + t * end
}

/// Blend factor toward the target gradient for an arc rotation `b`.
///
/// A tent with its zero at `b = 0.5`, rising linearly to 1 at both ends of
/// `[0, 1]` and saturating at 1 outside it. NaN maps to 1.
pub fn calculate_a(b: f32) -> f32 {
    if b.is_nan() || b <= 0.0 || b >= 1.0 {
        1.0
    } else if b == 0.5 {
        0.0
    } else if b < 0.5 {
        lerp(1.0, 0.0, b / 0.5)
    } else {
        lerp(0.0, 1.0, (b - 0.5) / 0.5)
    }
}

/// Identity of a compiled sky program.
///
/// A drawable recompiles whenever the key it compiled against differs from the
/// material's current key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramKey {
    pub version: u64,
    pub fog: bool,
}

enum Binding {
    Unbound,
    Bound(Weak<RefCell<SkyUniforms>>),
}

/// Uniform controller for the procedural sky program.
///
/// Holds the default parameters and gradients, binds a live parameter record
/// onto each program instance right before it compiles, and rewrites that
/// record once per frame from [`update`](Self::update).
pub struct SkyMaterial {
    scene: Weak<RefCell<Scene>>,
    props: SkyUniforms,
    target_a: Color,
    target_b: Color,
    binding: Binding,
    version: u64,
}

impl SkyMaterial {
    pub fn new(scene: &SharedScene) -> Self {
        Self::with_config(scene, &SkyConfig::default())
    }

    pub fn with_config(scene: &SharedScene, config: &SkyConfig) -> Self {
        Self {
            scene: Rc::downgrade(scene),
            props: SkyUniforms {
                time: 0.0,
                progress: config.progress,
                height: config.height,
                step: config.step,
                color_a: config.color_a,
                color_b: config.color_b,
                resolution: Vec4::ZERO,
                fog: None,
            },
            target_a: config.target_a,
            target_b: config.target_b,
            binding: Binding::Unbound,
            version: 0,
        }
    }

    pub fn shared(self) -> Rc<RefCell<SkyMaterial>> {
        Rc::new(RefCell::new(self))
    }

    /// Before-compile hook: seed the program's parameters and install the sky source.
    ///
    /// Must run before every (re)compilation; any earlier binding is replaced.
    pub fn on_before_compile(&mut self, program: &mut ShaderProgram) {
        let mut seed = self.props;
        seed.fog = self.scene_fog().map(FogUniforms::from);

        program.set_source(SKY_SHADER);
        let handle = program.attach_uniforms(seed);
        self.binding = Binding::Bound(handle);

        tracing::debug!(
            program = program.label(),
            fog = seed.fog.is_some(),
            version = self.version,
            "bound sky uniforms"
        );
    }

    /// Push one frame of state into the bound program.
    ///
    /// Does nothing until a program has been bound, or after it was dropped.
    pub fn update(&mut self, time: f32, progress: f32, height: f32, step: f32, arc_rotation: f32) {
        let Some(live) = self.live() else {
            return;
        };
        let fog = self.scene_fog();
        let mut uniforms = live.borrow_mut();

        uniforms.time = time;
        uniforms.progress = progress;
        uniforms.height = height;
        uniforms.step = step;

        let blend = calculate_a(arc_rotation);
        uniforms.color_a = self.props.color_a.lerp(self.target_a, blend);
        uniforms.color_b = self.props.color_b.lerp(self.target_b, blend);

        // Fog settings change outside this material, so re-read every frame.
        if let (Some(fog), Some(slot)) = (fog, uniforms.fog.as_mut()) {
            *slot = fog.into();
        }
    }

    /// Set the `resolution` parameter, on the defaults and on the live program.
    pub fn set_resolution(&mut self, resolution: Vec4) {
        self.props.resolution = resolution;
        if let Some(live) = self.live() {
            live.borrow_mut().resolution = resolution;
        }
    }

    /// Request a recompile on the next draw.
    pub fn set_needs_update(&mut self) {
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The key a program compiled right now would have.
    pub fn program_key(&self) -> ProgramKey {
        ProgramKey {
            version: self.version,
            fog: self.scene_fog().is_some(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.live().is_some()
    }

    /// Snapshot of the live parameters, if bound.
    pub fn live_uniforms(&self) -> Option<SkyUniforms> {
        self.live().map(|live| *live.borrow())
    }

    /// Default parameters seeded into each new program.
    pub fn defaults(&self) -> &SkyUniforms {
        &self.props
    }

    pub fn target_gradient(&self) -> (Color, Color) {
        (self.target_a, self.target_b)
    }

    fn live(&self) -> Option<Rc<RefCell<SkyUniforms>>> {
        match &self.binding {
            Binding::Unbound => None,
            Binding::Bound(handle) => handle.upgrade(),
        }
    }

    fn scene_fog(&self) -> Option<Fog> {
        self.scene.upgrade().and_then(|scene| scene.borrow().fog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn fog(near: f32, far: f32, color: u32) -> Fog {
        Fog::new(Color::from_u32(color), near, far)
    }

    fn bound(scene: &SharedScene) -> (SkyMaterial, ShaderProgram) {
        let mut material = SkyMaterial::new(scene);
        let mut program = ShaderProgram::new("test sky");
        material.on_before_compile(&mut program);
        (material, program)
    }

    #[test]
    fn blend_saturates_outside_unit_interval() {
        for b in [-5.0, -0.001, 0.0, 1.0, 1.001, 7.0, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(calculate_a(b), 1.0, "b = {b}");
        }
    }

    #[test]
    fn blend_is_zero_at_midpoint() {
        assert_eq!(calculate_a(0.5), 0.0);
    }

    #[test]
    fn blend_segments_are_linear() {
        assert_eq!(calculate_a(0.25), 0.5);
        assert_eq!(calculate_a(0.75), 0.5);
        for b in [0.05f32, 0.1, 0.3, 0.45] {
            assert!((calculate_a(b) - (1.0 - 2.0 * b)).abs() < 1e-6, "b = {b}");
        }
        for b in [0.55f32, 0.7, 0.9, 0.99] {
            assert!((calculate_a(b) - (2.0 * b - 1.0)).abs() < 1e-6, "b = {b}");
        }
    }

    #[test]
    fn blend_is_continuous_around_midpoint() {
        let below = calculate_a(0.5 - 1e-4);
        let above = calculate_a(0.5 + 1e-4);
        assert!(below > 0.0 && below < 1e-3);
        assert!(above > 0.0 && above < 1e-3);
    }

    #[test]
    fn blend_maps_nan_to_one() {
        assert_eq!(calculate_a(f32::NAN), 1.0);
    }

    #[test]
    fn update_before_binding_is_a_no_op() {
        let scene = Scene::new().shared();
        let mut material = SkyMaterial::new(&scene);
        material.update(1.0, 2.0, 0.5, 0.2, 0.3);
        assert!(!material.is_bound());
        assert!(material.live_uniforms().is_none());

        let mut program = ShaderProgram::new("late");
        material.on_before_compile(&mut program);
        assert_eq!(program.uniforms().unwrap().time, 0.0);
    }

    #[test]
    fn binding_seeds_defaults_and_source() {
        let scene = Scene::new().shared();
        let (material, program) = bound(&scene);
        let live = *program.uniforms().unwrap();
        assert_eq!(&live, material.defaults());
        assert_eq!(live.step, 0.4);
        assert_eq!(live.progress, 1.0);
        assert!(live.fog.is_none());
        assert!(program.source().contains("fn fs"));
    }

    #[test]
    fn binding_seeds_fog_when_scene_has_fog() {
        let scene = Scene::new().with_fog(fog(10.0, 500.0, 0xddf0ff)).shared();
        let (_material, program) = bound(&scene);
        let slot = program.uniforms().unwrap().fog.unwrap();
        assert_eq!(slot.near, 10.0);
        assert_eq!(slot.far, 500.0);
        assert_eq!(slot.color, Color::from_u32(0xddf0ff));
    }

    #[test]
    fn update_writes_scalars_verbatim() {
        let scene = Scene::new().shared();
        let (mut material, program) = bound(&scene);
        material.update(12.5, 3.0, 0.25, 0.7, 0.5);
        let live = program.uniforms().unwrap();
        assert_eq!(live.time, 12.5);
        assert_eq!(live.progress, 3.0);
        assert_eq!(live.height, 0.25);
        assert_eq!(live.step, 0.7);
    }

    #[test]
    fn gradient_round_trips_at_blend_extremes() {
        let scene = Scene::new().shared();
        let (mut material, program) = bound(&scene);
        let base = *material.defaults();
        let (target_a, target_b) = material.target_gradient();

        material.update(0.0, 1.0, 0.0, 0.4, 0.5);
        assert_eq!(program.uniforms().unwrap().color_a, base.color_a);
        assert_eq!(program.uniforms().unwrap().color_b, base.color_b);

        material.update(0.0, 1.0, 0.0, 0.4, 1.0);
        assert_eq!(program.uniforms().unwrap().color_a, target_a);
        assert_eq!(program.uniforms().unwrap().color_b, target_b);

        // Blending never accumulates into the defaults.
        material.update(0.0, 1.0, 0.0, 0.4, 0.5);
        assert_eq!(program.uniforms().unwrap().color_a, base.color_a);
    }

    #[test]
    fn gradient_is_halfway_at_quarter_rotation() {
        let scene = Scene::new().shared();
        let (mut material, program) = bound(&scene);
        let base = material.defaults().color_a;
        let (target, _) = material.target_gradient();
        material.update(0.0, 1.0, 0.0, 0.4, 0.25);
        assert_eq!(program.uniforms().unwrap().color_a, base.lerp(target, 0.5));
    }

    #[test]
    fn fog_is_reread_on_every_update() {
        let scene = Scene::new().with_fog(fog(1.0, 100.0, 0xffffff)).shared();
        let (mut material, program) = bound(&scene);

        scene.borrow_mut().fog = Some(fog(5.0, 50.0, 0x336699));
        material.update(0.0, 1.0, 0.0, 0.4, 0.5);
        let slot = program.uniforms().unwrap().fog.unwrap();
        assert_eq!((slot.near, slot.far), (5.0, 50.0));
        assert_eq!(slot.color, Color::from_u32(0x336699));

        scene.borrow_mut().fog = Some(fog(8.0, 80.0, 0x000000));
        material.update(0.0, 1.0, 0.0, 0.4, 0.5);
        let slot = program.uniforms().unwrap().fog.unwrap();
        assert_eq!((slot.near, slot.far), (8.0, 80.0));
        assert_eq!(slot.color, Color::BLACK);
    }

    #[test]
    fn removed_fog_leaves_last_values_in_place() {
        let scene = Scene::new().with_fog(fog(2.0, 20.0, 0x112233)).shared();
        let (mut material, program) = bound(&scene);

        scene.borrow_mut().fog = None;
        material.update(0.0, 1.0, 0.0, 0.4, 0.5);
        let slot = program.uniforms().unwrap().fog.unwrap();
        assert_eq!((slot.near, slot.far), (2.0, 20.0));
    }

    #[test]
    fn fog_added_after_binding_waits_for_recompile() {
        let scene = Scene::new().shared();
        let (mut material, program) = bound(&scene);
        let key = material.program_key();

        scene.borrow_mut().fog = Some(fog(3.0, 30.0, 0xffffff));
        material.update(0.0, 1.0, 0.0, 0.4, 0.5);
        assert!(program.uniforms().unwrap().fog.is_none());
        assert_ne!(material.program_key(), key);
    }

    #[test]
    fn dropping_the_program_unbinds() {
        let scene = Scene::new().shared();
        let (mut material, program) = bound(&scene);
        assert!(material.is_bound());
        drop(program);
        assert!(!material.is_bound());
        material.update(1.0, 1.0, 0.0, 0.4, 0.1);
    }

    #[test]
    fn rebinding_moves_writes_to_the_new_program() {
        let scene = Scene::new().shared();
        let (mut material, old) = bound(&scene);
        material.set_needs_update();

        let mut fresh = ShaderProgram::new("recompiled");
        material.on_before_compile(&mut fresh);
        material.update(9.0, 1.0, 0.0, 0.4, 0.5);

        assert_eq!(fresh.uniforms().unwrap().time, 9.0);
        assert_eq!(old.uniforms().unwrap().time, 0.0);
        assert_eq!(material.version(), 1);
    }

    #[test]
    fn resolution_reaches_defaults_and_live_program() {
        let scene = Scene::new().shared();
        let (mut material, program) = bound(&scene);
        let resolution = Vec4::new(1600.0, 1200.0, 2.0, 4.0 / 3.0);
        material.set_resolution(resolution);
        assert_eq!(program.uniforms().unwrap().resolution, resolution);
        assert_eq!(material.defaults().resolution, resolution);
    }
}
