use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use super::uniforms::SkyUniforms;

/// A sky program instance about to be compiled.
///
/// The instance owns its live parameter record. The material that binds it
/// only keeps a weak handle, so dropping the program (on recompile or
/// teardown) drops the record and unbinds the material.
pub struct ShaderProgram {
    label: String,
    source: Cow<'static, str>,
    uniforms: Option<Rc<RefCell<SkyUniforms>>>,
}

impl ShaderProgram {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: Cow::Borrowed(""),
            uniforms: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// WGSL source with `vs` and `fs` entry points.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<Cow<'static, str>>) {
        self.source = source.into();
    }

    /// Read-only view of the live parameters, if a material has bound them.
    pub fn uniforms(&self) -> Option<Ref<'_, SkyUniforms>> {
        self.uniforms.as_ref().map(|cell| cell.borrow())
    }

    pub fn is_bound(&self) -> bool {
        self.uniforms.is_some()
    }

    /// Install a fresh parameter record and hand back the writer's handle.
    pub(crate) fn attach_uniforms(&mut self, uniforms: SkyUniforms) -> Weak<RefCell<SkyUniforms>> {
        let cell = Rc::new(RefCell::new(uniforms));
        let handle = Rc::downgrade(&cell);
        self.uniforms = Some(cell);
        handle
    }
}
