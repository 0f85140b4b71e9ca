//! A [`RenderDevice`] that records what it is asked to do instead of drawing.

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::Camera;
use crate::color::Color;
use crate::error::RenderError;
use crate::render_graph::{Pass, RenderBuffer, RenderDevice, RenderOutput};
use crate::scene::Scene;
use crate::viewport::{Extent, Viewport};

#[derive(Debug)]
pub struct TestTarget {
    pub id: usize,
    size: Extent,
}

impl RenderBuffer for TestTarget {
    fn size(&self) -> Extent {
        self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Screen,
    Target(usize),
}

impl From<RenderOutput<'_, TestTarget>> for Output {
    fn from(output: RenderOutput<'_, TestTarget>) -> Self {
        match output {
            RenderOutput::Screen => Output::Screen,
            RenderOutput::Target(target) => Output::Target(target.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Scene {
        output: Output,
        objects: usize,
        fogged: bool,
    },
    Effect {
        label: String,
        input: Option<usize>,
        output: Output,
    },
}

#[derive(Debug, Default)]
pub struct TestFrame {
    pub calls: Vec<DrawCall>,
}

/// Everything the device saw, shared so tests can inspect it after the
/// device has been moved into (or disposed by) a pipeline.
#[derive(Debug, Default)]
pub struct DeviceLog {
    pub created: Vec<(usize, String, Extent)>,
    pub resized: Vec<(usize, Extent)>,
    pub released: Vec<usize>,
    pub viewport: Option<Viewport>,
    pub clear_color: Option<Color>,
    pub submissions: Vec<Vec<DrawCall>>,
    pub render_lists_released: usize,
    pub disposed: usize,
}

impl DeviceLog {
    pub fn release_count(&self, id: usize) -> usize {
        self.released.iter().filter(|&&released| released == id).count()
    }
}

#[derive(Default)]
pub struct RecordingDevice {
    log: Rc<RefCell<DeviceLog>>,
    next_id: usize,
    /// Targets above this size fail with [`RenderError::TargetTooLarge`].
    pub max_dimension: Option<u32>,
    /// When set, `begin_frame` fails as if the surface were lost.
    pub lose_surface: bool,
    /// Resizing the target with this id to a new size fails.
    pub fail_resize_of: Option<usize>,
    /// When set, `set_viewport` fails.
    pub fail_set_viewport: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dimension(max: u32) -> Self {
        Self {
            max_dimension: Some(max),
            ..Self::default()
        }
    }

    pub fn log(&self) -> Rc<RefCell<DeviceLog>> {
        Rc::clone(&self.log)
    }

    fn check(&self, size: Extent) -> Result<(), RenderError> {
        match self.max_dimension {
            Some(max) if size.width > max || size.height > max => Err(RenderError::TargetTooLarge {
                width: size.width,
                height: size.height,
                max,
            }),
            _ => Ok(()),
        }
    }
}

impl RenderDevice for RecordingDevice {
    type Target = TestTarget;
    type Frame = TestFrame;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.check(viewport.drawing_size())?;
        if self.fail_set_viewport {
            return Err(wgpu::SurfaceError::Lost.into());
        }
        self.log.borrow_mut().viewport = Some(viewport);
        Ok(())
    }

    fn set_clear_color(&mut self, color: Color) {
        self.log.borrow_mut().clear_color = Some(color);
    }

    fn create_render_target(&mut self, label: &str, size: Extent) -> Result<TestTarget, RenderError> {
        self.check(size)?;
        let id = self.next_id;
        self.next_id += 1;
        self.log.borrow_mut().created.push((id, label.to_string(), size));
        Ok(TestTarget { id, size })
    }

    fn resize_render_target(&mut self, target: &mut TestTarget, size: Extent) -> Result<(), RenderError> {
        self.check(size)?;
        if target.size != size {
            if self.fail_resize_of == Some(target.id) {
                return Err(RenderError::TargetTooLarge {
                    width: size.width,
                    height: size.height,
                    max: 0,
                });
            }
            target.size = size;
            self.log.borrow_mut().resized.push((target.id, size));
        }
        Ok(())
    }

    fn release_render_target(&mut self, target: TestTarget) {
        self.log.borrow_mut().released.push(target.id);
    }

    fn begin_frame(&mut self) -> Result<TestFrame, RenderError> {
        if self.lose_surface {
            return Err(wgpu::SurfaceError::Lost.into());
        }
        Ok(TestFrame::default())
    }

    fn render_scene(
        &mut self,
        frame: &mut TestFrame,
        scene: &Scene,
        _camera: &Camera,
        output: RenderOutput<'_, TestTarget>,
    ) {
        frame.calls.push(DrawCall::Scene {
            output: output.into(),
            objects: scene.len(),
            fogged: scene.fog.is_some(),
        });
    }

    fn end_frame(&mut self, frame: TestFrame) {
        self.log.borrow_mut().submissions.push(frame.calls);
    }

    fn release_render_lists(&mut self) {
        self.log.borrow_mut().render_lists_released += 1;
    }

    fn dispose(self) {
        self.log.borrow_mut().disposed += 1;
    }
}

/// A post-processing pass that only records its inputs and outputs.
pub struct RecordingPass {
    label: String,
}

impl RecordingPass {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl Pass<RecordingDevice> for RecordingPass {
    fn label(&self) -> &str {
        &self.label
    }

    fn render(
        &self,
        _device: &mut RecordingDevice,
        frame: &mut TestFrame,
        input: Option<&TestTarget>,
        output: RenderOutput<'_, TestTarget>,
    ) {
        frame.calls.push(DrawCall::Effect {
            label: self.label.clone(),
            input: input.map(|target| target.id),
            output: output.into(),
        });
    }
}
