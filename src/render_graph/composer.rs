//! The pass chain and its ping-pong buffers.

use crate::error::RenderError;
use crate::render_graph::{Pass, RenderBuffer, RenderDevice, RenderOutput};
use crate::viewport::{Extent, Viewport};

const TARGET_B_LABEL: &str = "Composer Target B";

/// An ordered chain of passes with two intermediate buffers.
///
/// Each pass reads the previous pass's output and the final pass renders
/// straight to the screen. Intermediate results alternate between the two
/// buffers:
///
/// ```text
/// Pass 0: None     → Target A
/// Pass 1: Target A → Target B
/// Pass 2: Target B → Target A
/// Pass 3: Target A → Screen
/// ```
///
/// A single-pass chain draws directly to the screen. Which buffer a pass
/// writes depends only on its index, so rendering the same chain twice
/// produces the same submissions.
pub struct Composer<D: RenderDevice> {
    passes: Vec<Box<dyn Pass<D>>>,
    target_a: D::Target,
    target_b: D::Target,
    viewport: Viewport,
}

impl<D: RenderDevice> Composer<D> {
    /// Builds a chain around `render_target`, which becomes buffer A.
    ///
    /// Buffer B is allocated from `device` at the same drawing size. Both are
    /// brought to the viewport's drawing size before returning.
    pub fn new(device: &mut D, render_target: D::Target, viewport: Viewport) -> Result<Self, RenderError> {
        let size = viewport.drawing_size();
        let mut target_a = render_target;
        if let Err(err) = device.resize_render_target(&mut target_a, size) {
            device.release_render_target(target_a);
            return Err(err);
        }
        let target_b = match device.create_render_target(TARGET_B_LABEL, size) {
            Ok(target) => target,
            Err(err) => {
                device.release_render_target(target_a);
                return Err(err);
            }
        };

        Ok(Self {
            passes: Vec::new(),
            target_a,
            target_b,
            viewport,
        })
    }

    /// Appends a pass to the end of the chain.
    pub fn add_pass<P: Pass<D> + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    pub fn passes(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|pass| pass.label())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resizes both buffers to the viewport's drawing size.
    ///
    /// On failure both buffers are back at their previous size.
    pub fn set_viewport(&mut self, device: &mut D, viewport: Viewport) -> Result<(), RenderError> {
        let size = viewport.drawing_size();
        let previous = self.target_a.size();
        device.resize_render_target(&mut self.target_a, size)?;
        if let Err(err) = device.resize_render_target(&mut self.target_b, size) {
            if let Err(restore) = device.resize_render_target(&mut self.target_a, previous) {
                tracing::warn!(%restore, "failed to restore chain buffer size");
            }
            return Err(err);
        }
        self.viewport = viewport;
        Ok(())
    }

    /// The chain's first buffer, which is the pipeline's render target.
    pub fn render_target(&self) -> &D::Target {
        &self.target_a
    }

    pub fn buffers(&self) -> [&D::Target; 2] {
        [&self.target_a, &self.target_b]
    }

    pub fn buffer_size(&self) -> Extent {
        self.target_a.size()
    }

    /// Records every pass into `frame`.
    pub fn render(&self, device: &mut D, frame: &mut D::Frame) {
        let pass_count = self.passes.len();
        let mut input: Option<&D::Target> = None;

        for (i, pass) in self.passes.iter().enumerate() {
            let is_last = i + 1 == pass_count;
            let target = if i % 2 == 0 {
                &self.target_a
            } else {
                &self.target_b
            };

            let output = if is_last {
                RenderOutput::Screen
            } else {
                RenderOutput::Target(target)
            };
            pass.render(device, frame, input, output);

            if !is_last {
                input = Some(target);
            }
        }
    }

    /// Releases both buffers through `device`.
    pub fn release(self, device: &mut D) {
        let Self {
            passes,
            target_a,
            target_b,
            ..
        } = self;
        drop(passes);
        device.release_render_target(target_a);
        device.release_render_target(target_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_graph::testing::{DrawCall, Output, RecordingDevice, RecordingPass, TestFrame};

    fn composer(device: &mut RecordingDevice, viewport: Viewport) -> Composer<RecordingDevice> {
        let target = device.create_render_target("A", viewport.drawing_size()).unwrap();
        Composer::new(device, target, viewport).unwrap()
    }

    fn routes(frame: &TestFrame) -> Vec<(Option<usize>, Output)> {
        frame
            .calls
            .iter()
            .map(|call| match call {
                DrawCall::Effect { input, output, .. } => (*input, *output),
                DrawCall::Scene { output, .. } => (None, *output),
            })
            .collect()
    }

    #[test]
    fn empty_chain_records_nothing() {
        let mut device = RecordingDevice::new();
        let viewport = Viewport::new(64, 32, 1.0).unwrap();
        let composer = composer(&mut device, viewport);

        let mut frame = TestFrame::default();
        composer.render(&mut device, &mut frame);
        assert!(frame.calls.is_empty());
        assert!(composer.is_empty());
    }

    #[test]
    fn passes_alternate_buffers_and_end_on_screen() {
        let mut device = RecordingDevice::new();
        let viewport = Viewport::new(64, 32, 1.0).unwrap();
        let mut composer = composer(&mut device, viewport);
        for label in ["first", "second", "third", "fourth", "fifth"] {
            composer.add_pass(RecordingPass::new(label));
        }
        assert_eq!(composer.len(), 5);

        let mut frame = TestFrame::default();
        composer.render(&mut device, &mut frame);
        assert_eq!(
            routes(&frame),
            [
                (None, Output::Target(0)),
                (Some(0), Output::Target(1)),
                (Some(1), Output::Target(0)),
                (Some(0), Output::Target(1)),
                (Some(1), Output::Screen),
            ]
        );
    }

    #[test]
    fn new_adopts_render_target_at_drawing_size() {
        let mut device = RecordingDevice::new();
        let log = device.log();
        let target = device.create_render_target("A", Extent::new(10, 10)).unwrap();
        let viewport = Viewport::new(100, 50, 2.0).unwrap();
        let composer = Composer::new(&mut device, target, viewport).unwrap();

        assert_eq!(composer.buffer_size(), Extent::new(200, 100));
        assert_eq!(composer.buffers()[1].size(), Extent::new(200, 100));
        assert_eq!(log.borrow().resized, vec![(0, Extent::new(200, 100))]);
        assert_eq!(composer.render_target().id, 0);
    }

    #[test]
    fn failed_construction_releases_render_target() {
        let mut device = RecordingDevice::new();
        let log = device.log();
        let target = device.create_render_target("A", Extent::new(10, 10)).unwrap();
        device.max_dimension = Some(64);

        let viewport = Viewport::new(100, 50, 1.0).unwrap();
        let result = Composer::new(&mut device, target, viewport);
        assert!(matches!(result, Err(RenderError::TargetTooLarge { .. })));
        assert_eq!(log.borrow().released, vec![0]);
    }

    #[test]
    fn failed_resize_keeps_buffers_matched() {
        let mut device = RecordingDevice::new();
        let viewport = Viewport::new(64, 32, 1.0).unwrap();
        let mut composer = composer(&mut device, viewport);

        device.fail_resize_of = Some(1);
        let result = composer.set_viewport(&mut device, Viewport::new(128, 64, 1.0).unwrap());
        assert!(matches!(result, Err(RenderError::TargetTooLarge { .. })));
        assert_eq!(composer.viewport(), viewport);
        for buffer in composer.buffers() {
            assert_eq!(buffer.size(), Extent::new(64, 32));
        }
    }

    #[test]
    fn release_frees_both_buffers() {
        let mut device = RecordingDevice::new();
        let log = device.log();
        let viewport = Viewport::new(64, 32, 1.0).unwrap();
        let composer = composer(&mut device, viewport);
        composer.release(&mut device);
        assert_eq!(log.borrow().released, vec![0, 1]);
    }
}
