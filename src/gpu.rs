//! Core GPU context and device management.
//!
//! This module provides [`GpuContext`], the wgpu implementation of
//! [`RenderDevice`]. It owns the instance-derived surface, the device and
//! queue, the surface configuration and the draw-list cache used by the scene
//! pass.
//!
//! # Initialization
//!
//! A `GpuContext` is created from a winit [`Window`] and handles all the wgpu
//! boilerplate: surface creation, adapter selection, device/queue creation
//! and surface configuration at the viewport's drawing size.
//!
//! [`Window`]: winit::window::Window

use std::sync::Arc;

use winit::window::Window;

use crate::camera::Camera;
use crate::color::Color;
use crate::error::RenderError;
use crate::render_graph::{RenderDevice, RenderOutput, RenderTarget};
use crate::scene::Scene;
use crate::viewport::{Extent, Viewport};

/// Core GPU context holding wgpu resources.
///
/// All wgpu fields are public to allow direct access when needed, for example
/// by [`Drawable`](crate::Drawable) implementations creating their pipelines.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
    clear_color: Color,
    render_lists: RenderLists,
}

/// Recording state for one frame on a [`GpuContext`].
pub struct GpuFrame {
    pub output: wgpu::SurfaceTexture,
    /// View of the surface texture, the target for [`RenderOutput::Screen`].
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuContext {
    /// Create a new GPU context for `window`, sized to `viewport`.
    ///
    /// Fails if the surface, adapter or device cannot be created, or if the
    /// drawing size exceeds the device's texture limit.
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        tracing::debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Skydome Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, alpha_mode) = select_surface_config(&surface_caps)?;

        let drawing = viewport.drawing_size();
        check_limits(&device, drawing)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: drawing.width,
            height: drawing.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            viewport,
            clear_color: Color::BLACK,
            render_lists: RenderLists::default(),
        })
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Returns the current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }
}

impl RenderDevice for GpuContext {
    type Target = RenderTarget;
    type Frame = GpuFrame;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        let drawing = viewport.drawing_size();
        check_limits(&self.device, drawing)?;
        self.viewport = viewport;
        if self.config.width != drawing.width || self.config.height != drawing.height {
            self.config.width = drawing.width;
            self.config.height = drawing.height;
            self.surface.configure(&self.device, &self.config);
        }
        Ok(())
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn create_render_target(&mut self, label: &str, size: Extent) -> Result<RenderTarget, RenderError> {
        check_limits(&self.device, size)?;
        Ok(RenderTarget::new(&self.device, label, self.config.format, size))
    }

    fn resize_render_target(&mut self, target: &mut RenderTarget, size: Extent) -> Result<(), RenderError> {
        check_limits(&self.device, size)?;
        if target.resize(&self.device, size) {
            tracing::trace!(
                label = target.label(),
                width = size.width,
                height = size.height,
                "resized render target"
            );
        }
        Ok(())
    }

    fn release_render_target(&mut self, target: RenderTarget) {
        target.release();
    }

    fn begin_frame(&mut self) -> Result<GpuFrame, RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture()?
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        Ok(GpuFrame {
            output,
            view,
            encoder,
        })
    }

    fn render_scene(
        &mut self,
        frame: &mut GpuFrame,
        scene: &Scene,
        camera: &Camera,
        output: RenderOutput<'_, RenderTarget>,
    ) {
        // Take the list out so drawables can borrow the context.
        let mut lists = std::mem::take(&mut self.render_lists);
        lists.build(scene);

        let view = match output {
            RenderOutput::Screen => &frame.view,
            RenderOutput::Target(target) => &target.view,
        };

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let objects = scene.objects();
            for &index in lists.order() {
                objects[index].draw(self, &mut pass, camera);
            }
        }

        self.render_lists = lists;
    }

    fn end_frame(&mut self, frame: GpuFrame) {
        let GpuFrame {
            output, encoder, ..
        } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn release_render_lists(&mut self) {
        self.render_lists.dispose();
    }

    fn dispose(self) {
        tracing::debug!("destroying GPU device");
        self.device.destroy();
    }
}

/// Prefer an sRGB format, falling back to the first one offered.
fn select_surface_config(
    caps: &wgpu::SurfaceCapabilities,
) -> Result<(wgpu::TextureFormat, wgpu::CompositeAlphaMode), RenderError> {
    let format = caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first())
        .copied()
        .ok_or(RenderError::UnsupportedSurface("texture format"))?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .ok_or(RenderError::UnsupportedSurface("alpha mode"))?;
    Ok((format, alpha_mode))
}

fn check_limits(device: &wgpu::Device, size: Extent) -> Result<(), RenderError> {
    let max = device.limits().max_texture_dimension_2d;
    if size.width > max || size.height > max {
        return Err(RenderError::TargetTooLarge {
            width: size.width,
            height: size.height,
            max,
        });
    }
    Ok(())
}

/// Cached draw order for the scene pass.
///
/// Rebuilt every frame but reuses its allocation, so steady-state frames do
/// not allocate. [`dispose`](Self::dispose) returns the memory.
#[derive(Default)]
struct RenderLists {
    entries: Vec<(i32, usize)>,
    order: Vec<usize>,
}

impl RenderLists {
    fn build(&mut self, scene: &Scene) {
        self.entries.clear();
        self.entries.extend(
            scene
                .objects()
                .iter()
                .enumerate()
                .filter(|(_, object)| object.visible())
                .map(|(index, object)| (object.render_order(), index)),
        );
        // Stable: equal render orders keep insertion order.
        self.entries.sort_by_key(|&(order, _)| order);
        self.order.clear();
        self.order.extend(self.entries.iter().map(|&(_, index)| index));
    }

    fn order(&self) -> &[usize] {
        &self.order
    }

    fn dispose(&mut self) {
        self.entries = Vec::new();
        self.order = Vec::new();
    }
}
