//! GPU side of the sky: compiles the material's program and draws the backdrop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::material::{ProgramKey, SkyMaterial};
use super::program::ShaderProgram;
use super::uniforms::SkyGpuUniforms;
use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::scene::Drawable;

/// Fullscreen sky backdrop drawn with a [`SkyMaterial`].
///
/// The program is compiled lazily on first draw and again whenever the
/// material's [`ProgramKey`] changes. Each compile goes through
/// [`SkyMaterial::on_before_compile`] on a fresh [`ShaderProgram`], so the
/// material always writes into the program that is actually drawn.
pub struct SkyMesh {
    material: Rc<RefCell<SkyMaterial>>,
    key: Cell<Option<ProgramKey>>,
    compiled: RefCell<Option<CompiledSky>>,
}

impl SkyMesh {
    pub fn new(material: Rc<RefCell<SkyMaterial>>) -> Self {
        Self {
            material,
            key: Cell::new(None),
            compiled: RefCell::new(None),
        }
    }

    pub fn material(&self) -> &Rc<RefCell<SkyMaterial>> {
        &self.material
    }

    /// A freshly bound program if the material's key moved since the last
    /// compile, `None` if the current program is still valid.
    fn prepare_program(&self) -> Option<ShaderProgram> {
        let key = self.material.borrow().program_key();
        if self.key.get() == Some(key) {
            return None;
        }

        let mut program = ShaderProgram::new("Sky Program");
        self.material.borrow_mut().on_before_compile(&mut program);
        self.key.set(Some(key));
        tracing::debug!(version = key.version, fog = key.fog, "compiling sky program");
        Some(program)
    }
}

impl Drawable for SkyMesh {
    fn draw(&self, gpu: &GpuContext, pass: &mut wgpu::RenderPass<'_>, camera: &Camera) {
        if let Some(program) = self.prepare_program() {
            *self.compiled.borrow_mut() = Some(CompiledSky::new(gpu, program));
        }

        if let Some(sky) = self.compiled.borrow().as_ref() {
            sky.render(gpu, pass, camera);
        }
    }

    fn render_order(&self) -> i32 {
        i32::MIN
    }
}

struct CompiledSky {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl CompiledSky {
    fn new(gpu: &GpuContext, program: ShaderProgram) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.label()),
            source: wgpu::ShaderSource::Wgsl(program.source().to_owned().into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sky Uniforms"),
            size: std::mem::size_of::<SkyGpuUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sky Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sky Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            program,
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    fn render(&self, gpu: &GpuContext, pass: &mut wgpu::RenderPass<'_>, camera: &Camera) {
        let Some(uniforms) = self.program.uniforms() else {
            return;
        };
        let packed = uniforms.to_gpu(camera, gpu.aspect());
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[packed]));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
