//! Off-screen render targets backed by wgpu textures.

use crate::render_graph::RenderBuffer;
use crate::viewport::Extent;

/// An off-screen render target used for intermediate pass results.
///
/// Render targets are GPU textures that can be both rendered to (as a color
/// attachment) and sampled from (as a texture binding), which is what lets
/// the pass chain ping-pong between two of them.
///
/// wgpu textures have a fixed size, so [`resize`](Self::resize) swaps a new
/// texture into this same target and destroys the old one immediately rather
/// than leaving it for the allocator to find.
pub struct RenderTarget {
    /// The underlying GPU texture that stores pixel data.
    pub texture: wgpu::Texture,
    /// A view into the texture, used for render pass attachments and shader sampling.
    pub view: wgpu::TextureView,
    label: String,
    format: wgpu::TextureFormat,
    size: Extent,
}

impl RenderTarget {
    /// Creates a render target of `size` in `format`.
    pub fn new(device: &wgpu::Device, label: &str, format: wgpu::TextureFormat, size: Extent) -> Self {
        let (texture, view) = Self::allocate(device, label, format, size);
        Self {
            texture,
            view,
            label: label.to_string(),
            format,
            size,
        }
    }

    /// Resizes in place. Returns `true` if a new texture was allocated.
    pub fn resize(&mut self, device: &wgpu::Device, size: Extent) -> bool {
        if self.size == size {
            return false;
        }
        let (texture, view) = Self::allocate(device, &self.label, self.format, size);
        let old = std::mem::replace(&mut self.texture, texture);
        self.view = view;
        self.size = size;
        old.destroy();
        true
    }

    /// Frees the GPU memory now instead of when the last reference drops.
    pub fn release(self) {
        self.texture.destroy();
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        size: Extent,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }
}

impl RenderBuffer for RenderTarget {
    fn size(&self) -> Extent {
        self.size
    }
}
