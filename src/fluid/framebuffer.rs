use glam::{UVec2, Vec2};
use wgpu::TextureFormat;

use crate::fluid::programs::{Destination, Kernel, KernelParams, ProgramRegistry, TextureInput};
use crate::renderer::wgpu_context::WgpuContext;

/// Format and sampling of a render target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetSpec {
    pub format: TextureFormat,
    pub filter: wgpu::FilterMode,
}

impl TargetSpec {
    pub fn new(format: TextureFormat, filter: wgpu::FilterMode) -> Self {
        Self { format, filter }
    }
}

/// Anything with pixel dimensions.
pub trait TargetSize {
    fn size(&self) -> UVec2;
}

/// A texture that can be both drawn into and sampled.
#[derive(Debug)]
pub struct RenderTarget {
    label: String,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    spec: TargetSpec,
}

impl RenderTarget {
    /// Allocates a `width` x `height` target and clears it to transparent black.
    pub fn new(wgpu_context: &WgpuContext, label: &str, width: u32, height: u32, spec: TargetSpec) -> Self {
        let device = wgpu_context.get_device();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: spec.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: spec.filter,
            min_filter: spec.filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let target = Self { label: label.to_owned(), texture, view, sampler, spec };
        target.clear(wgpu_context);
        target
    }

    fn clear(&self, wgpu_context: &WgpuContext) {
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Target Clear Encoder"),
        });
        {
            let _clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&format!("Clear {}", self.label)),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        wgpu_context.get_queue().submit(std::iter::once(encoder.finish()));
    }

    /// Allocates a target of the new size and format and resamples this one into it.
    pub fn resize(
        &self,
        wgpu_context: &WgpuContext,
        programs: &mut ProgramRegistry,
        width: u32,
        height: u32,
        spec: TargetSpec,
    ) -> Self {
        let resized = Self::new(wgpu_context, &self.label, width, height, spec);
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Target Resample Encoder"),
        });
        programs.draw(
            wgpu_context,
            &mut encoder,
            Kernel::Copy,
            &KernelParams::with_texel_size(resized.texel_size()),
            &[("u_texture", self.input())],
            resized.destination(),
        );
        programs.submit(wgpu_context, encoder);
        log::debug!("Resized {} to {width}x{height}", self.label);
        resized
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    /// One texel in uv units, for the current dimensions.
    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width() as f32, 1.0 / self.height() as f32)
    }

    pub fn spec(&self) -> TargetSpec {
        self.spec
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn input(&self) -> TextureInput<'_> {
        TextureInput { view: &self.view, sampler: &self.sampler }
    }

    pub fn destination(&self) -> Destination<'_> {
        Destination::new(&self.view, self.spec.format)
    }
}

impl TargetSize for RenderTarget {
    fn size(&self) -> UVec2 {
        UVec2::new(self.width(), self.height())
    }
}

/// Two buffers of the same field. Kernels read one and write the other, then `swap`.
#[derive(Debug)]
pub struct PingPong<T> {
    targets: [T; 2],
    read_index: usize,
}

impl<T> PingPong<T> {
    pub fn new(read: T, write: T) -> Self {
        Self { targets: [read, write], read_index: 0 }
    }

    pub fn read(&self) -> &T {
        &self.targets[self.read_index]
    }

    pub fn write(&self) -> &T {
        &self.targets[1 - self.read_index]
    }

    pub fn swap(&mut self) {
        self.read_index = 1 - self.read_index;
    }
}

impl<T: TargetSize> PingPong<T> {
    pub fn size(&self) -> UVec2 {
        self.read().size()
    }

    /// Rebuilds both sides at `size`: `resample` carries the read side's contents over,
    /// `allocate` replaces the write side. Nothing happens if the size is unchanged.
    pub fn resize_with(&mut self, size: UVec2, resample: impl FnOnce(&T) -> T, allocate: impl FnOnce(&T) -> T) {
        if self.size() != size {
            self.rebuild_with(resample, allocate);
        }
    }

    /// Like `resize_with`, but always rebuilds.
    pub fn rebuild_with(&mut self, resample: impl FnOnce(&T) -> T, allocate: impl FnOnce(&T) -> T) {
        let read = resample(self.read());
        let write = allocate(self.write());
        *self = Self::new(read, write);
    }
}

pub type DoubleRenderTarget = PingPong<RenderTarget>;

impl PingPong<RenderTarget> {
    pub fn create(wgpu_context: &WgpuContext, label: &str, width: u32, height: u32, spec: TargetSpec) -> Self {
        Self::new(
            RenderTarget::new(wgpu_context, &format!("{label} A"), width, height, spec),
            RenderTarget::new(wgpu_context, &format!("{label} B"), width, height, spec),
        )
    }

    pub fn texel_size(&self) -> Vec2 {
        self.read().texel_size()
    }

    /// Keeps the field's contents while changing its resolution or format.
    /// Nothing happens if neither changed.
    pub fn resize(
        &mut self,
        wgpu_context: &WgpuContext,
        programs: &mut ProgramRegistry,
        width: u32,
        height: u32,
        spec: TargetSpec,
    ) {
        if self.size() == UVec2::new(width, height) && self.read().spec() == spec {
            return;
        }
        self.rebuild_with(
            |read| read.resize(wgpu_context, programs, width, height, spec),
            |write| RenderTarget::new(wgpu_context, &write.label, width, height, spec),
        );
    }
}

/// Texture size for a field whose short side has `resolution` texels, matching the
/// aspect ratio and orientation of `canvas`.
pub fn get_resolution(resolution: u32, canvas: UVec2) -> UVec2 {
    let canvas = canvas.max(UVec2::ONE).as_vec2();
    let mut aspect_ratio = canvas.x / canvas.y;
    if aspect_ratio < 1.0 {
        aspect_ratio = 1.0 / aspect_ratio;
    }

    let min = resolution;
    let max = (resolution as f32 * aspect_ratio).round() as u32;

    if canvas.x > canvas.y {
        UVec2::new(max, min)
    } else {
        UVec2::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FakeTarget {
        name: &'static str,
        size: UVec2,
    }

    impl TargetSize for FakeTarget {
        fn size(&self) -> UVec2 {
            self.size
        }
    }

    fn fake_pair(size: UVec2) -> PingPong<FakeTarget> {
        PingPong::new(FakeTarget { name: "a", size }, FakeTarget { name: "b", size })
    }

    #[test]
    fn swap_exchanges_read_and_write() {
        let mut pair = fake_pair(UVec2::splat(4));
        assert_eq!(pair.read().name, "a");
        assert_eq!(pair.write().name, "b");

        pair.swap();
        assert_eq!(pair.read().name, "b");
        assert_eq!(pair.write().name, "a");

        pair.swap();
        assert_eq!(pair.read().name, "a");
    }

    #[test]
    fn resize_to_the_same_size_keeps_both_targets() {
        let mut pair = fake_pair(UVec2::splat(4));
        pair.resize_with(
            UVec2::splat(4),
            |_| panic!("read side must not be resampled"),
            |_| panic!("write side must not be reallocated"),
        );
        assert_eq!(pair.read().name, "a");
    }

    #[test]
    fn resize_resamples_the_current_read_side() {
        let mut pair = fake_pair(UVec2::splat(4));
        pair.swap();

        pair.resize_with(
            UVec2::new(8, 2),
            |read| FakeTarget { name: if read.name == "b" { "resampled b" } else { "wrong side" }, size: UVec2::new(8, 2) },
            |write| FakeTarget { name: if write.name == "a" { "fresh a" } else { "wrong side" }, size: UVec2::new(8, 2) },
        );

        assert_eq!(pair.read().name, "resampled b");
        assert_eq!(pair.write().name, "fresh a");
        assert_eq!(pair.size(), UVec2::new(8, 2));
    }

    #[test]
    fn resolution_follows_landscape_canvas() {
        assert_eq!(get_resolution(256, UVec2::new(1920, 1080)), UVec2::new(455, 256));
    }

    #[test]
    fn resolution_follows_portrait_canvas() {
        assert_eq!(get_resolution(128, UVec2::new(500, 1000)), UVec2::new(128, 256));
    }

    #[test]
    fn square_canvas_gives_square_field() {
        assert_eq!(get_resolution(32, UVec2::new(64, 64)), UVec2::new(32, 32));
    }
}
