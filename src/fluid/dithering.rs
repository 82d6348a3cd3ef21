use crate::fluid::programs::TextureInput;
use crate::renderer::wgpu_context::WgpuContext;

pub const DITHER_SIZE: u32 = 8;

/// RGBA8 texels of the 8x8 ordered-dither pattern, row by row.
pub fn dither_pattern() -> Vec<u8> {
    (0..DITHER_SIZE * DITHER_SIZE)
        .flat_map(|i| {
            let (x, y) = (i % DITHER_SIZE, i / DITHER_SIZE);
            let value = if (x ^ y) & 1 == 1 { 255 } else { 0 };
            [value, value, value, 255]
        })
        .collect()
}

/// Tiled noise added to bloom before gamma encoding to hide banding.
pub struct DitheringTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl DitheringTexture {
    pub fn new(wgpu_context: &WgpuContext) -> Self {
        let size = wgpu::Extent3d { width: DITHER_SIZE, height: DITHER_SIZE, depth_or_array_layers: 1 };
        let texture = wgpu_context.get_device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Dithering Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        wgpu_context.get_queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &dither_pattern(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * DITHER_SIZE),
                rows_per_image: Some(DITHER_SIZE),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = wgpu_context.get_device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Dithering Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self { _texture: texture, view, sampler }
    }

    pub fn input(&self) -> TextureInput<'_> {
        TextureInput { view: &self.view, sampler: &self.sampler }
    }
}
