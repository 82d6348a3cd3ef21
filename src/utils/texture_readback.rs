use crate::renderer::wgpu_context::WgpuContext;

const BYTES_PER_TEXEL: u32 = 16;

/// Downloads an `Rgba32Float` texture to the CPU, row by row, top row first.
///
/// Blocks until the GPU has finished all submitted work.
pub fn download_rgba32f(
    wgpu_context: &WgpuContext,
    texture: &wgpu::Texture,
) -> Result<Vec<[f32; 4]>, wgpu::BufferAsyncError> {
    debug_assert_eq!(texture.format(), wgpu::TextureFormat::Rgba32Float);
    let device = wgpu_context.get_device();
    let queue = wgpu_context.get_queue();

    let width = texture.width();
    let height = texture.height();
    let unpadded_bytes_per_row = width * BYTES_PER_TEXEL;
    let padded_bytes_per_row = unpadded_bytes_per_row.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Staging Buffer (Texture Download)"),
        size: padded_bytes_per_row as u64 * height as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Texture Download Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let buffer_slice = staging_buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver outlives this callback, a failed send can only mean we already bailed out.
        let _ = sender.send(result);
    });

    if let Err(e) = device.poll(wgpu::PollType::Wait) {
        log::error!("Device poll failed during texture download: {e}");
    }

    match receiver.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e),
        Err(_) => return Err(wgpu::BufferAsyncError),
    }

    let mapped_range = buffer_slice.get_mapped_range();
    let mut texels = Vec::with_capacity((width * height) as usize);
    for row in mapped_range.chunks_exact(padded_bytes_per_row as usize) {
        texels.extend(
            row[..unpadded_bytes_per_row as usize]
                .chunks_exact(BYTES_PER_TEXEL as usize)
                .map(bytemuck::pod_read_unaligned::<[f32; 4]>),
        );
    }
    drop(mapped_range);
    staging_buffer.unmap();

    Ok(texels)
}
