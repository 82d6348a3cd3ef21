use crate::renderer::wgpu_context::WgpuContext;
use wgpu::Buffer;

/// A GPU buffer that keeps the CPU-side data it was uploaded from.
#[derive(Debug)]
pub struct GpuBuffer<T> {
    data: Vec<T>,
    buffer: wgpu::Buffer,
}

impl<T: bytemuck::Pod> GpuBuffer<T> {
    pub fn with_label(wgpu_context: &WgpuContext, label: &str, data: Vec<T>, usage: wgpu::BufferUsages) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        // Buffer sizes must be a multiple of 4 bytes.
        let size = ((data.len() * size_of::<T>()).max(4) as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let buffer = wgpu_context.get_device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        });
        let bytes: &[u8] = bytemuck::cast_slice(&data);
        let aligned_len = bytes.len() - bytes.len() % wgpu::COPY_BUFFER_ALIGNMENT as usize;
        wgpu_context.get_queue().write_buffer(&buffer, 0, &bytes[..aligned_len]);
        if aligned_len < bytes.len() {
            let mut tail = [0u8; wgpu::COPY_BUFFER_ALIGNMENT as usize];
            tail[..bytes.len() - aligned_len].copy_from_slice(&bytes[aligned_len..]);
            wgpu_context.get_queue().write_buffer(&buffer, aligned_len as u64, &tail);
        }

        Self { data, buffer }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
