use glam::{Vec2, Vec4};

/// Uniform block shared by every kernel, bound at group 0, binding 0.
///
/// Mirrors `KernelParams` in `shaders/common.wgsl`. Fields a kernel does not
/// read are simply ignored by it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct KernelParams {
    pub texel_size: Vec2,
    pub dye_texel_size: Vec2,
    pub color: Vec4,
    pub curve: Vec4,
    pub point: Vec2,
    pub dither_scale: Vec2,
    pub dt: f32,
    pub dissipation: f32,
    pub curl: f32,
    pub value: f32,
    pub aspect_ratio: f32,
    pub radius: f32,
    pub threshold: f32,
    pub intensity: f32,
    pub weight: f32,
    pub _padding: [f32; 3],
}

impl KernelParams {
    pub fn with_texel_size(texel_size: Vec2) -> Self {
        Self { texel_size, ..Default::default() }
    }
}
