use glam::{UVec2, Vec2};

use crate::fluid::config::SimulationConfig;
use crate::fluid::formats::FormatSupport;
use crate::fluid::framebuffer::{get_resolution, RenderTarget, TargetSpec};
use crate::fluid::programs::{Kernel, KernelParams, ProgramRegistry};
use crate::renderer::wgpu_context::WgpuContext;

/// Light shafts radiating from the centre of the screen, occluded by dense dye.
pub struct Sunrays {
    target: RenderTarget,
    temp: RenderTarget,
    mask: RenderTarget,
}

impl Sunrays {
    pub fn new(wgpu_context: &WgpuContext, formats: &FormatSupport, canvas: UVec2, config: &SimulationConfig) -> Self {
        let filter = formats.filter_mode();
        let size = get_resolution(config.sunrays_resolution, canvas);
        let ray_spec = TargetSpec::new(formats.r, filter);
        Self {
            target: RenderTarget::new(wgpu_context, "Sunrays", size.x, size.y, ray_spec),
            temp: RenderTarget::new(wgpu_context, "Sunrays Temp", size.x, size.y, ray_spec),
            mask: RenderTarget::new(wgpu_context, "Sunrays Mask", size.x, size.y, TargetSpec::new(formats.rgba, filter)),
        }
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn apply(
        &self,
        wgpu_context: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        programs: &mut ProgramRegistry,
        source: &RenderTarget,
        config: &SimulationConfig,
    ) {
        programs.draw(
            wgpu_context,
            encoder,
            Kernel::SunraysMask,
            &KernelParams::with_texel_size(source.texel_size()),
            &[("u_texture", source.input())],
            self.mask.destination(),
        );

        programs.draw(
            wgpu_context,
            encoder,
            Kernel::Sunrays,
            &KernelParams {
                weight: config.sunrays_weight,
                ..KernelParams::with_texel_size(self.mask.texel_size())
            },
            &[("u_texture", self.mask.input())],
            self.target.destination(),
        );

        self.blur(wgpu_context, encoder, programs, config.sunrays_blur_iterations);
    }

    /// Separable blur of the rays: horizontal into `temp`, then vertical back.
    fn blur(
        &self,
        wgpu_context: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        programs: &mut ProgramRegistry,
        iterations: u32,
    ) {
        let texel_size = self.target.texel_size();
        for _ in 0..iterations {
            programs.draw(
                wgpu_context,
                encoder,
                Kernel::Blur,
                &KernelParams::with_texel_size(Vec2::new(texel_size.x, 0.0)),
                &[("u_texture", self.target.input())],
                self.temp.destination(),
            );
            programs.draw(
                wgpu_context,
                encoder,
                Kernel::Blur,
                &KernelParams::with_texel_size(Vec2::new(0.0, texel_size.y)),
                &[("u_texture", self.temp.input())],
                self.target.destination(),
            );
        }
    }
}
