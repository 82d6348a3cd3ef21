use glam::UVec2;

use crate::fluid::config::SimulationConfig;
use crate::fluid::dithering::{DitheringTexture, DITHER_SIZE};
use crate::fluid::framebuffer::RenderTarget;
use crate::fluid::programs::{Blend, Destination, Kernel, KernelParams, Keywords, ProgramRegistry};
use crate::renderer::wgpu_context::WgpuContext;

/// Keyword set of the display variant for the current configuration.
pub fn display_keywords(config: &SimulationConfig) -> Keywords {
    Keywords::NONE
        .with(Keywords::SHADING, config.shading)
        .with(Keywords::BLOOM, config.bloom)
        .with(Keywords::SUNRAYS, config.sunrays)
}

/// Everything the display pass may sample. Which of them get bound depends on the keywords.
pub struct DisplayInputs<'a> {
    pub dye: &'a RenderTarget,
    pub bloom: &'a RenderTarget,
    pub sunrays: &'a RenderTarget,
    pub dithering: &'a DitheringTexture,
}

/// Draws the background and then the shaded dye on top of it.
///
/// Offscreen transparent frames keep their alpha: no background is drawn and the
/// dye replaces the destination.
#[allow(clippy::too_many_arguments)]
pub fn draw_display(
    wgpu_context: &WgpuContext,
    encoder: &mut wgpu::CommandEncoder,
    programs: &mut ProgramRegistry,
    inputs: &DisplayInputs,
    config: &SimulationConfig,
    destination: Destination,
    size: UVec2,
    offscreen: bool,
) {
    let size_f = size.max(UVec2::ONE).as_vec2();
    let base_params = KernelParams {
        aspect_ratio: size_f.x / size_f.y,
        ..KernelParams::with_texel_size(1.0 / size_f)
    };

    let mut display_blend = Blend::PremultipliedAlpha;
    if !config.transparent {
        programs.draw(
            wgpu_context,
            encoder,
            Kernel::Color,
            &KernelParams { color: (config.back_color / 255.0).extend(1.0), ..base_params },
            &[],
            destination,
        );
    } else if !offscreen {
        programs.draw(wgpu_context, encoder, Kernel::Checkerboard, &base_params, &[], destination);
    } else {
        display_blend = Blend::Replace;
    }

    programs.draw_display(
        wgpu_context,
        encoder,
        display_keywords(config),
        &KernelParams {
            dither_scale: size_f / DITHER_SIZE as f32,
            ..base_params
        },
        &[
            ("u_texture", inputs.dye.input()),
            ("u_bloom", inputs.bloom.input()),
            ("u_sunrays", inputs.sunrays.input()),
            ("u_dithering", inputs.dithering.input()),
        ],
        destination.blend(display_blend),
    );
}
