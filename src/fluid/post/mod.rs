pub mod bloom;
pub mod display;
pub mod sunrays;

use glam::UVec2;
use wgpu_profiler::GpuProfiler;

pub use bloom::Bloom;
pub use display::{display_keywords, draw_display, DisplayInputs};
pub use sunrays::Sunrays;

use crate::fluid::config::SimulationConfig;
use crate::fluid::dithering::DitheringTexture;
use crate::fluid::formats::FormatSupport;
use crate::fluid::framebuffer::RenderTarget;
use crate::fluid::programs::{Destination, ProgramRegistry};
use crate::renderer::wgpu_context::WgpuContext;

/// Turns the dye field into a finished frame.
pub struct Compositor {
    bloom: Bloom,
    sunrays: Sunrays,
    dithering: DitheringTexture,
}

impl Compositor {
    pub fn new(wgpu_context: &WgpuContext, formats: &FormatSupport, canvas: UVec2, config: &SimulationConfig) -> Self {
        Self {
            bloom: Bloom::new(wgpu_context, formats, canvas, config),
            sunrays: Sunrays::new(wgpu_context, formats, canvas, config),
            dithering: DitheringTexture::new(wgpu_context),
        }
    }

    /// Reallocates the bloom and sunrays targets for a new canvas or configuration.
    pub fn resize(&mut self, wgpu_context: &WgpuContext, formats: &FormatSupport, canvas: UVec2, config: &SimulationConfig) {
        self.bloom = Bloom::new(wgpu_context, formats, canvas, config);
        self.sunrays = Sunrays::new(wgpu_context, formats, canvas, config);
    }

    pub fn bloom(&self) -> &Bloom {
        &self.bloom
    }

    pub fn sunrays(&self) -> &Sunrays {
        &self.sunrays
    }

    /// Records the enabled effects and the display pass into `encoder`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        wgpu_context: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        gpu_profiler: &GpuProfiler,
        programs: &mut ProgramRegistry,
        dye: &RenderTarget,
        config: &SimulationConfig,
        destination: Destination,
        size: UVec2,
        offscreen: bool,
    ) {
        if config.bloom {
            let mut scope = gpu_profiler.scope("Bloom", encoder);
            self.bloom.apply(wgpu_context, &mut scope, programs, dye, config);
        }
        if config.sunrays {
            let mut scope = gpu_profiler.scope("Sunrays", encoder);
            self.sunrays.apply(wgpu_context, &mut scope, programs, dye, config);
        }

        let mut scope = gpu_profiler.scope("Display", encoder);
        let inputs = DisplayInputs {
            dye,
            bloom: self.bloom.target(),
            sunrays: self.sunrays.target(),
            dithering: &self.dithering,
        };
        draw_display(wgpu_context, &mut scope, programs, &inputs, config, destination, size, offscreen);
    }
}
