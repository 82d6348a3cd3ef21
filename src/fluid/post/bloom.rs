use glam::{UVec2, Vec4};

use crate::fluid::config::SimulationConfig;
use crate::fluid::formats::FormatSupport;
use crate::fluid::framebuffer::{get_resolution, RenderTarget, TargetSpec};
use crate::fluid::programs::{Blend, Kernel, KernelParams, ProgramRegistry};
use crate::renderer::wgpu_context::WgpuContext;

/// Sizes of the downsample cascade below `base`: each level halves the previous one,
/// stopping after `iterations` levels or once a side would drop below 2 texels.
pub fn cascade_sizes(base: UVec2, iterations: u32) -> Vec<UVec2> {
    (1..=iterations)
        .map_while(|level| {
            let size = UVec2::new(base.x.checked_shr(level)?, base.y.checked_shr(level)?);
            (size.x >= 2 && size.y >= 2).then_some(size)
        })
        .collect()
}

/// Soft-knee threshold curve: `(threshold - knee, 2 * knee, 0.25 / knee)`.
pub fn knee_curve(threshold: f32, soft_knee: f32) -> Vec4 {
    let knee = threshold * soft_knee + 0.0001;
    Vec4::new(threshold - knee, knee * 2.0, 0.25 / knee, 0.0)
}

pub struct Bloom {
    target: RenderTarget,
    cascade: Vec<RenderTarget>,
}

impl Bloom {
    pub fn new(wgpu_context: &WgpuContext, formats: &FormatSupport, canvas: UVec2, config: &SimulationConfig) -> Self {
        let spec = TargetSpec::new(formats.rgba, formats.filter_mode());
        let size = get_resolution(config.bloom_resolution, canvas);
        let target = RenderTarget::new(wgpu_context, "Bloom", size.x, size.y, spec);
        let cascade = cascade_sizes(size, config.bloom_iterations)
            .into_iter()
            .enumerate()
            .map(|(level, size)| {
                RenderTarget::new(wgpu_context, &format!("Bloom Level {level}"), size.x, size.y, spec)
            })
            .collect();
        Self { target, cascade }
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn level_count(&self) -> usize {
        self.cascade.len()
    }

    /// Extracts the bright parts of `source` into the bloom target and blurs them
    /// through the cascade. Records nothing if the cascade has fewer than two levels.
    pub fn apply(
        &self,
        wgpu_context: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        programs: &mut ProgramRegistry,
        source: &RenderTarget,
        config: &SimulationConfig,
    ) {
        if self.cascade.len() < 2 {
            return;
        }

        programs.draw(
            wgpu_context,
            encoder,
            Kernel::BloomPrefilter,
            &KernelParams {
                curve: knee_curve(config.bloom_threshold, config.bloom_soft_knee),
                threshold: config.bloom_threshold,
                ..KernelParams::with_texel_size(source.texel_size())
            },
            &[("u_texture", source.input())],
            self.target.destination(),
        );

        let mut last = &self.target;
        for level in &self.cascade {
            programs.draw(
                wgpu_context,
                encoder,
                Kernel::BloomBlur,
                &KernelParams::with_texel_size(last.texel_size()),
                &[("u_texture", last.input())],
                level.destination(),
            );
            last = level;
        }

        for level in self.cascade.iter().rev().skip(1) {
            programs.draw(
                wgpu_context,
                encoder,
                Kernel::BloomBlur,
                &KernelParams::with_texel_size(last.texel_size()),
                &[("u_texture", last.input())],
                level.destination().blend(Blend::Additive),
            );
            last = level;
        }

        programs.draw(
            wgpu_context,
            encoder,
            Kernel::BloomFinal,
            &KernelParams {
                intensity: config.bloom_intensity,
                ..KernelParams::with_texel_size(last.texel_size())
            },
            &[("u_texture", last.input())],
            self.target.destination(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_halves_each_level() {
        let sizes = cascade_sizes(UVec2::new(455, 256), 3);
        assert_eq!(sizes, [UVec2::new(227, 128), UVec2::new(113, 64), UVec2::new(56, 32)]);
    }

    #[test]
    fn cascade_stops_before_a_side_drops_below_two() {
        let sizes = cascade_sizes(UVec2::new(64, 8), 8);
        assert_eq!(sizes, [UVec2::new(32, 4), UVec2::new(16, 2)]);
    }

    #[test]
    fn tiny_base_has_no_levels() {
        assert!(cascade_sizes(UVec2::new(3, 3), 8).is_empty());
    }

    #[test]
    fn knee_curve_matches_threshold_and_softness() {
        let curve = knee_curve(0.6, 0.7);
        let knee = 0.6 * 0.7 + 0.0001;
        assert!((curve.x - (0.6 - knee)).abs() < 1e-6);
        assert!((curve.y - 2.0 * knee).abs() < 1e-6);
        assert!((curve.z - 0.25 / knee).abs() < 1e-6);
    }
}
