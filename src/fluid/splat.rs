use glam::{Vec2, Vec3, Vec4};
use rand::Rng;

use crate::fluid::config::SimulationConfig;
use crate::fluid::programs::{Kernel, KernelParams, ProgramRegistry};
use crate::fluid::stepper::Fields;
use crate::renderer::wgpu_context::WgpuContext;

/// One Gaussian impulse. Position is normalized with y pointing up; the force is in
/// the same frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Splat {
    pub position: Vec2,
    pub force: Vec2,
    pub color: Vec3,
}

/// Widens the splat radius on landscape canvases so splats stay round.
pub fn correct_radius(radius: f32, aspect_ratio: f32) -> f32 {
    if aspect_ratio > 1.0 { radius * aspect_ratio } else { radius }
}

pub fn correct_delta_x(delta: f32, aspect_ratio: f32) -> f32 {
    if aspect_ratio < 1.0 { delta * aspect_ratio } else { delta }
}

pub fn correct_delta_y(delta: f32, aspect_ratio: f32) -> f32 {
    if aspect_ratio > 1.0 { delta / aspect_ratio } else { delta }
}

/// `h`, `s` and `v` in 0..=1.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match (i as i32).rem_euclid(6) {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

/// A fully saturated color of random hue, scaled down to `color_scale`.
pub fn generate_color(rng: &mut impl Rng, color_scale: f32) -> Vec3 {
    hsv_to_rgb(rng.random::<f32>(), 1.0, 1.0) * color_scale
}

pub fn random_splats(rng: &mut impl Rng, count: u32, config: &SimulationConfig) -> Vec<Splat> {
    (0..count)
        .map(|_| {
            let color = generate_color(rng, config.color_scale) * 10.0;
            let position = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
            let force = Vec2::new(
                config.random_splat_force * (rng.random::<f32>() - 0.5),
                config.random_splat_force * (rng.random::<f32>() - 0.5),
            );
            Splat { position, force, color }
        })
        .collect()
}

/// Adds `splat` to the velocity field and then to the dye field, through the same footprint.
pub fn apply_splat(
    wgpu_context: &WgpuContext,
    encoder: &mut wgpu::CommandEncoder,
    programs: &mut ProgramRegistry,
    fields: &mut Fields,
    splat: &Splat,
    radius: f32,
    aspect_ratio: f32,
) {
    // Fields are stored top row first.
    let point = Vec2::new(splat.position.x, 1.0 - splat.position.y);
    let params = KernelParams {
        point,
        radius,
        aspect_ratio,
        ..KernelParams::with_texel_size(fields.velocity.texel_size())
    };

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Splat,
        &KernelParams { color: Vec4::new(splat.force.x, -splat.force.y, 0.0, 0.0), ..params },
        &[("u_target", fields.velocity.read().input())],
        fields.velocity.write().destination(),
    );
    fields.velocity.swap();

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Splat,
        &KernelParams {
            color: splat.color.extend(0.0),
            texel_size: fields.dye.texel_size(),
            ..params
        },
        &[("u_target", fields.dye.read().input())],
        fields.dye.write().destination(),
    );
    fields.dye.swap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn radius_grows_only_on_landscape() {
        assert_eq!(correct_radius(0.006, 2.0), 0.012);
        assert_eq!(correct_radius(0.006, 0.5), 0.006);
    }

    #[test]
    fn deltas_are_corrected_along_the_long_side() {
        assert_eq!(correct_delta_x(0.1, 0.5), 0.05);
        assert_eq!(correct_delta_x(0.1, 2.0), 0.1);
        assert_eq!(correct_delta_y(0.1, 2.0), 0.05);
        assert_eq!(correct_delta_y(0.1, 0.5), 0.1);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hsv_to_rgb(0.5, 1.0, 1.0), Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(hsv_to_rgb(0.5, 0.0, 0.25), Vec3::splat(0.25));
    }

    #[test]
    fn random_splats_stay_in_range() {
        let config = SimulationConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let splats = random_splats(&mut rng, 50, &config);

        assert_eq!(splats.len(), 50);
        for splat in splats {
            assert!((0.0..1.0).contains(&splat.position.x));
            assert!((0.0..1.0).contains(&splat.position.y));
            assert!(splat.force.abs().max_element() <= config.random_splat_force * 0.5);
            assert!(splat.color.max_element() <= config.color_scale * 10.0 + 1e-5);
        }
    }
}
