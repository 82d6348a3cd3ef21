use fluid_engine::fluid::formats::FormatSupport;
use fluid_engine::fluid::framebuffer::{RenderTarget, TargetSpec};
use fluid_engine::fluid::programs::{Kernel, KernelParams, ProgramRegistry};
use fluid_engine::renderer::wgpu_context::WgpuContext;
use fluid_engine::utils::texture_readback::download_rgba32f;
use glam::{Vec2, Vec4};

mod common;

const SIZE: u32 = 32;

const READABLE: TargetSpec = TargetSpec {
    format: wgpu::TextureFormat::Rgba32Float,
    filter: wgpu::FilterMode::Nearest,
};

/// Advects a gaussian blob through a uniform velocity with kernels built for `support`
/// and returns the advected texels.
fn advect_blob(wgpu_context: &WgpuContext, support: FormatSupport, dissipation: f32) -> Vec<[f32; 4]> {
    let mut programs = ProgramRegistry::new(wgpu_context, &support);
    let velocity = RenderTarget::new(wgpu_context, "Velocity", SIZE, SIZE, TargetSpec::new(support.rg, support.filter_mode()));
    let blank = RenderTarget::new(wgpu_context, "Blank", SIZE, SIZE, TargetSpec::new(support.rgba, support.filter_mode()));
    let source = RenderTarget::new(wgpu_context, "Source", SIZE, SIZE, TargetSpec::new(support.rgba, support.filter_mode()));
    let result = RenderTarget::new(wgpu_context, "Result", SIZE, SIZE, READABLE);

    let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Testing advection"),
    });
    programs.draw(
        wgpu_context,
        &mut encoder,
        Kernel::Color,
        &KernelParams { color: Vec4::new(3.5, 1.25, 0.0, 0.0), ..KernelParams::with_texel_size(velocity.texel_size()) },
        &[],
        velocity.destination(),
    );
    programs.draw(
        wgpu_context,
        &mut encoder,
        Kernel::Splat,
        &KernelParams {
            point: Vec2::splat(0.5),
            radius: 0.01,
            aspect_ratio: 1.0,
            color: Vec4::new(1.0, 0.5, 0.25, 0.0),
            ..KernelParams::with_texel_size(source.texel_size())
        },
        &[("u_target", blank.input())],
        source.destination(),
    );
    programs.draw(
        wgpu_context,
        &mut encoder,
        Kernel::Advection,
        &KernelParams {
            dt: 0.1,
            dissipation,
            dye_texel_size: source.texel_size(),
            ..KernelParams::with_texel_size(velocity.texel_size())
        },
        &[("u_velocity", velocity.input()), ("u_source", source.input())],
        result.destination(),
    );
    programs.submit(wgpu_context, encoder);

    download_rgba32f(wgpu_context, result.texture()).unwrap()
}

#[test]
fn manual_filtering_compiles_every_kernel() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let support = FormatSupport { linear_filtering: false, ..FormatSupport::negotiate(wgpu_context) };

    let programs = ProgramRegistry::new(wgpu_context, &support);

    assert!(programs.manual_filtering());
    assert!(programs.is_compatible_with(&support));
    for kernel in Kernel::ALL {
        assert!(programs.is_compiled(kernel), "{kernel:?} failed to compile");
    }
}

#[test]
fn manual_filtering_matches_hardware_filtering() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let negotiated = FormatSupport::negotiate(wgpu_context);
    let manual = FormatSupport { linear_filtering: false, ..negotiated };

    // ACT
    let expected = advect_blob(wgpu_context, negotiated, 0.0);
    let actual = advect_blob(wgpu_context, manual, 0.0);

    // ASSERT
    assert!(common::all_finite(&actual));
    let peak = actual.iter().map(|texel| texel[0]).fold(0.0, f32::max);
    assert!(peak > 0.5, "peak {peak}");
    for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
        let close = Vec4::from_array(*actual).abs_diff_eq(Vec4::from_array(*expected), 1e-2);
        assert!(close, "texel {index}: {actual:?} != {expected:?}");
    }
}

#[test]
fn advection_decays_alpha_with_the_color() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let support = FormatSupport::negotiate(wgpu_context);

    let texels = advect_blob(wgpu_context, support, 1.0);

    // Splats write alpha 1 and one step divides everything by 1 + dissipation * dt.
    let alpha = texels[(SIZE / 2 * SIZE + SIZE / 2) as usize][3];
    assert!((alpha - 1.0 / 1.1).abs() < 1e-2, "alpha {alpha}");
}
