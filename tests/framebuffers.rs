use fluid_engine::fluid::formats::FormatSupport;
use fluid_engine::fluid::framebuffer::{DoubleRenderTarget, RenderTarget, TargetSpec};
use fluid_engine::fluid::programs::{Kernel, KernelParams, ProgramRegistry};
use fluid_engine::renderer::wgpu_context::WgpuContext;
use fluid_engine::utils::texture_readback::download_rgba32f;
use glam::{UVec2, Vec4};

mod common;

const READABLE: TargetSpec = TargetSpec {
    format: wgpu::TextureFormat::Rgba32Float,
    filter: wgpu::FilterMode::Nearest,
};

fn fill(wgpu_context: &WgpuContext, programs: &mut ProgramRegistry, target: &RenderTarget, color: Vec4) {
    let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Testing fill"),
    });
    programs.draw(
        wgpu_context,
        &mut encoder,
        Kernel::Color,
        &KernelParams { color, ..KernelParams::with_texel_size(target.texel_size()) },
        &[],
        target.destination(),
    );
    programs.submit(wgpu_context, encoder);
}

#[test]
fn new_targets_start_cleared() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;

    let target = RenderTarget::new(wgpu_context, "Cleared", 8, 4, READABLE);
    let texels = download_rgba32f(wgpu_context, target.texture()).unwrap();

    assert_eq!(texels.len(), 32);
    assert!(texels.iter().all(|texel| *texel == [0.0; 4]));
}

#[test]
fn color_kernel_fills_the_destination() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let formats = FormatSupport::negotiate(wgpu_context);
    let mut programs = ProgramRegistry::new(wgpu_context, &formats);

    let target = RenderTarget::new(wgpu_context, "Filled", 4, 4, READABLE);
    fill(wgpu_context, &mut programs, &target, Vec4::new(0.25, 0.5, 0.75, 1.0));

    let texels = download_rgba32f(wgpu_context, target.texture()).unwrap();
    assert!(texels.iter().all(|texel| *texel == [0.25, 0.5, 0.75, 1.0]));
}

#[test]
fn swap_exchanges_read_and_write() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;

    let mut double = DoubleRenderTarget::create(wgpu_context, "Swap", 4, 4, READABLE);
    let first_read = double.read().texture().clone();

    double.swap();
    assert_eq!(*double.write().texture(), first_read);
    double.swap();
    assert_eq!(*double.read().texture(), first_read);
}

#[test]
fn resize_carries_the_contents_over() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let formats = FormatSupport::negotiate(wgpu_context);
    let mut programs = ProgramRegistry::new(wgpu_context, &formats);
    let spec = TargetSpec::new(formats.rgba, formats.filter_mode());

    // ARRANGE
    let mut double = DoubleRenderTarget::create(wgpu_context, "Resized", 8, 8, spec);
    fill(wgpu_context, &mut programs, double.write(), Vec4::new(0.5, 0.25, 0.0, 1.0));
    double.swap();

    // ACT
    double.resize(wgpu_context, &mut programs, 16, 4, READABLE);

    // ASSERT
    assert_eq!(double.size(), UVec2::new(16, 4));
    assert_eq!((double.write().width(), double.write().height()), (16, 4));
    let texels = download_rgba32f(wgpu_context, double.read().texture()).unwrap();
    let expected = Vec4::new(0.5, 0.25, 0.0, 1.0);
    for texel in texels {
        // The source may be 8-bit on devices without half float targets.
        assert!(Vec4::from_array(texel).abs_diff_eq(expected, 1.0 / 255.0), "{texel:?}");
    }
}

#[test]
fn resize_to_the_same_shape_keeps_the_textures() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let formats = FormatSupport::negotiate(wgpu_context);
    let mut programs = ProgramRegistry::new(wgpu_context, &formats);

    let mut double = DoubleRenderTarget::create(wgpu_context, "Unchanged", 8, 8, READABLE);
    let before = double.read().texture().clone();

    double.resize(wgpu_context, &mut programs, 8, 8, READABLE);

    assert_eq!(*double.read().texture(), before);
}

#[test]
fn draws_in_one_encoder_keep_their_own_params() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let formats = FormatSupport::negotiate(wgpu_context);
    let mut programs = ProgramRegistry::new(wgpu_context, &formats);
    let colors: Vec<Vec4> = (0..100).map(|i| Vec4::new(i as f32, 0.5, 0.0, 1.0)).collect();
    let targets: Vec<RenderTarget> = colors
        .iter()
        .map(|_| RenderTarget::new(wgpu_context, "Batched", 2, 2, READABLE))
        .collect();

    // ACT
    let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Testing batched fills"),
    });
    for (target, color) in targets.iter().zip(&colors) {
        programs.draw(
            wgpu_context,
            &mut encoder,
            Kernel::Color,
            &KernelParams { color: *color, ..KernelParams::with_texel_size(target.texel_size()) },
            &[],
            target.destination(),
        );
    }
    assert_eq!(programs.uniforms().used(), 100);
    programs.submit(wgpu_context, encoder);

    // ASSERT
    assert_eq!(programs.uniforms().used(), 0);
    assert!(programs.uniforms().capacity() >= 100);
    for (target, color) in targets.iter().zip(&colors) {
        let texels = download_rgba32f(wgpu_context, target.texture()).unwrap();
        assert!(texels.iter().all(|texel| *texel == color.to_array()), "{color:?}: {:?}", texels[0]);
    }
}

#[test]
fn repeated_draws_reuse_their_bind_group() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let formats = FormatSupport::negotiate(wgpu_context);
    let mut programs = ProgramRegistry::new(wgpu_context, &formats);
    let source = RenderTarget::new(wgpu_context, "Source", 4, 4, READABLE);
    let destination = RenderTarget::new(wgpu_context, "Destination", 4, 4, READABLE);
    fill(wgpu_context, &mut programs, &source, Vec4::new(0.0, 0.75, 0.0, 1.0));

    for _ in 0..3 {
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Testing copies"),
        });
        programs.draw(
            wgpu_context,
            &mut encoder,
            Kernel::Copy,
            &KernelParams::with_texel_size(destination.texel_size()),
            &[("u_texture", source.input())],
            destination.destination(),
        );
        programs.submit(wgpu_context, encoder);
    }

    assert_eq!(programs.cached_bind_groups(Kernel::Copy), 1);
    let texels = download_rgba32f(wgpu_context, destination.texture()).unwrap();
    assert!(texels.iter().all(|texel| *texel == [0.0, 0.75, 0.0, 1.0]));
}
