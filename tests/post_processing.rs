use fluid_engine::fluid::config::SimulationConfig;
use fluid_engine::fluid::formats::FormatSupport;
use fluid_engine::fluid::framebuffer::{RenderTarget, TargetSpec};
use fluid_engine::fluid::programs::{Kernel, Keywords, Program};
use fluid_engine::fluid::simulation::Field;
use glam::{UVec2, Vec3};

mod common;

const CANVAS: UVec2 = UVec2::new(64, 64);

fn screen(wgpu_context: &fluid_engine::renderer::wgpu_context::WgpuContext) -> RenderTarget {
    RenderTarget::new(
        wgpu_context,
        "Screen",
        CANVAS.x,
        CANVAS.y,
        TargetSpec::new(wgpu::TextureFormat::Rgba8Unorm, wgpu::FilterMode::Nearest),
    )
}

#[test]
fn negotiated_formats_are_renderable() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;

    let formats = FormatSupport::negotiate(wgpu_context);

    for format in [formats.rgba, formats.rg, formats.r] {
        let features = wgpu_context.get_adapter().get_texture_format_features(format);
        assert!(features.allowed_usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT), "{format:?}");
    }
    let simulation = common::create_test_simulation(wgpu_context, common::quiet_config(), CANVAS);
    assert_eq!(*simulation.formats(), formats);
    assert!(simulation.programs().is_compatible_with(&formats));
}

#[test]
fn every_kernel_compiles() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;

    let simulation = common::create_test_simulation(wgpu_context, common::quiet_config(), CANVAS);

    for kernel in Kernel::ALL {
        assert!(simulation.programs().is_compiled(kernel), "{kernel:?} failed to compile");
    }
}

#[test]
fn broken_shader_source_is_rejected() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;

    let program = Program::compile(wgpu_context, "Broken", "@fragment fn fs_main( -> {", Keywords::NONE, Vec::new(), true);

    assert!(program.is_none());
}

#[test]
fn display_variants_are_compiled_once_per_keyword_set() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let config = SimulationConfig { bloom: true, bloom_resolution: 32, ..common::quiet_config() };
    let mut simulation = common::create_test_simulation(wgpu_context, config, CANVAS);
    let screen = screen(wgpu_context);

    simulation.render(wgpu_context, screen.destination());
    assert_eq!(simulation.programs().display_variant_count(), 1);

    simulation.config().update(|config| config.bloom = false);
    simulation.render(wgpu_context, screen.destination());
    assert_eq!(simulation.programs().display_variant_count(), 2);

    simulation.config().update(|config| config.bloom = true);
    simulation.render(wgpu_context, screen.destination());
    assert_eq!(simulation.programs().display_variant_count(), 2);
}

#[test]
fn bloom_picks_up_bright_dye() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let config = SimulationConfig { bloom: true, bloom_resolution: 32, ..common::quiet_config() };
    let mut simulation = common::create_test_simulation(wgpu_context, config, CANVAS);
    assert_eq!(simulation.compositor().bloom().level_count(), 4);

    simulation.splat(wgpu_context, 0.5, 0.5, 0.0, 0.0, Vec3::splat(10.0));
    simulation.render(wgpu_context, screen(wgpu_context).destination());

    let bloom = simulation.read_field(wgpu_context, Field::Bloom).unwrap();
    assert!(common::all_finite(&bloom.texels));
    assert!(bloom.texel(16, 16)[0] > bloom.texel(0, 0)[0]);
}

#[test]
fn sunrays_shine_through_empty_fluid() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let config = SimulationConfig { sunrays: true, sunrays_resolution: 32, ..common::quiet_config() };
    let mut simulation = common::create_test_simulation(wgpu_context, config, CANVAS);

    simulation.render(wgpu_context, screen(wgpu_context).destination());

    let rays = simulation.read_field(wgpu_context, Field::Sunrays).unwrap();
    assert!(common::all_finite(&rays.texels));
    assert!(rays.texel(16, 16)[0] > 0.1);
}

#[test]
fn changing_resolutions_rebuilds_the_framebuffers() {
    let setup = pollster::block_on(common::setup());
    let wgpu_context = &setup.wgpu_context;
    let mut simulation = common::create_test_simulation(wgpu_context, common::quiet_config(), CANVAS);

    simulation.config().update(|config| {
        config.sim_resolution = 16;
        config.bloom_resolution = 16;
    });
    simulation.init_framebuffers(wgpu_context);

    let velocity = simulation.read_field(wgpu_context, Field::Velocity).unwrap();
    let bloom = simulation.read_field(wgpu_context, Field::Bloom).unwrap();
    assert_eq!((velocity.width, velocity.height), (16, 16));
    assert_eq!((bloom.width, bloom.height), (16, 16));
}
