use glam::UVec2;

use crate::fluid::config::SimulationConfig;
use crate::fluid::formats::FormatSupport;
use crate::fluid::framebuffer::{DoubleRenderTarget, RenderTarget, TargetSpec};
use crate::fluid::programs::{Kernel, KernelParams, ProgramRegistry};
use crate::renderer::wgpu_context::WgpuContext;

/// Largest time step a single `step` will integrate, in seconds.
pub const MAX_DELTA_TIME: f32 = 1.0 / 60.0;

pub fn clamp_delta_time(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, MAX_DELTA_TIME)
}

/// The grids the solver works on.
pub struct Fields {
    pub dye: DoubleRenderTarget,
    pub velocity: DoubleRenderTarget,
    pub divergence: RenderTarget,
    pub curl: RenderTarget,
    pub pressure: DoubleRenderTarget,
}

struct FieldSpecs {
    dye: TargetSpec,
    velocity: TargetSpec,
    scalar: TargetSpec,
}

impl FieldSpecs {
    fn new(formats: &FormatSupport) -> Self {
        let filter = formats.filter_mode();
        Self {
            dye: TargetSpec::new(formats.rgba, filter),
            velocity: TargetSpec::new(formats.rg, filter),
            scalar: TargetSpec::new(formats.r, wgpu::FilterMode::Nearest),
        }
    }
}

impl Fields {
    pub fn new(wgpu_context: &WgpuContext, formats: &FormatSupport, sim_size: UVec2, dye_size: UVec2) -> Self {
        let specs = FieldSpecs::new(formats);
        Self {
            dye: DoubleRenderTarget::create(wgpu_context, "Dye", dye_size.x, dye_size.y, specs.dye),
            velocity: DoubleRenderTarget::create(wgpu_context, "Velocity", sim_size.x, sim_size.y, specs.velocity),
            divergence: RenderTarget::new(wgpu_context, "Divergence", sim_size.x, sim_size.y, specs.scalar),
            curl: RenderTarget::new(wgpu_context, "Curl", sim_size.x, sim_size.y, specs.scalar),
            pressure: DoubleRenderTarget::create(wgpu_context, "Pressure", sim_size.x, sim_size.y, specs.scalar),
        }
    }

    /// Moves to new resolutions or formats. Dye and velocity are resampled so the flow
    /// survives; the scratch fields start over empty.
    pub fn resize(
        &mut self,
        wgpu_context: &WgpuContext,
        programs: &mut ProgramRegistry,
        formats: &FormatSupport,
        sim_size: UVec2,
        dye_size: UVec2,
    ) {
        let specs = FieldSpecs::new(formats);
        self.dye.resize(wgpu_context, programs, dye_size.x, dye_size.y, specs.dye);
        self.velocity.resize(wgpu_context, programs, sim_size.x, sim_size.y, specs.velocity);
        self.divergence = RenderTarget::new(wgpu_context, "Divergence", sim_size.x, sim_size.y, specs.scalar);
        self.curl = RenderTarget::new(wgpu_context, "Curl", sim_size.x, sim_size.y, specs.scalar);
        self.pressure = DoubleRenderTarget::create(wgpu_context, "Pressure", sim_size.x, sim_size.y, specs.scalar);
    }
}

/// Advances the fluid by `dt` seconds (clamped to `MAX_DELTA_TIME`), recording every pass into `encoder`.
pub fn step(
    wgpu_context: &WgpuContext,
    encoder: &mut wgpu::CommandEncoder,
    programs: &mut ProgramRegistry,
    fields: &mut Fields,
    config: &SimulationConfig,
    dt: f32,
) {
    let dt = clamp_delta_time(dt);
    let texel_size = fields.velocity.texel_size();
    let sim_params = KernelParams { dt, ..KernelParams::with_texel_size(texel_size) };

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Curl,
        &sim_params,
        &[("u_velocity", fields.velocity.read().input())],
        fields.curl.destination(),
    );

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Vorticity,
        &KernelParams { curl: config.curl, ..sim_params },
        &[("u_velocity", fields.velocity.read().input()), ("u_curl", fields.curl.input())],
        fields.velocity.write().destination(),
    );
    fields.velocity.swap();

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Divergence,
        &sim_params,
        &[("u_velocity", fields.velocity.read().input())],
        fields.divergence.destination(),
    );

    // Last frame's pressure, scaled, is the initial guess for the solve.
    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Clear,
        &KernelParams { value: config.pressure, ..sim_params },
        &[("u_texture", fields.pressure.read().input())],
        fields.pressure.write().destination(),
    );
    fields.pressure.swap();

    for _ in 0..config.pressure_iterations {
        programs.draw(
            wgpu_context,
            encoder,
            Kernel::Pressure,
            &sim_params,
            &[("u_pressure", fields.pressure.read().input()), ("u_divergence", fields.divergence.input())],
            fields.pressure.write().destination(),
        );
        fields.pressure.swap();
    }

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::GradientSubtract,
        &sim_params,
        &[("u_pressure", fields.pressure.read().input()), ("u_velocity", fields.velocity.read().input())],
        fields.velocity.write().destination(),
    );
    fields.velocity.swap();

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Advection,
        &KernelParams {
            dye_texel_size: texel_size,
            dissipation: config.velocity_dissipation,
            ..sim_params
        },
        &[("u_velocity", fields.velocity.read().input()), ("u_source", fields.velocity.read().input())],
        fields.velocity.write().destination(),
    );
    fields.velocity.swap();

    programs.draw(
        wgpu_context,
        encoder,
        Kernel::Advection,
        &KernelParams {
            dye_texel_size: fields.dye.texel_size(),
            dissipation: config.density_dissipation,
            ..sim_params
        },
        &[("u_velocity", fields.velocity.read().input()), ("u_source", fields.dye.read().input())],
        fields.dye.write().destination(),
    );
    fields.dye.swap();
}
