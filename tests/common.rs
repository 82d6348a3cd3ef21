// Not every test file will use every function.
#![allow(dead_code)]

use fluid_engine::fluid::config::SimulationConfig;
use fluid_engine::fluid::simulation::FluidSimulation;
use fluid_engine::renderer::wgpu_context::WgpuContext;
use glam::UVec2;

// A struct to hold all the common objects for a test.
pub struct TestSetup {
    pub wgpu_context: WgpuContext,
}

// The main setup function.
pub async fn setup() -> TestSetup {
    let wgpu_context = WgpuContext::new_for_test().await.unwrap();

    TestSetup { wgpu_context }
}

/// Small, deterministic configuration: no seed splats, no post effects.
pub fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        sim_resolution: 32,
        dye_resolution: 64,
        capture_resolution: 64,
        bloom: false,
        sunrays: false,
        shading: false,
        colorful: false,
        random_splat_count: 0,
        random_splat_offset: 0,
        ..SimulationConfig::default()
    }
}

pub fn create_test_simulation(wgpu_context: &WgpuContext, config: SimulationConfig, canvas: UVec2) -> FluidSimulation {
    FluidSimulation::new(wgpu_context, config, canvas).unwrap()
}

pub fn all_finite(texels: &[[f32; 4]]) -> bool {
    texels.iter().flatten().all(|value| value.is_finite())
}
