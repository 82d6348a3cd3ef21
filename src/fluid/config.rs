use std::sync::{Arc, PoisonError, RwLock};
use glam::Vec3;

/// Tunable simulation parameters.
///
/// Values are not validated. Resolutions and iteration counts must be positive;
/// dissipation rates are decay per second.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Short-side resolution of the velocity, pressure, divergence and curl fields.
    pub sim_resolution: u32,
    /// Short-side resolution of the dye field.
    pub dye_resolution: u32,
    /// Short-side resolution of frames produced by `FluidSimulation::capture`.
    pub capture_resolution: u32,
    pub density_dissipation: f32,
    pub velocity_dissipation: f32,
    /// Factor applied to last frame's pressure before the Jacobi sweeps.
    pub pressure: f32,
    pub pressure_iterations: u32,
    /// Vorticity confinement strength.
    pub curl: f32,
    pub splat_radius: f32,
    pub splat_force: f32,
    pub shading: bool,
    /// Cycle pointer colors over time.
    pub colorful: bool,
    pub color_update_speed: f32,
    pub paused: bool,
    /// Background color in 0..=255 per channel.
    pub back_color: Vec3,
    /// Draw a checkerboard instead of `back_color`.
    pub transparent: bool,
    pub bloom: bool,
    pub bloom_iterations: u32,
    pub bloom_resolution: u32,
    pub bloom_intensity: f32,
    pub bloom_threshold: f32,
    pub bloom_soft_knee: f32,
    pub sunrays: bool,
    pub sunrays_resolution: u32,
    pub sunrays_weight: f32,
    pub sunrays_blur_iterations: u32,
    /// Brightness of generated pointer colors.
    pub color_scale: f32,
    pub random_splat_force: f32,
    pub random_splat_count: u32,
    pub random_splat_offset: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sim_resolution: 256,
            dye_resolution: 1440,
            capture_resolution: 512,
            density_dissipation: 4.0,
            velocity_dissipation: 0.5,
            pressure: 0.1,
            pressure_iterations: 20,
            curl: 3.0,
            splat_radius: 0.6,
            splat_force: 6000.0,
            shading: true,
            colorful: true,
            color_update_speed: 10.0,
            paused: false,
            back_color: Vec3::ZERO,
            transparent: false,
            bloom: false,
            bloom_iterations: 8,
            bloom_resolution: 256,
            bloom_intensity: 0.8,
            bloom_threshold: 0.6,
            bloom_soft_knee: 0.7,
            sunrays: true,
            sunrays_resolution: 196,
            sunrays_weight: 0.6,
            sunrays_blur_iterations: 1,
            color_scale: 0.15,
            random_splat_force: 1000.0,
            random_splat_count: 20,
            random_splat_offset: 5,
        }
    }
}

/// Configuration shared between the simulation and whoever edits it.
///
/// The simulation reads a snapshot once per frame, so a writer on another thread
/// never changes parameters in the middle of a step.
#[derive(Clone, Debug, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<SimulationConfig>>,
}

impl SharedConfig {
    pub fn new(config: SimulationConfig) -> Self {
        Self { inner: Arc::new(RwLock::new(config)) }
    }

    pub fn snapshot(&self) -> SimulationConfig {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn update<R>(&self, edit: impl FnOnce(&mut SimulationConfig) -> R) -> R {
        let mut config = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        edit(&mut config)
    }
}

impl From<SimulationConfig> for SharedConfig {
    fn from(config: SimulationConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_detached_from_later_edits() {
        let shared = SharedConfig::new(SimulationConfig::default());
        let before = shared.snapshot();

        shared.update(|config| config.curl = 30.0);

        assert_eq!(before.curl, 3.0);
        assert_eq!(shared.snapshot().curl, 30.0);
    }

    #[test]
    fn clones_share_the_same_record() {
        let shared = SharedConfig::default();
        let ui_handle = shared.clone();

        ui_handle.update(|config| config.paused = true);

        assert!(shared.snapshot().paused);
    }
}
