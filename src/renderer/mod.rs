pub mod render_timer;
pub mod surface_manager;
pub mod wgpu_context;
