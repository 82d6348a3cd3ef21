pub mod fluid;
pub mod renderer;
pub mod utils;
mod app;

pub use app::run;
#[cfg(target_arch = "wasm32")]
pub use app::run_web;
