pub mod config;
pub mod dithering;
pub mod formats;
pub mod framebuffer;
pub mod pointer;
pub mod post;
pub mod programs;
pub mod simulation;
pub mod splat;
pub mod stepper;

pub use config::{SharedConfig, SimulationConfig};
pub use pointer::Pointer;
pub use simulation::{Field, FieldSnapshot, FluidSimulation};
