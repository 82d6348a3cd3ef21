pub mod gpu_buffer;
pub mod texture_readback;
