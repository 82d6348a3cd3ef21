use std::sync::Arc;
use glam::Vec2;
use wgpu::Adapter;
use winit::window::Window;

use crate::renderer::surface_manager::SurfaceManager;

/// Features the profiler can use when the adapter offers them. None of them are required.
const OPTIONAL_FEATURES: wgpu::Features = wgpu::Features::TIMESTAMP_QUERY
    .union(wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS)
    .union(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES);

pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_manager: Option<SurfaceManager>,
    adapter: Adapter,
}

impl WgpuContext {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        // The instance is a handle to our GPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions{
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            }).await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor{
                label: Some("Fluid Device"),
                required_features: adapter.features() & OPTIONAL_FEATURES,
                required_limits: WgpuContext::get_limits(&adapter),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            }).await?;

        let surface_manager = Some(SurfaceManager::new(window, surface, &adapter));

        log::info!("Using adapter {:?}", adapter.get_info());

        Ok(Self {
            device,
            queue,
            surface_manager,
            adapter,
        })
    }

    fn get_limits(adapter: &Adapter) -> wgpu::Limits {
        if cfg!(target_arch = "wasm32") {
            // When on web, request the browser's supported limits
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
        } else {
            // For native, use the adapter's reported limits
            adapter.limits()
        }
    }

    pub async fn new_for_test() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None, // <-- NO SURFACE
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Test Device"),
                    required_features: adapter.features() & OPTIONAL_FEATURES,
                    required_limits: WgpuContext::get_limits(&adapter),
                    ..Default::default()
                },
            )
            .await?;

        Ok(Self {
            device,
            queue,
            surface_manager: None,
            adapter,
        })
    }

    pub fn window_size(&self) -> Vec2 {
        match &self.surface_manager {
            Some(surface_manager) => {
                let size = surface_manager.window_size();
                Vec2::new(size.width as f32, size.height as f32)
            }
            None => Vec2::ZERO,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface_manager) = self.surface_manager.as_mut() {
            surface_manager.resize(width, height, &self.device);
        }
    }

    pub fn get_window(&self) -> &Arc<Window> {
        self.surface_manager.as_ref().expect("No surface in this context").get_window()
    }

    pub fn get_surface(&self) -> &wgpu::Surface<'static> {
        self.surface_manager.as_ref().expect("No surface manager in this context").get_surface()
    }

    pub fn is_surface_configured(&self) -> bool {
        self.surface_manager.as_ref().is_some_and(|surface_manager| surface_manager.is_surface_configured())
    }

    pub fn get_device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn get_queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn get_adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn get_surface_config(&self) -> &wgpu::SurfaceConfiguration {
        self.surface_manager.as_ref().expect("No surface in this context").get_config()
    }
}
