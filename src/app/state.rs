use std::sync::Arc;
use glam::UVec2;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::app::input_manager::InputManager;
use crate::fluid::config::SimulationConfig;
use crate::fluid::programs::Destination;
use crate::fluid::simulation::FluidSimulation;
use crate::renderer::wgpu_context::WgpuContext;

// Everything the window needs between frames
pub struct State {
    pub(crate) wgpu_context: WgpuContext,
    simulation: FluidSimulation,
    input_manager: InputManager,
}

impl State {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let wgpu_context = WgpuContext::new(window).await?;
        let canvas = wgpu_context.window_size().as_uvec2().max(UVec2::ONE);
        let simulation = FluidSimulation::new(&wgpu_context, SimulationConfig::default(), canvas)?;

        Ok(Self {
            wgpu_context,
            simulation,
            input_manager: InputManager::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.wgpu_context.resize(width, height);
        self.simulation.resize_canvas(width, height);
    }

    pub fn render_loop(&mut self, event: &WindowEvent, event_loop: &ActiveEventLoop) {
        match event {
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match self.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = self.wgpu_context.window_size().as_uvec2();
                    self.resize(size.x, size.y);
                }
                Err(e) => {
                    log::error!("Unable to render: {:?}", e);
                }
            },
            _ => {
                let canvas = self.wgpu_context.window_size();
                self.input_manager.manage_input(event, event_loop, &mut self.simulation, canvas);
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.wgpu_context.get_window().request_redraw();

        if !self.wgpu_context.is_surface_configured() {
            return Ok(());
        }

        let output = self.wgpu_context.get_surface().get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let format = self.wgpu_context.get_surface_config().format;

        self.simulation.update(&self.wgpu_context, Destination::new(&view, format));

        self.wgpu_context.get_window().pre_present_notify();
        output.present();
        Ok(())
    }
}
