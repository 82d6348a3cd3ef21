use glam::Vec2;
use rand::Rng;
use winit::event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::fluid::pointer::Pointer;
use crate::fluid::simulation::FluidSimulation;
use crate::fluid::splat::generate_color;

/// The mouse is tracked as pointer 0; touches use their id plus one.
const MOUSE_POINTER_ID: u64 = 0;

/// Turns window events into pointer updates and keyboard commands.
pub struct InputManager {
    cursor_position: Vec2,
    mouse: Pointer,
}

impl InputManager {
    pub fn new() -> InputManager {
        InputManager {
            cursor_position: Vec2::ZERO,
            mouse: Pointer::new(MOUSE_POINTER_ID),
        }
    }

    pub fn manage_input(&mut self, event: &WindowEvent, event_loop: &ActiveEventLoop, simulation: &mut FluidSimulation, canvas: Vec2) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, simulation, code, key_state.is_pressed()),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = Vec2::new(position.x as f32, position.y as f32);
                if self.mouse.down {
                    self.mouse.move_to(self.cursor_position, canvas);
                    simulation.update_pointers([self.mouse.clone()]);
                }
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                match state {
                    ElementState::Pressed => {
                        let color = generate_color(&mut rand::rng(), simulation.config().snapshot().color_scale);
                        self.mouse.press(self.cursor_position, canvas, color);
                    }
                    ElementState::Released => self.mouse.release(),
                }
                simulation.update_pointers([self.mouse.clone()]);
            }
            WindowEvent::Touch(touch) => self.handle_touch(touch, simulation, canvas),
            _ => {}
        }
    }

    fn handle_key(&self, event_loop: &ActiveEventLoop, simulation: &mut FluidSimulation, code: &KeyCode, is_pressed: bool) {
        match (code, is_pressed) {
            (KeyCode::Escape, true) => event_loop.exit(),
            (KeyCode::KeyP, true) => {
                let paused = simulation.config().update(|config| {
                    config.paused = !config.paused;
                    config.paused
                });
                log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
            }
            (KeyCode::Space, true) => {
                let count = rand::rng().random_range(5..25);
                simulation.push_splats(count);
            }
            _ => {}
        }
    }

    fn handle_touch(&self, touch: &Touch, simulation: &mut FluidSimulation, canvas: Vec2) {
        let id = touch.id + 1;
        let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        let mut pointer = simulation
            .pointers()
            .iter()
            .find(|pointer| pointer.id == id)
            .cloned()
            .unwrap_or_else(|| Pointer::new(id));

        match touch.phase {
            TouchPhase::Started => {
                let color = generate_color(&mut rand::rng(), simulation.config().snapshot().color_scale);
                pointer.press(position, canvas, color);
            }
            TouchPhase::Moved => {
                if !pointer.down {
                    return;
                }
                pointer.move_to(position, canvas);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => pointer.release(),
        }
        simulation.update_pointers([pointer]);
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
