use glam::{UVec2, Vec2, Vec3};
use rand::Rng;
use wgpu_profiler::{GpuProfiler, GpuProfilerSettings, GpuTimerQueryResult};

use crate::fluid::config::{SharedConfig, SimulationConfig};
use crate::fluid::formats::FormatSupport;
use crate::fluid::framebuffer::{get_resolution, RenderTarget, TargetSpec};
use crate::fluid::pointer::{merge_pointers, wrap, Pointer};
use crate::fluid::post::Compositor;
use crate::fluid::programs::{Destination, Kernel, KernelParams, ProgramRegistry};
use crate::fluid::splat::{self, apply_splat, generate_color, random_splats, Splat};
use crate::fluid::stepper::{self, clamp_delta_time, Fields};
use crate::renderer::render_timer::RenderTimer;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::texture_readback::download_rgba32f;

/// A field that can be downloaded with `FluidSimulation::read_field`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Dye,
    Velocity,
    Pressure,
    Divergence,
    Curl,
    Bloom,
    Sunrays,
}

/// CPU copy of a texture, RGBA per texel, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSnapshot {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 4]>,
}

impl FieldSnapshot {
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        self.texels[(y * self.width + x) as usize]
    }

    /// Clamped 8-bit RGBA, for writing the frame out as an image.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.texels
            .iter()
            .flat_map(|texel| texel.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }
}

/// The whole fluid: solver fields, kernels, post-processing and interaction state.
pub struct FluidSimulation {
    config: SharedConfig,
    frame_config: SimulationConfig,
    formats: FormatSupport,
    programs: ProgramRegistry,
    fields: Fields,
    compositor: Compositor,
    canvas: UVec2,
    pending_canvas: Option<UVec2>,
    pointers: Vec<Pointer>,
    splat_stack: Vec<u32>,
    color_update_timer: f32,
    render_timer: RenderTimer,
    gpu_profiler: GpuProfiler,
}

impl FluidSimulation {
    /// Negotiates formats, compiles the kernels, allocates every field and seeds the
    /// fluid with a random burst of splats.
    pub fn new(wgpu_context: &WgpuContext, config: impl Into<SharedConfig>, canvas: UVec2) -> anyhow::Result<Self> {
        let config = config.into();
        let frame_config = config.snapshot();
        let canvas = canvas.max(UVec2::ONE);

        let formats = FormatSupport::negotiate(wgpu_context);
        let programs = ProgramRegistry::new(wgpu_context, &formats);
        let sim_size = get_resolution(frame_config.sim_resolution, canvas);
        let dye_size = get_resolution(frame_config.dye_resolution, canvas);
        let fields = Fields::new(wgpu_context, &formats, sim_size, dye_size);
        let compositor = Compositor::new(wgpu_context, &formats, canvas, &frame_config);
        let gpu_profiler = GpuProfiler::new(wgpu_context.get_device(), GpuProfilerSettings::default())?;

        let mut simulation = Self {
            config,
            frame_config,
            formats,
            programs,
            fields,
            compositor,
            canvas,
            pending_canvas: None,
            pointers: Vec::new(),
            splat_stack: Vec::new(),
            color_update_timer: 0.0,
            render_timer: RenderTimer::new(),
            gpu_profiler,
        };

        let seed_splats = simulation.initial_splat_count();
        simulation.multiple_splats(wgpu_context, seed_splats);
        log::info!("Fluid simulation ready: sim {sim_size}, dye {dye_size}, {seed_splats} seed splats");

        Ok(simulation)
    }

    fn initial_splat_count(&self) -> u32 {
        let config = &self.frame_config;
        let random = if config.random_splat_count > 0 {
            rand::rng().random_range(0..config.random_splat_count)
        } else {
            0
        };
        random + config.random_splat_offset
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn canvas_size(&self) -> UVec2 {
        self.canvas
    }

    pub fn formats(&self) -> &FormatSupport {
        &self.formats
    }

    pub fn programs(&self) -> &ProgramRegistry {
        &self.programs
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Re-derives every framebuffer from the current canvas and configuration.
    /// Dye and velocity keep their contents.
    pub fn init_framebuffers(&mut self, wgpu_context: &WgpuContext) {
        self.frame_config = self.config.snapshot();
        self.formats = FormatSupport::negotiate(wgpu_context);
        if !self.programs.is_compatible_with(&self.formats) {
            self.programs = ProgramRegistry::new(wgpu_context, &self.formats);
        }

        let sim_size = get_resolution(self.frame_config.sim_resolution, self.canvas);
        let dye_size = get_resolution(self.frame_config.dye_resolution, self.canvas);
        self.fields.resize(wgpu_context, &mut self.programs, &self.formats, sim_size, dye_size);
        self.compositor.resize(wgpu_context, &self.formats, self.canvas, &self.frame_config);
        log::debug!("Framebuffers rebuilt for canvas {}: sim {sim_size}, dye {dye_size}", self.canvas);
    }

    /// Records a new canvas size. It takes effect at the start of the next `update`.
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let size = UVec2::new(width, height);
        if size != self.canvas || self.pending_canvas.is_some() {
            self.pending_canvas = Some(size);
        }
    }

    /// Runs one frame: pending resize, color cycling, input splats, a simulation step
    /// unless paused, and the composited render into `destination`.
    pub fn update(&mut self, wgpu_context: &WgpuContext, destination: Destination) {
        let dt = clamp_delta_time(self.render_timer.get_delta().as_secs_f32());
        self.frame_config = self.config.snapshot();

        if let Some(canvas) = self.pending_canvas.take() {
            if canvas != self.canvas {
                self.canvas = canvas;
                self.init_framebuffers(wgpu_context);
            }
        }

        self.update_colors(dt);
        let splats = self.take_input_splats();

        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Fluid Frame Encoder"),
        });

        if !splats.is_empty() {
            let radius = self.splat_radius();
            let aspect_ratio = self.aspect_ratio();
            let mut scope = self.gpu_profiler.scope("Splats", &mut encoder);
            for splat in &splats {
                apply_splat(wgpu_context, &mut scope, &mut self.programs, &mut self.fields, splat, radius, aspect_ratio);
            }
        }

        if !self.frame_config.paused {
            let mut scope = self.gpu_profiler.scope("Step", &mut encoder);
            stepper::step(wgpu_context, &mut scope, &mut self.programs, &mut self.fields, &self.frame_config, dt);
        }

        self.compositor.render(
            wgpu_context,
            &mut encoder,
            &self.gpu_profiler,
            &mut self.programs,
            self.fields.dye.read(),
            &self.frame_config,
            destination,
            self.canvas,
            false,
        );

        self.submit(wgpu_context, encoder);
    }

    fn submit(&mut self, wgpu_context: &WgpuContext, mut encoder: wgpu::CommandEncoder) {
        self.gpu_profiler.resolve_queries(&mut encoder);
        self.programs.submit(wgpu_context, encoder);

        if let Err(e) = self.gpu_profiler.end_frame() {
            log::warn!("Unable to end profiler frame: {e}");
        }
        if let Some(results) = self.gpu_profiler.process_finished_frame(wgpu_context.get_queue().get_timestamp_period()) {
            log_timings(&results);
        }
    }

    fn update_colors(&mut self, dt: f32) {
        if !self.frame_config.colorful {
            return;
        }
        self.color_update_timer += dt * self.frame_config.color_update_speed;
        if self.color_update_timer >= 1.0 {
            self.color_update_timer = wrap(self.color_update_timer, 0.0, 1.0);
            let mut rng = rand::rng();
            for pointer in &mut self.pointers {
                pointer.color = generate_color(&mut rng, self.frame_config.color_scale);
            }
        }
    }

    /// Pops one queued random burst and consumes every moved pointer.
    fn take_input_splats(&mut self) -> Vec<Splat> {
        let mut splats = match self.splat_stack.pop() {
            Some(count) => random_splats(&mut rand::rng(), count, &self.frame_config),
            None => Vec::new(),
        };

        let splat_force = self.frame_config.splat_force;
        for pointer in self.pointers.iter_mut().filter(|pointer| pointer.moved) {
            pointer.moved = false;
            splats.push(Splat {
                position: pointer.texcoord,
                force: pointer.delta * splat_force,
                color: pointer.color,
            });
        }
        splats
    }

    /// Advances the solver by `dt` seconds, clamped to 1/60 s.
    pub fn step(&mut self, wgpu_context: &WgpuContext, dt: f32) {
        self.frame_config = self.config.snapshot();
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Fluid Step Encoder"),
        });
        {
            let mut scope = self.gpu_profiler.scope("Step", &mut encoder);
            stepper::step(wgpu_context, &mut scope, &mut self.programs, &mut self.fields, &self.frame_config, dt);
        }
        self.submit(wgpu_context, encoder);
    }

    /// Composites the current dye field into `destination`, which must match the canvas size.
    pub fn render(&mut self, wgpu_context: &WgpuContext, destination: Destination) {
        self.frame_config = self.config.snapshot();
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Fluid Render Encoder"),
        });
        self.compositor.render(
            wgpu_context,
            &mut encoder,
            &self.gpu_profiler,
            &mut self.programs,
            self.fields.dye.read(),
            &self.frame_config,
            destination,
            self.canvas,
            false,
        );
        self.submit(wgpu_context, encoder);
    }

    /// Renders the composited frame at `capture_resolution` and downloads it.
    pub fn capture(&mut self, wgpu_context: &WgpuContext) -> Result<FieldSnapshot, wgpu::BufferAsyncError> {
        self.frame_config = self.config.snapshot();
        let size = get_resolution(self.frame_config.capture_resolution, self.canvas);
        let target = RenderTarget::new(
            wgpu_context,
            "Capture",
            size.x,
            size.y,
            TargetSpec::new(self.formats.rgba, wgpu::FilterMode::Nearest),
        );

        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Fluid Capture Encoder"),
        });
        self.compositor.render(
            wgpu_context,
            &mut encoder,
            &self.gpu_profiler,
            &mut self.programs,
            self.fields.dye.read(),
            &self.frame_config,
            target.destination(),
            size,
            true,
        );
        self.submit(wgpu_context, encoder);

        Self::download_target(wgpu_context, &mut self.programs, &target)
    }

    /// Downloads the current contents of `field`.
    pub fn read_field(&mut self, wgpu_context: &WgpuContext, field: Field) -> Result<FieldSnapshot, wgpu::BufferAsyncError> {
        let fields = &self.fields;
        let target = match field {
            Field::Dye => fields.dye.read(),
            Field::Velocity => fields.velocity.read(),
            Field::Pressure => fields.pressure.read(),
            Field::Divergence => &fields.divergence,
            Field::Curl => &fields.curl,
            Field::Bloom => self.compositor.bloom().target(),
            Field::Sunrays => self.compositor.sunrays().target(),
        };
        Self::download_target(wgpu_context, &mut self.programs, target)
    }

    /// Copies `target` into a 32-bit float texture of the same size so every format reads back alike.
    fn download_target(
        wgpu_context: &WgpuContext,
        programs: &mut ProgramRegistry,
        target: &RenderTarget,
    ) -> Result<FieldSnapshot, wgpu::BufferAsyncError> {
        let staging = RenderTarget::new(
            wgpu_context,
            "Readback",
            target.width(),
            target.height(),
            TargetSpec::new(wgpu::TextureFormat::Rgba32Float, wgpu::FilterMode::Nearest),
        );
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Field Readback Encoder"),
        });
        programs.draw(
            wgpu_context,
            &mut encoder,
            Kernel::Copy,
            &KernelParams::with_texel_size(staging.texel_size()),
            &[("u_texture", target.input())],
            staging.destination(),
        );
        programs.submit(wgpu_context, encoder);

        let texels = download_rgba32f(wgpu_context, staging.texture())?;
        Ok(FieldSnapshot { width: staging.width(), height: staging.height(), texels })
    }

    /// One splat at normalized position `(x, y)` (y up) with force `(dx, dy)`.
    pub fn splat(&mut self, wgpu_context: &WgpuContext, x: f32, y: f32, dx: f32, dy: f32, color: Vec3) {
        let splat = Splat { position: Vec2::new(x, y), force: Vec2::new(dx, dy), color };
        self.apply_splats(wgpu_context, &[splat]);
    }

    /// `count` splats at random positions with random colors and forces.
    pub fn multiple_splats(&mut self, wgpu_context: &WgpuContext, count: u32) {
        let splats = random_splats(&mut rand::rng(), count, &self.frame_config);
        self.apply_splats(wgpu_context, &splats);
    }

    fn apply_splats(&mut self, wgpu_context: &WgpuContext, splats: &[Splat]) {
        if splats.is_empty() {
            return;
        }
        let radius = self.splat_radius();
        let aspect_ratio = self.aspect_ratio();
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Fluid Splat Encoder"),
        });
        {
            let mut scope = self.gpu_profiler.scope("Splats", &mut encoder);
            for splat in splats {
                apply_splat(wgpu_context, &mut scope, &mut self.programs, &mut self.fields, splat, radius, aspect_ratio);
            }
        }
        self.submit(wgpu_context, encoder);
    }

    /// Queues a random burst of `count` splats. Queued bursts are applied one per frame.
    pub fn push_splats(&mut self, count: u32) {
        self.splat_stack.push(count);
    }

    pub fn pending_splat_bursts(&self) -> usize {
        self.splat_stack.len()
    }

    /// Merges pointer state by id; see `merge_pointers`.
    pub fn update_pointers(&mut self, pointers: impl IntoIterator<Item = Pointer>) {
        merge_pointers(&mut self.pointers, pointers);
    }

    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.canvas.x as f32 / self.canvas.y as f32
    }

    pub fn correct_delta_x(&self, delta: f32) -> f32 {
        splat::correct_delta_x(delta, self.aspect_ratio())
    }

    pub fn correct_delta_y(&self, delta: f32) -> f32 {
        splat::correct_delta_y(delta, self.aspect_ratio())
    }

    pub fn correct_radius(&self, radius: f32) -> f32 {
        splat::correct_radius(radius, self.aspect_ratio())
    }

    fn splat_radius(&self) -> f32 {
        self.correct_radius(self.frame_config.splat_radius / 100.0)
    }
}

fn log_timings(results: &[GpuTimerQueryResult]) {
    for result in results {
        if let Some(time) = &result.time {
            log::trace!("{}: {:.3} ms", result.label, (time.end - time.start) * 1000.0);
        }
        log_timings(&result.nested_queries);
    }
}
