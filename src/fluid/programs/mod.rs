pub mod keywords;
pub mod params;

use std::borrow::Cow;
use std::collections::HashMap;
use wgpu::{TextureFormat, TextureView};

pub use keywords::{preprocess, Keywords};
pub use params::KernelParams;

use crate::fluid::formats::FormatSupport;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::gpu_buffer::GpuBuffer;

const COMMON_SOURCE: &str = include_str!("../shaders/common.wgsl");
const FRAGMENT_ENTRY: &str = "fs_main";

/// Every fixed-function kernel the simulation draws with. The display pass is
/// compiled separately, one variant per keyword set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kernel {
    Copy,
    Clear,
    Color,
    Checkerboard,
    Blur,
    BloomPrefilter,
    BloomBlur,
    BloomFinal,
    SunraysMask,
    Sunrays,
    Splat,
    Advection,
    Divergence,
    Curl,
    Vorticity,
    Pressure,
    GradientSubtract,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum VertexStage {
    Base,
    Blur,
}

impl VertexStage {
    fn entry_point(self) -> &'static str {
        match self {
            VertexStage::Base => "vs_base",
            VertexStage::Blur => "vs_blur",
        }
    }
}

/// A named texture input. The texture lives at `binding`, its sampler at `binding + 1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureSlot {
    pub name: &'static str,
    pub binding: u32,
}

const fn slot(name: &'static str, binding: u32) -> TextureSlot {
    TextureSlot { name, binding }
}

const U_TEXTURE: TextureSlot = slot("u_texture", 1);
const DISPLAY_BLOOM: TextureSlot = slot("u_bloom", 3);
const DISPLAY_SUNRAYS: TextureSlot = slot("u_sunrays", 5);
const DISPLAY_DITHERING: TextureSlot = slot("u_dithering", 7);

impl Kernel {
    pub const ALL: [Kernel; 17] = [
        Kernel::Copy,
        Kernel::Clear,
        Kernel::Color,
        Kernel::Checkerboard,
        Kernel::Blur,
        Kernel::BloomPrefilter,
        Kernel::BloomBlur,
        Kernel::BloomFinal,
        Kernel::SunraysMask,
        Kernel::Sunrays,
        Kernel::Splat,
        Kernel::Advection,
        Kernel::Divergence,
        Kernel::Curl,
        Kernel::Vorticity,
        Kernel::Pressure,
        Kernel::GradientSubtract,
    ];

    fn fragment_source(self) -> &'static str {
        match self {
            Kernel::Copy => include_str!("../shaders/copy.wgsl"),
            Kernel::Clear => include_str!("../shaders/clear.wgsl"),
            Kernel::Color => include_str!("../shaders/color.wgsl"),
            Kernel::Checkerboard => include_str!("../shaders/checkerboard.wgsl"),
            Kernel::Blur => include_str!("../shaders/blur.wgsl"),
            Kernel::BloomPrefilter => include_str!("../shaders/bloom_prefilter.wgsl"),
            Kernel::BloomBlur => include_str!("../shaders/bloom_blur.wgsl"),
            Kernel::BloomFinal => include_str!("../shaders/bloom_final.wgsl"),
            Kernel::SunraysMask => include_str!("../shaders/sunrays_mask.wgsl"),
            Kernel::Sunrays => include_str!("../shaders/sunrays.wgsl"),
            Kernel::Splat => include_str!("../shaders/splat.wgsl"),
            Kernel::Advection => include_str!("../shaders/advection.wgsl"),
            Kernel::Divergence => include_str!("../shaders/divergence.wgsl"),
            Kernel::Curl => include_str!("../shaders/curl.wgsl"),
            Kernel::Vorticity => include_str!("../shaders/vorticity.wgsl"),
            Kernel::Pressure => include_str!("../shaders/pressure.wgsl"),
            Kernel::GradientSubtract => include_str!("../shaders/gradient_subtract.wgsl"),
        }
    }

    fn vertex_stage(self) -> VertexStage {
        match self {
            Kernel::Blur => VertexStage::Blur,
            _ => VertexStage::Base,
        }
    }

    pub fn slots(self) -> &'static [TextureSlot] {
        match self {
            Kernel::Color | Kernel::Checkerboard => &[],
            Kernel::Copy
            | Kernel::Clear
            | Kernel::Blur
            | Kernel::BloomPrefilter
            | Kernel::BloomBlur
            | Kernel::BloomFinal
            | Kernel::SunraysMask
            | Kernel::Sunrays => &[U_TEXTURE],
            Kernel::Splat => const { &[slot("u_target", 1)] },
            Kernel::Advection => const { &[slot("u_velocity", 1), slot("u_source", 3)] },
            Kernel::Divergence | Kernel::Curl => const { &[slot("u_velocity", 1)] },
            Kernel::Vorticity => const { &[slot("u_velocity", 1), slot("u_curl", 3)] },
            Kernel::Pressure => const { &[slot("u_pressure", 1), slot("u_divergence", 3)] },
            Kernel::GradientSubtract => const { &[slot("u_pressure", 1), slot("u_velocity", 3)] },
        }
    }
}

/// Texture slots of the display variant compiled for `keywords`.
pub fn display_slots(keywords: Keywords) -> Vec<TextureSlot> {
    let mut slots = vec![U_TEXTURE];
    if keywords.contains(Keywords::BLOOM) {
        slots.push(DISPLAY_BLOOM);
        slots.push(DISPLAY_DITHERING);
    }
    if keywords.contains(Keywords::SUNRAYS) {
        slots.push(DISPLAY_SUNRAYS);
    }
    slots
}

/// How a draw combines with what is already in its destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Blend {
    /// Overwrite the destination.
    Replace,
    /// `dst + src`
    Additive,
    /// `src + dst * (1 - src.a)`
    PremultipliedAlpha,
}

impl Blend {
    fn state(self) -> Option<wgpu::BlendState> {
        match self {
            Blend::Replace => None,
            Blend::Additive => {
                let add = wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                };
                Some(wgpu::BlendState { color: add, alpha: add })
            }
            Blend::PremultipliedAlpha => Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
        }
    }

    fn load_op(self) -> wgpu::LoadOp<wgpu::Color> {
        match self {
            Blend::Replace => wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            Blend::Additive | Blend::PremultipliedAlpha => wgpu::LoadOp::Load,
        }
    }
}

/// A texture together with the sampler it is read through.
#[derive(Copy, Clone, Debug)]
pub struct TextureInput<'a> {
    pub view: &'a TextureView,
    pub sampler: &'a wgpu::Sampler,
}

/// Where a draw lands.
#[derive(Copy, Clone, Debug)]
pub struct Destination<'a> {
    pub view: &'a TextureView,
    pub format: TextureFormat,
    pub blend: Blend,
}

impl<'a> Destination<'a> {
    pub fn new(view: &'a TextureView, format: TextureFormat) -> Self {
        Self { view, format, blend: Blend::Replace }
    }

    pub fn blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }
}

/// Runs `create` inside a validation error scope, returning `None` if it raised an error.
fn validated<T>(device: &wgpu::Device, what: &str, create: impl FnOnce() -> T) -> Option<T> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create();
        match pollster::block_on(device.pop_error_scope()) {
            Some(error) => {
                log::error!("Failed to build {what}: {error}");
                None
            }
            None => Some(value),
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        // Errors surface through the device's uncaptured error handler on the web.
        let _ = (device, what);
        Some(create())
    }
}

/// Full-screen quad in clip space, shared by every draw.
pub struct Quad {
    vertices: GpuBuffer<[f32; 2]>,
    indices: GpuBuffer<u16>,
}

impl Quad {
    pub fn new(wgpu_context: &WgpuContext) -> Self {
        let vertices = GpuBuffer::with_label(
            wgpu_context,
            "Quad Vertices",
            vec![[-1.0, -1.0], [-1.0, 1.0], [1.0, 1.0], [1.0, -1.0]],
            wgpu::BufferUsages::VERTEX,
        );
        let indices = GpuBuffer::with_label(
            wgpu_context,
            "Quad Indices",
            vec![0, 1, 2, 0, 2, 3],
            wgpu::BufferUsages::INDEX,
        );
        Self { vertices, indices }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

const UNIFORM_SIZE: u64 = size_of::<KernelParams>() as u64;

/// Every draw's `KernelParams` in one buffer, one aligned slot per draw, bound with a
/// dynamic offset. Slots are handed out until the next `reset`, which must only follow
/// a submit.
pub struct UniformArena {
    buffer: wgpu::Buffer,
    stride: u64,
    capacity: u64,
    cursor: u64,
}

impl UniformArena {
    const INITIAL_CAPACITY: u64 = 64;

    fn new(device: &wgpu::Device, capacity: u64) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = UNIFORM_SIZE.next_multiple_of(alignment);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Kernel Params"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, stride, capacity, cursor: 0 }
    }

    /// Stages `params` in the next free slot and returns its offset. A full arena is
    /// replaced by one twice the size; draws already recorded keep the old buffer alive.
    fn push(&mut self, wgpu_context: &WgpuContext, params: &KernelParams) -> u32 {
        if self.cursor == self.capacity {
            log::debug!("Growing kernel params arena to {} slots", self.capacity * 2);
            *self = Self::new(wgpu_context.get_device(), self.capacity * 2);
        }
        let offset = self.cursor * self.stride;
        wgpu_context.get_queue().write_buffer(&self.buffer, offset, bytemuck::bytes_of(params));
        self.cursor += 1;
        offset as u32
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn used(&self) -> u64 {
        self.cursor
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

/// Uniform buffer plus the texture and sampler handles of every slot, in slot order.
type BindGroupKey = (wgpu::Buffer, Vec<(TextureView, wgpu::Sampler)>);

/// Resized targets leave stale entries behind, so the cache starts over past this size.
const MAX_CACHED_BIND_GROUPS: usize = 32;

/// A compiled kernel: shader module, bindings and the pipelines built for it so far.
pub struct Program {
    label: String,
    module: wgpu::ShaderModule,
    vertex_stage: VertexStage,
    slots: Vec<TextureSlot>,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(TextureFormat, Blend), Option<wgpu::RenderPipeline>>,
    bind_groups: HashMap<BindGroupKey, wgpu::BindGroup>,
}

impl Program {
    /// Compiles `fragment_source` (prefixed with the shared header) after resolving its
    /// keyword blocks. Returns `None`, after logging, if the source does not validate.
    pub fn compile(
        wgpu_context: &WgpuContext,
        label: &str,
        fragment_source: &str,
        keywords: Keywords,
        slots: Vec<TextureSlot>,
        filterable: bool,
    ) -> Option<Self> {
        Self::compile_with_stage(wgpu_context, label, fragment_source, keywords, slots, filterable, VertexStage::Base)
    }

    fn compile_with_stage(
        wgpu_context: &WgpuContext,
        label: &str,
        fragment_source: &str,
        keywords: Keywords,
        slots: Vec<TextureSlot>,
        filterable: bool,
        vertex_stage: VertexStage,
    ) -> Option<Self> {
        let device = wgpu_context.get_device();
        let source = preprocess(&format!("{COMMON_SOURCE}{fragment_source}"), keywords);

        let module = validated(device, label, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
            })
        })?;

        let bind_group_layout = Self::create_bind_group_layout(device, label, &slots, filterable);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("Pipeline Layout for {label}")),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        log::debug!("Compiled {label} with {keywords:?}");
        Some(Self {
            label: label.to_owned(),
            module,
            vertex_stage,
            slots,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            bind_groups: HashMap::new(),
        })
    }

    fn create_bind_group_layout(
        device: &wgpu::Device,
        label: &str,
        slots: &[TextureSlot],
        filterable: bool,
    ) -> wgpu::BindGroupLayout {
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
            },
            count: None,
        }];
        let sampler_type = if filterable {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        };
        for slot in slots {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: slot.binding + 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(sampler_type),
                count: None,
            });
        }

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("Bind Group Layout for {label}")),
            entries: &entries,
        })
    }

    fn pipeline(&mut self, device: &wgpu::Device, format: TextureFormat, blend: Blend) -> Option<&wgpu::RenderPipeline> {
        let label = &self.label;
        let module = &self.module;
        let pipeline_layout = &self.pipeline_layout;
        let vertex_entry = self.vertex_stage.entry_point();
        self.pipelines
            .entry((format, blend))
            .or_insert_with(|| {
                let what = format!("{label} pipeline ({format:?}, {blend:?})");
                validated(device, &what, || {
                    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some(&what),
                        layout: Some(pipeline_layout),
                        vertex: wgpu::VertexState {
                            module,
                            entry_point: Some(vertex_entry),
                            buffers: &[Quad::layout()],
                            compilation_options: wgpu::PipelineCompilationOptions::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module,
                            entry_point: Some(FRAGMENT_ENTRY),
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: blend.state(),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: wgpu::PipelineCompilationOptions::default(),
                        }),
                        primitive: wgpu::PrimitiveState {
                            topology: wgpu::PrimitiveTopology::TriangleList,
                            strip_index_format: None,
                            front_face: wgpu::FrontFace::Ccw,
                            cull_mode: None,
                            polygon_mode: wgpu::PolygonMode::Fill,
                            unclipped_depth: false,
                            conservative: false,
                        },
                        depth_stencil: None,
                        multisample: wgpu::MultisampleState {
                            count: 1,
                            mask: !0,
                            alpha_to_coverage_enabled: false,
                        },
                        multiview: None,
                        cache: None,
                    })
                })
            })
            .as_ref()
    }

    /// Looks up or builds the bind group for `textures`. Returns `None`, after logging,
    /// if a slot of this program has no texture. Names that match no slot are ignored.
    fn bind_group(
        &mut self,
        device: &wgpu::Device,
        uniforms: &wgpu::Buffer,
        textures: &[(&str, TextureInput)],
    ) -> Option<wgpu::BindGroup> {
        let mut inputs = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let Some((_, input)) = textures.iter().find(|(name, _)| *name == slot.name) else {
                log::error!("{}: no texture supplied for {}", self.label, slot.name);
                return None;
            };
            inputs.push((input.view.clone(), input.sampler.clone()));
        }

        let key = (uniforms.clone(), inputs);
        if let Some(bind_group) = self.bind_groups.get(&key) {
            return Some(bind_group.clone());
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: uniforms,
                offset: 0,
                size: wgpu::BufferSize::new(UNIFORM_SIZE),
            }),
        }];
        for (slot, (view, sampler)) in self.slots.iter().zip(&key.1) {
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding + 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", self.label)),
            layout: &self.bind_group_layout,
            entries: &entries,
        });

        if self.bind_groups.len() >= MAX_CACHED_BIND_GROUPS {
            self.bind_groups.clear();
        }
        self.bind_groups.insert(key, bind_group.clone());
        Some(bind_group)
    }

    pub fn cached_bind_groups(&self) -> usize {
        self.bind_groups.len()
    }

    /// Records one full-screen pass of this program into `encoder`.
    #[allow(clippy::too_many_arguments)]
    fn draw(
        &mut self,
        wgpu_context: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        quad: &Quad,
        uniforms: &mut UniformArena,
        params: &KernelParams,
        textures: &[(&str, TextureInput)],
        destination: Destination,
    ) {
        let device = wgpu_context.get_device();
        let offset = uniforms.push(wgpu_context, params);
        let Some(bind_group) = self.bind_group(device, &uniforms.buffer, textures) else {
            return;
        };
        let label = self.label.clone();
        let Some(pipeline) = self.pipeline(device, destination.format, destination.blend) else {
            return;
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: destination.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: destination.blend.load_op(),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &bind_group, &[offset]);
        render_pass.set_vertex_buffer(0, quad.vertices.buffer().slice(..));
        render_pass.set_index_buffer(quad.indices.buffer().slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..quad.indices.len() as u32, 0, 0..1);
    }
}

/// Owns every compiled kernel plus the lazily compiled display variants.
pub struct ProgramRegistry {
    quad: Quad,
    uniforms: UniformArena,
    programs: HashMap<Kernel, Program>,
    display_variants: HashMap<Keywords, Option<Program>>,
    filterable: bool,
}

impl ProgramRegistry {
    pub fn new(wgpu_context: &WgpuContext, support: &FormatSupport) -> Self {
        let filterable = support.linear_filtering;
        let manual_filtering = Keywords::NONE.with(Keywords::MANUAL_FILTERING, !filterable);

        let mut programs = HashMap::new();
        for kernel in Kernel::ALL {
            let keywords = if kernel == Kernel::Advection { manual_filtering } else { Keywords::NONE };
            let program = Program::compile_with_stage(
                wgpu_context,
                &format!("{kernel:?}"),
                kernel.fragment_source(),
                keywords,
                kernel.slots().to_vec(),
                filterable,
                kernel.vertex_stage(),
            );
            if let Some(program) = program {
                programs.insert(kernel, program);
            }
        }
        log::info!("Compiled {} of {} kernels", programs.len(), Kernel::ALL.len());

        Self {
            quad: Quad::new(wgpu_context),
            uniforms: UniformArena::new(wgpu_context.get_device(), UniformArena::INITIAL_CAPACITY),
            programs,
            display_variants: HashMap::new(),
            filterable,
        }
    }

    /// Whether the kernels were built for the sampling capabilities in `support`.
    pub fn is_compatible_with(&self, support: &FormatSupport) -> bool {
        self.filterable == support.linear_filtering
    }

    pub fn manual_filtering(&self) -> bool {
        !self.filterable
    }

    pub fn is_compiled(&self, kernel: Kernel) -> bool {
        self.programs.contains_key(&kernel)
    }

    pub fn display_variant_count(&self) -> usize {
        self.display_variants.len()
    }

    pub fn uniforms(&self) -> &UniformArena {
        &self.uniforms
    }

    pub fn cached_bind_groups(&self, kernel: Kernel) -> usize {
        self.programs.get(&kernel).map_or(0, Program::cached_bind_groups)
    }

    /// Submits `encoder` and recycles the uniform slots its draws used. Every encoder
    /// holding draws from this registry must go through here.
    pub fn submit(&mut self, wgpu_context: &WgpuContext, encoder: wgpu::CommandEncoder) -> wgpu::SubmissionIndex {
        let index = wgpu_context.get_queue().submit([encoder.finish()]);
        self.uniforms.reset();
        index
    }

    /// Records a full-screen pass of `kernel`. Does nothing if the kernel failed to compile.
    pub fn draw(
        &mut self,
        wgpu_context: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        kernel: Kernel,
        params: &KernelParams,
        textures: &[(&str, TextureInput)],
        destination: Destination,
    ) {
        match self.programs.get_mut(&kernel) {
            Some(program) => {
                program.draw(wgpu_context, encoder, &self.quad, &mut self.uniforms, params, textures, destination)
            }
            None => log::debug!("Skipping draw with unavailable kernel {kernel:?}"),
        }
    }

    /// Records the display pass, compiling the variant for `keywords` on first use.
    pub fn draw_display(
        &mut self,
        wgpu_context: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        keywords: Keywords,
        params: &KernelParams,
        textures: &[(&str, TextureInput)],
        destination: Destination,
    ) {
        let filterable = self.filterable;
        let variant = self.display_variants.entry(keywords).or_insert_with(|| {
            Program::compile(
                wgpu_context,
                &format!("Display {keywords:?}"),
                include_str!("../shaders/display.wgsl"),
                keywords,
                display_slots(keywords),
                filterable,
            )
        });
        match variant {
            Some(program) => {
                program.draw(wgpu_context, encoder, &self.quad, &mut self.uniforms, params, textures, destination)
            }
            None => log::debug!("Skipping display pass, {keywords:?} is unavailable"),
        }
    }
}
