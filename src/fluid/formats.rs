use wgpu::TextureFormat;
use crate::renderer::wgpu_context::WgpuContext;

/// Anything that can tell whether a texture format can be rendered into.
pub trait FormatProbe {
    fn supports_render_target(&self, format: TextureFormat) -> bool;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub format: TextureFormat,
    /// Number of formats that were probed before settling.
    pub probes: u32,
}

/// Next format to try when `format` cannot be rendered into.
fn fallback(format: TextureFormat) -> Option<TextureFormat> {
    match format {
        TextureFormat::R16Float | TextureFormat::Rg16Float => Some(TextureFormat::Rgba16Float),
        TextureFormat::Rgba16Float => Some(TextureFormat::Rgba8Unorm),
        _ => None,
    }
}

/// Walks the fallback chain starting at `requested` and returns the first renderable format.
///
/// The end of the chain is returned even if the probe rejects it; whoever renders into it
/// finds out for real.
pub fn negotiate_format(probe: &impl FormatProbe, requested: TextureFormat) -> NegotiatedFormat {
    let mut format = requested;
    let mut probes = 0;
    loop {
        probes += 1;
        if probe.supports_render_target(format) {
            return NegotiatedFormat { format, probes };
        }
        match fallback(format) {
            Some(next) => {
                log::warn!("{format:?} is not renderable, falling back to {next:?}");
                format = next;
            }
            None => {
                log::warn!("No renderable format found starting from {requested:?}, using {format:?} anyway");
                return NegotiatedFormat { format, probes };
            }
        }
    }
}

/// Probes the device by checking the format capabilities and then allocating a
/// small render target and clearing it inside a validation error scope.
pub struct WgpuFormatProbe<'a> {
    wgpu_context: &'a WgpuContext,
}

impl<'a> WgpuFormatProbe<'a> {
    pub fn new(wgpu_context: &'a WgpuContext) -> Self {
        Self { wgpu_context }
    }

    fn format_features(&self, format: TextureFormat) -> wgpu::TextureFormatFeatures {
        let device = self.wgpu_context.get_device();
        if device.features().contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES) {
            self.wgpu_context.get_adapter().get_texture_format_features(format)
        } else {
            format.guaranteed_format_features(device.features())
        }
    }

    /// Whether `format` can be sampled with a linear filter.
    pub fn supports_linear_filtering(&self, format: TextureFormat) -> bool {
        self.format_features(format).flags.contains(wgpu::TextureFormatFeatureFlags::FILTERABLE)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn probe_render_pass(&self, format: TextureFormat) -> bool {
        let device = self.wgpu_context.get_device();
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Format Probe Texture"),
            size: wgpu::Extent3d { width: 4, height: 4, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Format Probe Encoder"),
        });
        {
            let _probe_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Format Probe Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        let command_buffer = encoder.finish();

        match pollster::block_on(device.pop_error_scope()) {
            Some(error) => {
                log::debug!("Probe render target {format:?} rejected: {error}");
                false
            }
            None => {
                // The probe passed validation; the command buffer is discarded unsubmitted.
                drop(command_buffer);
                true
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn probe_render_pass(&self, _format: TextureFormat) -> bool {
        // Error scopes cannot be awaited synchronously on the web; trust the capability table.
        true
    }
}

impl FormatProbe for WgpuFormatProbe<'_> {
    fn supports_render_target(&self, format: TextureFormat) -> bool {
        let features = self.format_features(format);
        if !features.allowed_usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
            return false;
        }
        self.probe_render_pass(format)
    }
}

/// The formats every field is allocated with, negotiated against the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormatSupport {
    /// Dye, bloom and sunrays mask.
    pub rgba: TextureFormat,
    /// Velocity.
    pub rg: TextureFormat,
    /// Pressure, divergence, curl and sunrays.
    pub r: TextureFormat,
    pub linear_filtering: bool,
}

impl FormatSupport {
    pub fn negotiate(wgpu_context: &WgpuContext) -> Self {
        let probe = WgpuFormatProbe::new(wgpu_context);
        let support = Self::negotiate_with(&probe, |format| probe.supports_linear_filtering(format));
        log::info!("Negotiated render target formats: {support:?}");
        support
    }

    pub fn negotiate_with(probe: &impl FormatProbe, filterable: impl Fn(TextureFormat) -> bool) -> Self {
        let rgba = negotiate_format(probe, TextureFormat::Rgba16Float).format;
        let rg = negotiate_format(probe, TextureFormat::Rg16Float).format;
        let r = negotiate_format(probe, TextureFormat::R16Float).format;
        let linear_filtering = [rgba, rg, r].into_iter().all(filterable);
        Self { rgba, rg, r, linear_filtering }
    }

    /// Filter mode for fields that are sampled between texels.
    pub fn filter_mode(&self) -> wgpu::FilterMode {
        if self.linear_filtering {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        }
    }
}
