use std::mem;
use std::ops::Range;

use glam::{Mat4, UVec2, Vec2};
use log::debug;

use crate::{gpu, Error};

/// Reconstruction quality requested from the denoiser; forwarded opaquely,
/// but it also drives the input-size negotiation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QualityLevel {
    Quality,
    #[default]
    Balanced,
    Performance,
}

/// Vendor-specific denoiser preset; an opaque token from the adapter's point
/// of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DenoiserPreset(pub u32);

/// Input-resolution range a denoiser supports for a given output resolution.
#[derive(Clone, Copy, Debug)]
pub struct SupportedSizes {
    pub min: UVec2,
    pub max: UVec2,
    pub optimal: UVec2,
}

impl SupportedSizes {
    /// Clamps a requested render size into the supported range.
    pub fn clamp(&self, size: UVec2) -> UVec2 {
        size.clamp(self.min, self.max)
    }
}

/// Which image a [`Denoiser::bind()`] call is attaching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuideRole {
    Color,
    DiffuseAlbedo,
    SpecularAlbedo,
    SpecularHitDistance,
    NormalRoughness,
    Motion,
    ViewZ,
    DenoisedOutput,
}

/// The external reconstruction stage, treated as a black box.
///
/// The orchestrator guarantees that all guide-buffer writes are visible
/// before [`Self::run()`] and that the denoised output is not read before the
/// adapter's pass completes.
pub trait Denoiser {
    /// Queries the input-size range supported for given output size; called
    /// on creation and again on every quality or preset change.
    fn supported_input_sizes(
        &self,
        output_size: UVec2,
        quality: QualityLevel,
    ) -> SupportedSizes;

    fn initialize(
        &mut self,
        device: &wgpu::Device,
        input_size: UVec2,
        output_size: UVec2,
        quality: QualityLevel,
        preset: DenoiserPreset,
    ) -> Result<(), Error>;

    /// Attaches one image for given role; called after `initialize()` and
    /// again whenever the underlying textures are reallocated.
    fn bind(
        &mut self,
        device: &wgpu::Device,
        role: GuideRole,
        image: wgpu::TextureView,
    );

    /// Encodes this frame's reconstruction work.
    ///
    /// `view` and `proj` are handed over in the host's column-major,
    /// right-handed convention. An adapter wrapping a row-major backend can
    /// usually pass them through unchanged - transposing both operands of a
    /// product swaps the multiplication order, and the two conversions cancel
    /// - but that cancellation must be checked against the backend's actual
    /// composition, not assumed.
    fn run(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        render_size: UVec2,
        jitter: Vec2,
        view: Mat4,
        proj: Mat4,
        reset_history: bool,
    ) -> Result<(), Error>;
}

/// Built-in reference adapter: upscales the noisy color buffer and calls it
/// a day. No temporal history, so `reset_history` is a no-op.
pub struct PassthroughDenoiser {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    color: Option<wgpu::TextureView>,
    output: Option<wgpu::TextureView>,
    input_size: UVec2,
    output_size: UVec2,
}

impl PassthroughDenoiser {
    pub(crate) fn new(
        device: &wgpu::Device,
        shader: &(wgpu::ShaderModule, &'static str),
    ) -> Self {
        debug!("Initializing denoiser: passthrough");

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("luster_passthrough_denoiser_bgl"),
                entries: &[
                    storage_texture_entry(0),
                    storage_texture_entry(1),
                ],
            });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("luster_passthrough_denoiser_pipeline_layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::COMPUTE,
                    range: Range {
                        start: 0,
                        end: mem::size_of::<gpu::UpscalePassParams>() as u32,
                    },
                }],
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("luster_passthrough_denoiser_pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader.0,
                entry_point: shader.1,
            });

        Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            color: None,
            output: None,
            input_size: UVec2::ONE,
            output_size: UVec2::ONE,
        }
    }

    fn input_sizes(
        output_size: UVec2,
        quality: QualityLevel,
    ) -> SupportedSizes {
        // Mimics the shape of a real reconstruction stage's contract: the
        // optimal input shrinks as the quality level drops
        let optimal = match quality {
            QualityLevel::Quality => output_size * 2 / 3,
            QualityLevel::Balanced => output_size / 2,
            QualityLevel::Performance => output_size / 3,
        };

        SupportedSizes {
            min: (output_size / 4).max(UVec2::ONE),
            max: output_size,
            optimal: optimal.max(UVec2::ONE),
        }
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        let (Some(color), Some(output)) = (&self.color, &self.output) else {
            return;
        };

        let bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("luster_passthrough_denoiser_bg"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(color),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(output),
                    },
                ],
            });

        self.bind_group = Some(bind_group);
    }
}

impl Denoiser for PassthroughDenoiser {
    fn supported_input_sizes(
        &self,
        output_size: UVec2,
        quality: QualityLevel,
    ) -> SupportedSizes {
        Self::input_sizes(output_size, quality)
    }

    fn initialize(
        &mut self,
        _device: &wgpu::Device,
        input_size: UVec2,
        output_size: UVec2,
        _quality: QualityLevel,
        _preset: DenoiserPreset,
    ) -> Result<(), Error> {
        self.input_size = input_size;
        self.output_size = output_size;
        self.bind_group = None;
        self.color = None;
        self.output = None;

        Ok(())
    }

    fn bind(
        &mut self,
        device: &wgpu::Device,
        role: GuideRole,
        image: wgpu::TextureView,
    ) {
        match role {
            GuideRole::Color => self.color = Some(image),
            GuideRole::DenoisedOutput => self.output = Some(image),

            // The other guides carry no signal a plain upscale can use
            _ => return,
        }

        self.rebuild_bind_group(device);
    }

    fn run(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        render_size: UVec2,
        _jitter: Vec2,
        _view: Mat4,
        _proj: Mat4,
        _reset_history: bool,
    ) -> Result<(), Error> {
        if render_size != self.input_size {
            return Err(Error::Denoiser(format!(
                "initialized for input size {:?}, ran with {render_size:?}",
                self.input_size,
            )));
        }

        let bind_group = self.bind_group.as_ref().ok_or_else(|| {
            Error::Denoiser("color or output image not bound".into())
        })?;

        let params = gpu::UpscalePassParams {
            src_size: render_size,
            dst_size: self.output_size,
        };

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("luster_passthrough_denoiser_pass"),
            });

        pass.set_pipeline(&self.pipeline);
        pass.set_push_constants(0, bytemuck::bytes_of(&params));
        pass.set_bind_group(0, bind_group, &[]);

        pass.dispatch_workgroups(
            (self.output_size.x + 7) / 8,
            (self.output_size.y + 7) / 8,
            1,
        );

        Ok(())
    }
}

fn storage_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::ReadWrite,
            format: wgpu::TextureFormat::Rgba16Float,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}
