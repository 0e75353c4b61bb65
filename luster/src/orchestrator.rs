mod buffers;
mod history;
mod jitter;
mod pass;
mod passes;
mod timeline;

use glam::{Mat4, UVec2, Vec3};
use log::{info, warn};

pub use self::buffers::*;
pub use self::history::*;
pub use self::jitter::*;
pub use self::pass::*;
pub use self::passes::*;
pub use self::timeline::*;
use crate::{
    gpu, Denoiser, DenoiserPreset, Engine, Error, GuideRole, QualityLevel,
    RenderSettings, SupportedSizes, Texture,
};

/// Sequences one frame's kernels - trace, denoise, tonemap - and owns all
/// frame-persistent state: the frame counter, the jitter sequence, the guide
/// buffers and the denoiser's lifecycle.
pub struct FrameOrchestrator {
    settings: RenderSettings,
    flags: gpu::FrameFlags,
    buffers: FrameBuffers,
    passes: FramePasses,
    denoiser: Box<dyn Denoiser>,
    quality: QualityLevel,
    preset: DenoiserPreset,
    output_size: UVec2,
    render_size: UVec2,
    requested_render_size: Option<UVec2>,
    history: HistoryTracker,
    timeline: FrameTimeline,
    frame: u32,
    view: Mat4,
    proj: Mat4,
    prev_view_proj: Option<Mat4>,
    env_rotation: f32,
    env_intensity: Vec3,
}

impl FrameOrchestrator {
    pub(crate) fn new(
        engine: &Engine,
        device: &wgpu::Device,
        output_size: UVec2,
        quality: QualityLevel,
        preset: DenoiserPreset,
        mut denoiser: Box<dyn Denoiser>,
    ) -> Result<Self, Error> {
        if output_size.x == 0 || output_size.y == 0 {
            return Err(Error::UnsupportedOutputSize(output_size));
        }

        let sizes = denoiser.supported_input_sizes(output_size, quality);
        let render_size = resolve_render_size(&sizes, None);

        info!(
            "Creating frame orchestrator; render_size={render_size:?}, \
             output_size={output_size:?}, quality={quality:?}"
        );

        let buffers = FrameBuffers::new(device, render_size, output_size);
        let passes = FramePasses::new(engine, device, &buffers);

        denoiser.initialize(
            device,
            render_size,
            output_size,
            quality,
            preset,
        )?;

        let mut this = Self {
            settings: Default::default(),
            flags: gpu::FrameFlags {
                use_sky: true,
                use_psr: true,
                use_path_regularization: true,
            },
            buffers,
            passes,
            denoiser,
            quality,
            preset,
            output_size,
            render_size,
            requested_render_size: None,
            history: HistoryTracker::new(),
            timeline: FrameTimeline::new(),
            frame: 0,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            prev_view_proj: None,
            env_rotation: 0.0,
            env_intensity: Vec3::ONE,
        };

        this.bind_denoiser(device);

        Ok(this)
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn flags(&self) -> gpu::FrameFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: gpu::FrameFlags) {
        self.flags = flags;
    }

    pub fn set_camera(&mut self, view: Mat4, proj: Mat4) {
        self.view = view;
        self.proj = proj;
    }

    pub fn set_sky(&mut self, params: gpu::SkyParams) {
        *self.buffers.sky = params;
    }

    pub fn set_environment_transform(
        &mut self,
        rotation: f32,
        intensity: Vec3,
    ) {
        self.env_rotation = rotation;
        self.env_intensity = intensity;
    }

    pub fn render_size(&self) -> UVec2 {
        self.render_size
    }

    pub fn output_size(&self) -> UVec2 {
        self.output_size
    }

    /// The displayable LDR image the tonemap stage writes into.
    pub fn output(&self) -> &Texture {
        &self.buffers.ldr
    }

    /// Discards the denoiser's temporal history before the next frame; for
    /// scene or parameter changes the renderer can't observe on its own.
    pub fn reset_history(&mut self) {
        self.history.raise();
    }

    pub fn set_output_size(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
        output_size: UVec2,
    ) -> Result<(), Error> {
        if output_size == self.output_size {
            return Ok(());
        }

        if output_size.x == 0 || output_size.y == 0 {
            return Err(Error::UnsupportedOutputSize(output_size));
        }

        info!("Changing output size to {output_size:?}");

        self.output_size = output_size;
        self.reconfigure(engine, device)
    }

    /// Requests a specific render resolution; `None` returns to the
    /// denoiser's optimal size. Out-of-range requests are clamped, not
    /// rejected.
    pub fn set_render_size(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
        render_size: Option<UVec2>,
    ) -> Result<(), Error> {
        if render_size == self.requested_render_size {
            return Ok(());
        }

        info!("Changing render size to {render_size:?}");

        self.requested_render_size = render_size;
        self.reconfigure(engine, device)
    }

    /// Switches quality level and preset; re-queries the denoiser's
    /// supported input sizes and adopts the new optimum before the next
    /// frame's trace.
    pub fn set_quality(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
        quality: QualityLevel,
        preset: DenoiserPreset,
    ) -> Result<(), Error> {
        if quality == self.quality && preset == self.preset {
            return Ok(());
        }

        info!("Changing quality to {quality:?} (preset {preset:?})");

        self.quality = quality;
        self.preset = preset;
        self.reconfigure(engine, device)
    }

    /// The engine's environment texture was swapped out; the trace pass has
    /// to be rebuilt around the new image and temporal history is stale.
    pub fn on_environment_changed(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
    ) {
        self.passes = FramePasses::new(engine, device, &self.buffers);
        self.history.raise();
    }

    /// Tears down and recreates everything resolution-dependent.
    ///
    /// Waiting for device idle first is the coarse-grained safety boundary
    /// for destroying in-flight resources; none of this is a per-frame path.
    fn reconfigure(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
    ) -> Result<(), Error> {
        let sizes = self
            .denoiser
            .supported_input_sizes(self.output_size, self.quality);

        self.render_size =
            resolve_render_size(&sizes, self.requested_render_size);

        device.poll(wgpu::Maintain::Wait);

        self.buffers =
            FrameBuffers::new(device, self.render_size, self.output_size);

        self.passes = FramePasses::new(engine, device, &self.buffers);

        self.denoiser.initialize(
            device,
            self.render_size,
            self.output_size,
            self.quality,
            self.preset,
        )?;

        self.bind_denoiser(device);
        self.history.raise();

        Ok(())
    }

    fn bind_denoiser(&mut self, device: &wgpu::Device) {
        let bindings = [
            (GuideRole::Color, &self.buffers.color),
            (GuideRole::DiffuseAlbedo, &self.buffers.diffuse_albedo),
            (GuideRole::SpecularAlbedo, &self.buffers.specular_albedo),
            (
                GuideRole::SpecularHitDistance,
                &self.buffers.specular_hit_distance,
            ),
            (GuideRole::NormalRoughness, &self.buffers.normal_roughness),
            (GuideRole::Motion, &self.buffers.motion),
            (GuideRole::ViewZ, &self.buffers.view_z),
            (GuideRole::DenoisedOutput, &self.buffers.denoised),
        ];

        for (role, texture) in bindings {
            self.denoiser.bind(device, role, texture.create_view());
        }
    }

    /// Uploads this frame's constants; call once per frame, before
    /// [`Self::render()`].
    pub fn flush(&mut self, engine: &Engine, queue: &wgpu::Queue) {
        let mut info = gpu::FrameInfo {
            view: self.view,
            proj: self.proj,
            view_inv: self.view.inverse(),
            proj_inv: self.proj.inverse(),
            prev_view_proj: self
                .prev_view_proj
                .unwrap_or(self.proj * self.view),
            env_intensity: self.env_intensity.extend(0.0),
            screen: self
                .render_size
                .as_vec2()
                .extend(0.0)
                .extend(0.0),
            jitter: jitter(self.frame),
            env_rotation: self.env_rotation,
            frame: self.frame,
            light_count: engine.light_count(),
            ..Default::default()
        };

        info.set_flags(self.flags);

        *self.buffers.frame = info;

        self.buffers.frame.flush(queue);
        self.buffers.sky.flush(queue);
    }

    /// Encodes one frame: trace, denoise, tonemap.
    ///
    /// The stages land on a single queue in this order, each in its own
    /// pass, which is what makes the guide-buffer writes visible to the
    /// denoiser and the denoised output visible to the tonemap. A denoiser
    /// failure downgrades the frame to the raw upscale path and leaves the
    /// pending history-reset (if any) for the next attempt.
    pub fn render(&mut self, encoder: &mut wgpu::CommandEncoder) {
        self.timeline.advance(FrameStage::Tracing);

        self.passes.pathtrace.run(
            encoder,
            self.render_size,
            self.settings.serialize(self.frame),
        );

        self.timeline.advance(FrameStage::Denoising);

        let reset_history = self.history.peek();

        let denoised = self.denoiser.run(
            encoder,
            self.render_size,
            jitter(self.frame),
            self.view,
            self.proj,
            reset_history,
        );

        match denoised {
            Ok(()) => {
                self.history.take();
            }

            Err(err) => {
                warn!("Denoiser failed, presenting un-denoised frame: {err}");

                self.passes.upscale.run(
                    encoder,
                    self.output_size,
                    gpu::UpscalePassParams {
                        src_size: self.render_size,
                        dst_size: self.output_size,
                    },
                );
            }
        }

        self.timeline.advance(FrameStage::Tonemapping);

        self.passes.tonemap.run(
            encoder,
            self.output_size,
            gpu::TonemapPassParams {
                size: self.output_size,
                exposure: self.settings.exposure,
                ..Default::default()
            },
        );

        self.timeline.advance(FrameStage::Idle);

        self.prev_view_proj = Some(self.proj * self.view);
        self.frame += 1;
    }
}

/// Picks the render resolution: an explicit request is clamped into the
/// denoiser's supported range, no request means the denoiser's optimum.
fn resolve_render_size(
    sizes: &SupportedSizes,
    requested: Option<UVec2>,
) -> UVec2 {
    match requested {
        Some(size) => sizes.clamp(size),
        None => sizes.optimal,
    }
}
