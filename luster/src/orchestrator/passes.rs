use log::debug;

use crate::{gpu, ComputePass, Engine, FrameBuffers};

#[derive(Debug)]
pub struct FramePasses {
    pub pathtrace: ComputePass<gpu::TracePassParams>,
    pub tonemap: ComputePass<gpu::TonemapPassParams>,

    /// Fallback for frames the denoiser adapter rejects.
    pub upscale: ComputePass<gpu::UpscalePassParams>,
}

impl FramePasses {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        buffers: &FrameBuffers,
    ) -> Self {
        debug!("Initializing frame passes");

        let pathtrace = ComputePass::builder("pathtrace")
            .bind([
                &engine.triangles,
                &engine.bvh,
                &engine.materials,
                &engine.lights,
            ])
            .bind([
                &buffers.frame,
                &buffers.sky,
                &engine.env_tex.bind_sampled(),
                &engine.env_table,
            ])
            .bind([
                &buffers.color.bind_writable(),
                &buffers.diffuse_albedo.bind_writable(),
                &buffers.specular_albedo.bind_writable(),
                &buffers.specular_hit_distance.bind_writable(),
                &buffers.normal_roughness.bind_writable(),
                &buffers.motion.bind_writable(),
                &buffers.view_z.bind_writable(),
            ])
            .build(device, &engine.shaders.pathtrace);

        let tonemap = ComputePass::builder("tonemap")
            .bind([
                &buffers.denoised.bind_writable(),
                &buffers.ldr.bind_writable(),
            ])
            .build(device, &engine.shaders.tonemap);

        let upscale = ComputePass::builder("upscale")
            .bind([
                &buffers.color.bind_writable(),
                &buffers.denoised.bind_writable(),
            ])
            .build(device, &engine.shaders.upscale);

        Self {
            pathtrace,
            tonemap,
            upscale,
        }
    }
}
