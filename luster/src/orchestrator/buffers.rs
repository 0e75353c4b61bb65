use glam::UVec2;
use log::debug;

use crate::{gpu, MappedUniformBuffer, Texture};

/// Everything the per-frame kernels read and write: the frame constants and
/// the guide-buffer set at render resolution, plus the denoised and
/// displayable images at output resolution.
///
/// Replaced wholesale whenever either resolution changes; the individual
/// images are never partially reallocated.
#[derive(Debug)]
pub struct FrameBuffers {
    pub frame: MappedUniformBuffer<gpu::FrameInfo>,
    pub sky: MappedUniformBuffer<gpu::SkyParams>,

    pub color: Texture,
    pub diffuse_albedo: Texture,
    pub specular_albedo: Texture,
    pub specular_hit_distance: Texture,
    pub normal_roughness: Texture,
    pub motion: Texture,
    pub view_z: Texture,

    pub denoised: Texture,
    pub ldr: Texture,
}

impl FrameBuffers {
    pub fn new(
        device: &wgpu::Device,
        render_size: UVec2,
        output_size: UVec2,
    ) -> Self {
        debug!(
            "Initializing frame buffers; render_size={render_size:?}, \
             output_size={output_size:?}"
        );

        let frame = MappedUniformBuffer::new_default(device, "luster_frame");
        let sky = MappedUniformBuffer::new_default(device, "luster_sky");

        let color = Texture::new(
            device,
            "luster_color",
            render_size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let diffuse_albedo = Texture::new(
            device,
            "luster_diffuse_albedo",
            render_size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let specular_albedo = Texture::new(
            device,
            "luster_specular_albedo",
            render_size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let specular_hit_distance = Texture::new(
            device,
            "luster_specular_hit_distance",
            render_size,
            wgpu::TextureFormat::R32Float,
        );

        let normal_roughness = Texture::new(
            device,
            "luster_normal_roughness",
            render_size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let motion = Texture::new(
            device,
            "luster_motion",
            render_size,
            wgpu::TextureFormat::Rg32Float,
        );

        let view_z = Texture::new(
            device,
            "luster_view_z",
            render_size,
            wgpu::TextureFormat::R32Float,
        );

        let denoised = Texture::new(
            device,
            "luster_denoised",
            output_size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let ldr = Texture::new(
            device,
            "luster_ldr",
            output_size,
            wgpu::TextureFormat::Rgba8Unorm,
        );

        Self {
            frame,
            sky,
            color,
            diffuse_albedo,
            specular_albedo,
            specular_hit_distance,
            normal_roughness,
            motion,
            view_z,
            denoised,
            ldr,
        }
    }
}
