//! Luster is an interactive path-tracer: it renders a noisy, low-resolution
//! image together with the guide buffers (albedo, normal, motion, depth) a
//! reconstruction stage needs to denoise and upscale it, then tonemaps the
//! result for display.
//!
//! The GPU-side algorithm lives in `luster-gpu` (and is exercised on the CPU
//! by that crate's test-suite); this crate owns the device-facing half: the
//! engine's scene buffers, the per-frame kernel sequencing and the denoiser
//! adapter's lifecycle.

mod buffers;
mod denoiser;
mod environment;
mod error;
mod orchestrator;
mod settings;
mod shaders;

use std::mem;

use glam::{UVec2, Vec4};
use log::info;
pub use luster_gpu as gpu;

pub(crate) use self::buffers::*;
pub use self::buffers::Texture;
pub use self::denoiser::*;
pub use self::environment::*;
pub use self::error::*;
pub use self::orchestrator::*;
pub use self::settings::*;
pub use self::shaders::*;

/// Geometry budget, in bytes; the scene provider streams triangles and BVH
/// nodes into fixed-capacity buffers.
const TRIANGLES_BUF_SIZE: usize = 64 * 1024 * 1024;
const BVH_BUF_SIZE: usize = 128 * 1024 * 1024;
const MATERIALS_BUF_SIZE: usize = 1024 * 1024;
const LIGHTS_BUF_SIZE: usize = 64 * 1024;
const ENV_TABLE_BUF_SIZE: usize = 64 * 1024 * 1024;

/// Device-wide state: shader modules and the scene buffers every
/// orchestrator's trace pass reads.
pub struct Engine {
    pub(crate) shaders: Shaders,
    pub(crate) triangles: StorageBuffer<Vec<gpu::Triangle>>,
    pub(crate) bvh: StorageBuffer<Vec<Vec4>>,
    pub(crate) materials: StorageBuffer<Vec<gpu::Material>>,
    pub(crate) lights: StorageBuffer<Vec<gpu::Light>>,
    pub(crate) env_tex: Texture,
    pub(crate) env_table: StorageBuffer<Vec<f32>>,
    light_count: u32,
    env_size: UVec2,
}

impl Engine {
    /// Features the device must have been created with.
    pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::PUSH_CONSTANTS;

    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Self, Error> {
        info!("Initializing");

        if !device.features().contains(Self::REQUIRED_FEATURES) {
            return Err(Error::MissingFeatures(
                Self::REQUIRED_FEATURES - device.features(),
            ));
        }

        let required = mem::size_of::<gpu::TracePassParams>() as u32;
        let supported = device.limits().max_push_constant_size;

        if supported < required {
            return Err(Error::PushConstantLimit {
                required,
                supported,
            });
        }

        let shaders = Shaders::new(device);

        let triangles =
            StorageBuffer::new(device, "luster_triangles", TRIANGLES_BUF_SIZE);

        let bvh = StorageBuffer::new(device, "luster_bvh", BVH_BUF_SIZE);

        let materials =
            StorageBuffer::new(device, "luster_materials", MATERIALS_BUF_SIZE);

        let lights =
            StorageBuffer::new(device, "luster_lights", LIGHTS_BUF_SIZE);

        let env_table =
            StorageBuffer::new(device, "luster_env_table", ENV_TABLE_BUF_SIZE);

        let placeholder = EnvironmentMap::placeholder();

        let env_tex = Texture::new(
            device,
            "luster_env",
            placeholder.size(),
            wgpu::TextureFormat::Rgba32Float,
        );

        let mut this = Self {
            shaders,
            triangles,
            bvh,
            materials,
            lights,
            env_tex,
            env_table,
            light_count: 0,
            env_size: placeholder.size(),
        };

        this.write_environment(queue, &placeholder);

        Ok(this)
    }

    /// Uploads the scene's triangles and its serialized acceleration
    /// structure; both come from the scene provider as one consistent
    /// snapshot.
    pub fn write_geometry(
        &self,
        queue: &wgpu::Queue,
        triangles: &Vec<gpu::Triangle>,
        bvh: &Vec<Vec4>,
    ) {
        self.triangles.write(queue, triangles);
        self.bvh.write(queue, bvh);
    }

    pub fn write_materials(
        &self,
        queue: &wgpu::Queue,
        materials: &Vec<gpu::Material>,
    ) {
        self.materials.write(queue, materials);
    }

    pub fn write_lights(
        &mut self,
        queue: &wgpu::Queue,
        lights: &Vec<gpu::Light>,
    ) {
        self.lights.write(queue, lights);
        self.light_count = lights.len() as u32;
    }

    pub fn light_count(&self) -> u32 {
        self.light_count
    }

    /// Swaps in a new environment panorama; returns whether the texture had
    /// to be reallocated, in which case every orchestrator must be told via
    /// [`FrameOrchestrator::on_environment_changed()`].
    pub fn set_environment(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        map: &EnvironmentMap,
    ) -> bool {
        let reallocated = map.size() != self.env_size;

        if reallocated {
            info!("Reallocating environment texture; size={:?}", map.size());

            // The old texture may still be bound to in-flight work
            device.poll(wgpu::Maintain::Wait);

            self.env_tex = Texture::new(
                device,
                "luster_env",
                map.size(),
                wgpu::TextureFormat::Rgba32Float,
            );

            self.env_size = map.size();
        }

        self.write_environment(queue, map);

        reallocated
    }

    fn write_environment(&self, queue: &wgpu::Queue, map: &EnvironmentMap) {
        let size = map.size();

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: self.env_tex.tex(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(map.pixels()),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size.x * mem::size_of::<Vec4>() as u32),
                rows_per_image: Some(size.y),
            },
            wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
        );

        self.env_table.write(queue, &map.importance_table());
    }

    /// The built-in reference denoiser; a plain upscale of the noisy color,
    /// for configurations where no external reconstruction stage is wired
    /// up.
    pub fn create_passthrough_denoiser(
        &self,
        device: &wgpu::Device,
    ) -> Box<dyn Denoiser> {
        Box::new(PassthroughDenoiser::new(device, &self.shaders.upscale))
    }

    pub fn create_orchestrator(
        &self,
        device: &wgpu::Device,
        output_size: UVec2,
        quality: QualityLevel,
        preset: DenoiserPreset,
        denoiser: Box<dyn Denoiser>,
    ) -> Result<FrameOrchestrator, Error> {
        FrameOrchestrator::new(
            self, device, output_size, quality, preset, denoiser,
        )
    }
}
