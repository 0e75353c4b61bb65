use bytemuck::{Pod, Zeroable};
use glam::{IVec2, UVec2};

/// Push-constant block of the path-tracing kernel; the wire form of the
/// host's `RenderSettings`, serialized once per frame.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct TracePassParams {
    pub seed: u32,
    pub frame: u32,

    /// Maximum number of indirect bounces; at least one.
    pub max_depth: u32,

    /// Firefly clamp applied to per-vertex path contributions.
    pub max_luminance: f32,

    /// Negative means "no override".
    pub override_roughness: f32,
    pub override_metallic: f32,

    /// Forwarded to the scene provider's tangent-frame resolution.
    pub bitangent_flip: f32,
    pub _pad0: f32,

    /// Cursor position, forwarded to the picking collaborator.
    pub mouse_coord: IVec2,
    pub _pad1: u32,
    pub _pad2: u32,
}

impl TracePassParams {
    pub fn override_roughness(&self) -> Option<f32> {
        (self.override_roughness >= 0.0).then_some(self.override_roughness)
    }

    pub fn override_metallic(&self) -> Option<f32> {
        (self.override_metallic >= 0.0).then_some(self.override_metallic)
    }
}

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct TonemapPassParams {
    pub size: UVec2,
    pub exposure: f32,
    pub _pad0: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct UpscalePassParams {
    pub src_size: UVec2,
    pub dst_size: UVec2,
}
