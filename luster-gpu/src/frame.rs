use bytemuck::{Pod, Zeroable};
use glam::{vec2, vec3, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::Ray;

/// Per-frame constants; owned and written by the frame orchestrator, read-only
/// to every kernel for the duration of a frame.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct FrameInfo {
    pub view: Mat4,
    pub proj: Mat4,
    pub view_inv: Mat4,
    pub proj_inv: Mat4,
    pub prev_view_proj: Mat4,
    pub env_intensity: Vec4,

    /// x, y - render resolution, in pixels
    /// z, w - unused
    pub screen: Vec4,

    pub jitter: Vec2,
    pub env_rotation: f32,
    flags: u32,

    pub frame: u32,
    pub light_count: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

impl FrameInfo {
    pub fn flags(&self) -> FrameFlags {
        FrameFlags::from_bits(self.flags)
    }

    pub fn set_flags(&mut self, flags: FrameFlags) {
        self.flags = flags.to_bits();
    }

    pub fn eye(&self) -> Vec3 {
        self.view_inv.transform_point3(Vec3::ZERO)
    }

    pub fn render_size(&self) -> UVec2 {
        self.screen.xy().as_uvec2()
    }

    pub fn contains(&self, pos: UVec2) -> bool {
        pos.x < self.render_size().x && pos.y < self.render_size().y
    }

    /// Casts the camera ray through given pixel, offset by this frame's
    /// sub-pixel jitter.
    pub fn ray(&self, screen_pos: UVec2) -> Ray {
        let px = screen_pos.as_vec2() + 0.5 + self.jitter;
        let ndc = px * 2.0 / self.screen.xy() - Vec2::ONE;
        let ndc = vec2(ndc.x, -ndc.y);

        let near = self.ndc_to_world(ndc.extend(0.0));
        let far = self.ndc_to_world(ndc.extend(1.0));

        Ray::new(near, (far - near).normalize())
    }

    /// Given a point in world-coordinates, returns it in (un-jittered)
    /// screen-coordinates of the current frame.
    pub fn screen_pos(&self, pos: Vec3) -> Vec2 {
        self.clip_to_screen(self.proj * self.view * pos.extend(1.0))
    }

    /// Given a point in world-coordinates, returns it in screen-coordinates of
    /// the previous frame.
    pub fn prev_screen_pos(&self, pos: Vec3) -> Vec2 {
        self.clip_to_screen(self.prev_view_proj * pos.extend(1.0))
    }

    /// Projects a direction as a point at infinity onto the current frame's
    /// screen.
    pub fn screen_dir(&self, dir: Vec3) -> Vec2 {
        self.clip_to_screen(self.proj * self.view * dir.extend(0.0))
    }

    /// Projects a direction as a point at infinity onto the previous frame's
    /// screen.
    pub fn prev_screen_dir(&self, dir: Vec3) -> Vec2 {
        self.clip_to_screen(self.prev_view_proj * dir.extend(0.0))
    }

    /// Returns linear view-space depth of given world-space point.
    pub fn view_z(&self, pos: Vec3) -> f32 {
        -self.view.transform_point3(pos).z
    }

    fn ndc_to_world(&self, pos: Vec3) -> Vec3 {
        (self.view_inv * self.proj_inv).project_point3(pos)
    }

    fn clip_to_screen(&self, pos: Vec4) -> Vec2 {
        let ndc = pos.xy() / pos.w;
        let ndc = vec2(ndc.x, -ndc.y);

        (0.5 * ndc + 0.5) * self.screen.xy()
    }
}

/// Per-frame feature toggles.
///
/// Carried across the host/shader boundary as a bitfield, but handled
/// everywhere else as this record of named booleans.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct FrameFlags {
    /// Shade environment misses from the analytic sky instead of the panorama.
    pub use_sky: bool,

    /// Follow mirror-like surfaces to their primary surface replacement.
    pub use_psr: bool,

    /// Propagate the maximum roughness seen along indirect paths.
    pub use_path_regularization: bool,
}

impl FrameFlags {
    const USE_SKY: u32 = 1;
    const USE_PSR: u32 = 1 << 1;
    const USE_PATH_REGULARIZATION: u32 = 1 << 2;

    pub fn from_bits(bits: u32) -> Self {
        Self {
            use_sky: bits & Self::USE_SKY != 0,
            use_psr: bits & Self::USE_PSR != 0,
            use_path_regularization: bits & Self::USE_PATH_REGULARIZATION != 0,
        }
    }

    pub fn to_bits(self) -> u32 {
        let mut bits = 0;

        if self.use_sky {
            bits |= Self::USE_SKY;
        }

        if self.use_psr {
            bits |= Self::USE_PSR;
        }

        if self.use_path_regularization {
            bits |= Self::USE_PATH_REGULARIZATION;
        }

        bits
    }
}
