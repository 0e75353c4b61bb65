use glam::{vec4, Vec2, Vec3, Vec4, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    FrameInfo, IndirectOutput, PrimaryMiss, PrimarySurface, Vec3Ext,
    HIT_T_MISS,
};

/// One pixel's worth of guide-buffer values; the trace kernel computes this
/// record and scatters it into the individual images.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct GuideSample {
    /// Noisy HDR radiance; w carries opacity.
    pub color: Vec4,

    /// rgb - diffuse albedo (demodulation signal), w - metallic.
    pub diffuse_albedo: Vec4,

    /// Pre-integrated environment specular term.
    pub specular_albedo: Vec4,

    /// Distance to the detail seen in the specular lobe; zero when unknown.
    pub specular_hit_distance: f32,

    /// xyz - world-space normal, w - perceptual (square-rooted) roughness.
    pub normal_roughness: Vec4,

    /// Screen-space offset to the same surface point's prior-frame pixel.
    pub motion: Vec2,

    /// Linear view depth; `HIT_T_MISS` when the pixel sees the environment.
    pub view_z: f32,
}

impl GuideSample {
    /// Guide values for a pixel that escaped to the environment, either
    /// directly or through a mirror chain.
    pub fn sky(frame: &FrameInfo, miss: &PrimaryMiss, camera_dir: Vec3) -> Self {
        let motion = if miss.bounces == 0 {
            // Point at infinity along the view ray
            frame.prev_screen_dir(camera_dir) - frame.screen_dir(camera_dir)
        } else {
            // Seen through mirrors: reproject the virtual hit position, so
            // the reflected sky image moves with the mirror rather than with
            // the camera alone
            let virtual_pos = frame.eye() + camera_dir * miss.hit_t;

            frame.prev_screen_pos(virtual_pos) - frame.screen_pos(virtual_pos)
        };

        Self {
            color: miss.radiance.extend(1.0),
            // The reconstruction stage demodulates by this value; a bounded,
            // tone-compressed stand-in keeps it from treating raw sky HDR as
            // noise
            diffuse_albedo: tone_compress(miss.radiance).extend(1.0),
            specular_albedo: Vec4::ZERO,
            specular_hit_distance: 0.0,
            normal_roughness: Vec4::ZERO,
            motion,
            view_z: HIT_T_MISS,
        }
    }

    /// Guide values for a resolved primary surface.
    pub fn surface(
        frame: &FrameInfo,
        primary: &PrimarySurface,
        camera_dir: Vec3,
        color: Vec4,
        indirect: &IndirectOutput,
    ) -> Self {
        // All positional guides are computed from the virtual position along
        // the original camera ray: through a mirror the viewer perceives the
        // reflected surface *behind* the mirror, and depth and motion have
        // to match that percept
        let virtual_pos = frame.eye() + camera_dir * primary.hit_t;

        let normal =
            (primary.mirror_xform * primary.surface.normal).normalize();

        Self {
            color,
            diffuse_albedo: (primary.surface.base_color.xyz()
                * primary.throughput)
                .extend(primary.surface.metallic),
            specular_albedo: (indirect.specular_albedo * primary.throughput)
                .extend(1.0),
            specular_hit_distance: indirect.specular_hit_distance,
            normal_roughness: normal
                .extend(primary.surface.roughness.max(0.0).sqrt()),
            motion: frame.prev_screen_pos(virtual_pos)
                - frame.screen_pos(virtual_pos),
            view_z: frame.view_z(virtual_pos),
        }
    }

    /// Debug output for the "mirror produced a non-glossy sample" error
    /// condition; visibly wrong on screen, harmless to the frame.
    pub fn invalid() -> Self {
        Self {
            color: vec4(1.0, 0.0, 1.0, 1.0),
            diffuse_albedo: vec4(1.0, 0.0, 1.0, 1.0),
            specular_albedo: Vec4::ZERO,
            specular_hit_distance: 0.0,
            normal_roughness: Vec4::ZERO,
            motion: Vec2::ZERO,
            view_z: HIT_T_MISS,
        }
    }
}

/// Reinhard-style compression by luminance; maps unbounded HDR radiance into
/// `[0, 1)` while keeping chroma.
pub fn tone_compress(radiance: Vec3) -> Vec3 {
    radiance / (1.0 + radiance.luma())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, vec4, Mat4};

    use super::*;

    fn frame() -> FrameInfo {
        let view = Mat4::look_at_rh(
            vec3(0.0, 0.0, 5.0),
            Vec3::ZERO,
            vec3(0.0, 1.0, 0.0),
        );

        let proj =
            Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);

        FrameInfo {
            view,
            proj,
            view_inv: view.inverse(),
            proj_inv: proj.inverse(),
            prev_view_proj: proj * view,
            screen: vec4(64.0, 64.0, 0.0, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn sky_guides_use_the_miss_sentinel_and_bounded_albedo() {
        let miss = PrimaryMiss {
            radiance: vec3(500.0, 400.0, 300.0),
            hit_t: 0.0,
            bounces: 0,
        };

        let guides =
            GuideSample::sky(&frame(), &miss, vec3(0.0, 0.0, -1.0));

        assert_eq!(guides.view_z, HIT_T_MISS);

        for channel in [
            guides.diffuse_albedo.x,
            guides.diffuse_albedo.y,
            guides.diffuse_albedo.z,
        ] {
            assert!(channel >= 0.0);
            assert!(channel < 1.0);
        }

        // The raw radiance still flows through the color channel untouched
        assert_eq!(guides.color.x, 500.0);
    }

    #[test]
    fn static_sky_pixel_has_no_motion() {
        let miss = PrimaryMiss {
            radiance: Vec3::ONE,
            hit_t: 0.0,
            bounces: 0,
        };

        let guides =
            GuideSample::sky(&frame(), &miss, vec3(0.1, 0.2, -1.0).normalize());

        assert_relative_eq!(guides.motion.x, 0.0, epsilon = 0.001);
        assert_relative_eq!(guides.motion.y, 0.0, epsilon = 0.001);
    }

    #[test]
    fn tone_compression_is_bounded_and_monotonic() {
        let lo = tone_compress(vec3(1.0, 1.0, 1.0));
        let hi = tone_compress(vec3(1000.0, 1000.0, 1000.0));

        assert!(lo.x < hi.x);
        assert!(hi.x < 1.001);
        assert!(lo.x >= 0.0);
    }
}
