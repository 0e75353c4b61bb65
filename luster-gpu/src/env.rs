use core::f32::consts::PI;

use glam::{vec2, vec3, Vec2, Vec3};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;
use spirv_std::Sampler;

use crate::{Tex, Vec3Ext, WhiteNoise};

/// One environment-lighting sample: an incoming direction together with the
/// radiance arriving from it and the density it was (or would have been)
/// drawn with.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct EnvSample {
    pub dir: Vec3,
    pub radiance: Vec3,
    pub pdf: f32,
}

/// The environment-lighting contract consumed by the integrators.
///
/// `sample` and `eval` must agree: for any direction `sample` can return,
/// `eval` of that direction reports the same pdf - multiple importance
/// sampling breaks down otherwise.
pub trait EnvSampler {
    fn sample(&self, wnoise: &mut WhiteNoise) -> EnvSample;
    fn eval(&self, dir: Vec3) -> EnvSample;
}

/// Equirectangular HDR panorama with a precomputed importance table.
///
/// Table layout (see the host-side `EnvironmentMap` which builds it):
///
/// - `[0]` - width, `[1]` - height (as floats)
/// - `[2]` - total luminance (luminance * sin-theta summed over all texels)
/// - `[3]` - unused
/// - `height` entries of the marginal row CDF
/// - `height * width` entries of per-row conditional CDFs
pub struct MapEnv<'a> {
    tex: Tex<'a>,
    sampler: &'a Sampler,
    table: &'a [f32],
    rotation: f32,
    intensity: Vec3,
}

impl<'a> MapEnv<'a> {
    pub fn new(
        tex: Tex<'a>,
        sampler: &'a Sampler,
        table: &'a [f32],
        rotation: f32,
        intensity: Vec3,
    ) -> Self {
        Self {
            tex,
            sampler,
            table,
            rotation,
            intensity,
        }
    }

    fn size(&self) -> (usize, usize) {
        (self.table[0] as usize, self.table[1] as usize)
    }

    fn total_luminance(&self) -> f32 {
        self.table[2]
    }

    fn radiance_at(&self, uv: Vec2) -> Vec3 {
        use glam::Vec4Swizzles;

        self.tex.sample_by_lod(*self.sampler, uv, 0.0).xyz()
    }

    /// See the module docs of `env`: with the build-time sin-theta weighting,
    /// the solid-angle pdf reduces to `luma * w * h / (2 pi^2 * total)`.
    fn pdf_at(&self, radiance: Vec3) -> f32 {
        let (width, height) = self.size();
        let total = self.total_luminance();

        if total <= 0.0 {
            return 0.0;
        }

        radiance.luma() * (width as f32) * (height as f32)
            / (2.0 * PI * PI * total)
    }
}

impl EnvSampler for MapEnv<'_> {
    fn sample(&self, wnoise: &mut WhiteNoise) -> EnvSample {
        let (width, height) = self.size();

        if self.total_luminance() <= 0.0 {
            return EnvSample {
                dir: vec3(0.0, 1.0, 0.0),
                radiance: Vec3::ZERO,
                pdf: 0.0,
            };
        }

        let marginal = &self.table[4..4 + height];
        let row = search_cdf(marginal, wnoise.sample());

        let conditional =
            &self.table[4 + height + row * width..4 + height + (row + 1) * width];

        let col = search_cdf(conditional, wnoise.sample());

        let uv = vec2(
            (col as f32 + 0.5) / width as f32,
            (row as f32 + 0.5) / height as f32,
        );

        let radiance = self.radiance_at(uv);

        EnvSample {
            dir: equirect_to_dir(uv, self.rotation),
            radiance: radiance * self.intensity,
            pdf: self.pdf_at(radiance),
        }
    }

    fn eval(&self, dir: Vec3) -> EnvSample {
        let uv = dir_to_equirect(dir, self.rotation);
        let radiance = self.radiance_at(uv);

        EnvSample {
            dir,
            radiance: radiance * self.intensity,
            pdf: self.pdf_at(radiance),
        }
    }
}

/// Maps equirectangular uv to a (y-up) world direction.
pub fn equirect_to_dir(uv: Vec2, rotation: f32) -> Vec3 {
    let phi = uv.x * 2.0 * PI - rotation;
    let theta = uv.y * PI;

    vec3(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin())
}

/// See [`equirect_to_dir()`].
pub fn dir_to_equirect(dir: Vec3, rotation: f32) -> Vec2 {
    let phi = dir.z.atan2(dir.x) + rotation;
    let theta = dir.y.clamp(-1.0, 1.0).acos();

    let mut u = phi / (2.0 * PI);

    u -= u.floor();

    vec2(u, theta / PI)
}

/// Returns the first index whose cumulative value exceeds `xi`.
pub fn search_cdf(cdf: &[f32], xi: f32) -> usize {
    let mut lo = 0;
    let mut hi = cdf.len();

    while lo < hi {
        let mid = (lo + hi) / 2;

        if cdf[mid] > xi {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    lo.min(cdf.len() - 1)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn equirect_roundtrip() {
        for dir in [
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 0.0, 1.0),
            vec3(0.5, 0.5, -0.7).normalize(),
            vec3(-0.3, -0.9, 0.2).normalize(),
        ] {
            let back = equirect_to_dir(dir_to_equirect(dir, 0.4), 0.4);

            assert_relative_eq!(back.x, dir.x, epsilon = 0.001);
            assert_relative_eq!(back.y, dir.y, epsilon = 0.001);
            assert_relative_eq!(back.z, dir.z, epsilon = 0.001);
        }
    }

    #[test]
    fn poles_map_to_vertical_directions() {
        let up = equirect_to_dir(vec2(0.5, 0.0), 0.0);
        let down = equirect_to_dir(vec2(0.5, 1.0), 0.0);

        assert_relative_eq!(up.y, 1.0, epsilon = 0.001);
        assert_relative_eq!(down.y, -1.0, epsilon = 0.001);
    }

    #[test]
    fn cdf_search_picks_matching_bucket() {
        let cdf = [0.1, 0.3, 0.6, 1.0];

        assert_eq!(search_cdf(&cdf, 0.05), 0);
        assert_eq!(search_cdf(&cdf, 0.1), 1);
        assert_eq!(search_cdf(&cdf, 0.59), 2);
        assert_eq!(search_cdf(&cdf, 0.99), 3);
        assert_eq!(search_cdf(&cdf, 1.0), 3);
    }
}
