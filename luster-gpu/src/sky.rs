use core::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::{vec4, Vec3, Vec4, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{EnvSample, EnvSampler, F32Ext, WhiteNoise};

/// Analytic sky-dome parameters; a lightweight stand-in for a full physical
/// sky model, good enough for interactive lighting and fully evaluable on
/// the CPU.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct SkyParams {
    /// xyz - direction towards the sun, w - cosine of the sun's angular
    /// radius
    pub sun_dir: Vec4,
    pub sun_color: Vec4,
    pub zenith_color: Vec4,
    pub horizon_color: Vec4,
    pub ground_color: Vec4,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            sun_dir: vec4(0.0, 0.866, -0.5, 0.9999),
            sun_color: vec4(80.0, 72.0, 60.0, 0.0),
            zenith_color: vec4(0.25, 0.45, 0.9, 0.0),
            horizon_color: vec4(0.7, 0.75, 0.8, 0.0),
            ground_color: vec4(0.25, 0.22, 0.2, 0.0),
        }
    }
}

impl SkyParams {
    /// A constant-radiance dome; used by the convergence tests, where the
    /// expected response has a closed form.
    pub fn uniform(radiance: Vec3) -> Self {
        Self {
            sun_dir: vec4(0.0, 1.0, 0.0, 1.0),
            sun_color: Vec4::ZERO,
            zenith_color: radiance.extend(0.0),
            horizon_color: radiance.extend(0.0),
            ground_color: radiance.extend(0.0),
        }
    }
}

pub struct SkyEnv<'a> {
    params: &'a SkyParams,
    intensity: Vec3,
}

impl<'a> SkyEnv<'a> {
    /// Share of samples pointed into the sun's cone.
    const SUN_PROB: f32 = 0.25;

    pub fn new(params: &'a SkyParams, intensity: Vec3) -> Self {
        Self { params, intensity }
    }

    fn radiance(&self, dir: Vec3) -> Vec3 {
        let params = self.params;

        let mut radiance = if dir.y >= 0.0 {
            params
                .horizon_color
                .xyz()
                .lerp(params.zenith_color.xyz(), dir.y.saturate())
        } else {
            params.ground_color.xyz()
        };

        if dir.dot(params.sun_dir.xyz()) >= params.sun_dir.w {
            radiance += params.sun_color.xyz();
        }

        radiance * self.intensity
    }

    fn pdf(&self, dir: Vec3) -> f32 {
        let params = self.params;
        let sun_cos = params.sun_dir.w;

        let cone_pdf = if dir.dot(params.sun_dir.xyz()) >= sun_cos {
            1.0 / (2.0 * PI * (1.0 - sun_cos).max(crate::EPSILON))
        } else {
            0.0
        };

        (1.0 - Self::SUN_PROB) / (4.0 * PI) + Self::SUN_PROB * cone_pdf
    }
}

impl EnvSampler for SkyEnv<'_> {
    fn sample(&self, wnoise: &mut WhiteNoise) -> EnvSample {
        let params = self.params;

        let dir = if wnoise.sample() < Self::SUN_PROB {
            wnoise.sample_cone(params.sun_dir.xyz(), params.sun_dir.w)
        } else {
            wnoise.sample_sphere()
        };

        EnvSample {
            dir,
            radiance: self.radiance(dir),
            pdf: self.pdf(dir),
        }
    }

    fn eval(&self, dir: Vec3) -> EnvSample {
        EnvSample {
            dir,
            radiance: self.radiance(dir),
            pdf: self.pdf(dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;
    use crate::frame_seed;

    #[test]
    fn sample_and_eval_agree_on_pdf() {
        let params = SkyParams::default();
        let sky = SkyEnv::new(&params, Vec3::ONE);
        let mut wnoise = WhiteNoise::new(frame_seed(11), uvec2(4, 2));

        for _ in 0..200 {
            let sample = sky.sample(&mut wnoise);
            let eval = sky.eval(sample.dir);

            assert_relative_eq!(sample.pdf, eval.pdf, epsilon = 0.0001);
            assert_relative_eq!(
                sample.radiance.x,
                eval.radiance.x,
                epsilon = 0.0001
            );
        }
    }

    #[test]
    fn pdf_integrates_to_one() {
        // A wide sun keeps the variance of this estimator manageable
        let params = SkyParams {
            sun_dir: vec4(0.0, 0.866, -0.5, 0.9),
            ..SkyParams::default()
        };

        let sky = SkyEnv::new(&params, Vec3::ONE);
        let mut wnoise = WhiteNoise::new(frame_seed(13), uvec2(1, 1));

        // Uniform-sphere estimator of the pdf's integral
        let mut sum = 0.0;
        let n = 200_000;

        for _ in 0..n {
            let dir = wnoise.sample_sphere();

            sum += sky.eval(dir).pdf * 4.0 * PI;
        }

        assert_relative_eq!(sum / n as f32, 1.0, epsilon = 0.05);
    }

    #[test]
    fn uniform_sky_is_uniform() {
        let params = SkyParams::uniform(vec3(2.0, 2.0, 2.0));
        let sky = SkyEnv::new(&params, Vec3::ONE);

        for dir in [
            vec3(0.0, 1.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, -1.0, 0.0),
        ] {
            assert_relative_eq!(sky.eval(dir).radiance.x, 2.0, epsilon = 1e-6);
        }
    }
}
