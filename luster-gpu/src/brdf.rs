use core::f32::consts::PI;

use glam::{vec3, Vec3, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{F32Ext, Surface, Vec3Ext, WhiteNoise, EPSILON};

/// What kind of scattering a BSDF sample stands for; `Absorbed` means the
/// path carries no further contribution and must terminate.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub enum ScatterEvent {
    Diffuse,
    Glossy,
    Absorbed,
}

/// One importance-sampled scattering direction.
///
/// `weight` is the whole `bsdf * cos / pdf` term, computed here so that
/// callers never divide by a near-zero pdf themselves; `pdf` is kept around
/// for multiple-importance-sampling against the environment.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct BrdfSample {
    pub dir: Vec3,
    pub weight: Vec3,
    pub pdf: f32,
    pub event: ScatterEvent,
}

impl BrdfSample {
    pub fn absorbed() -> Self {
        Self {
            dir: Vec3::ZERO,
            weight: Vec3::ZERO,
            pdf: 0.0,
            event: ScatterEvent::Absorbed,
        }
    }

    pub fn is_absorbed(&self) -> bool {
        matches!(self.event, ScatterEvent::Absorbed)
    }
}

#[derive(Clone, Copy)]
pub struct DiffuseBrdf<'a> {
    surface: &'a Surface,
}

impl<'a> DiffuseBrdf<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        Self { surface }
    }

    pub fn eval(self, l: Vec3, v: Vec3) -> Vec3 {
        let n = self.surface.normal;
        let h = (l + v).normalize();
        let n_o_v = n.dot(v).max(0.0001);
        let n_o_l = l.dot(n).saturate();
        let l_o_h = l.dot(h).saturate();

        self.surface.base_color.xyz()
            * fd_burley(self.surface.clamped_roughness(), n_o_v, n_o_l, l_o_h)
            * (1.0 - self.surface.metallic)
    }

    pub fn pdf(self, l: Vec3) -> f32 {
        self.surface.normal.dot(l).max(0.0) / PI
    }

    pub fn sample(self, wnoise: &mut WhiteNoise) -> Vec3 {
        wnoise.sample_hemisphere(self.surface.normal)
    }
}

#[derive(Clone, Copy)]
pub struct SpecularBrdf<'a> {
    surface: &'a Surface,
}

impl<'a> SpecularBrdf<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        Self { surface }
    }

    pub fn eval(self, l: Vec3, v: Vec3) -> Vec3 {
        let n = self.surface.normal;
        let h = (l + v).normalize();
        let n_o_v = n.dot(v).saturate().max(0.0001);
        let n_o_l = n.dot(l).saturate();
        let n_o_h = n.dot(h).saturate();
        let l_o_h = l.dot(h).saturate();
        let roughness = self.surface.clamped_roughness();

        let d = d_ggx(roughness, n_o_h);
        let vis = v_smith_ggx_correlated(roughness, n_o_v, n_o_l);
        let f = fresnel(self.surface.f0(), l_o_h);

        d * vis * f
    }

    /// Probability density of the visible-normal sampling below, per solid
    /// angle of the outgoing direction.
    pub fn pdf(self, l: Vec3, v: Vec3) -> f32 {
        let n = self.surface.normal;
        let h = (l + v).normalize();
        let n_o_v = n.dot(v).saturate().max(0.0001);
        let n_o_h = n.dot(h).saturate();
        let roughness = self.surface.clamped_roughness();

        let d = d_ggx(roughness, n_o_h);
        let g1 = g1_smith_ggx(roughness, n_o_v);

        d * g1 / (4.0 * n_o_v)
    }

    /// Samples the GGX distribution of visible normals (Heitz 2018) and
    /// reflects `v` around the sampled micro-normal.
    pub fn sample(self, wnoise: &mut WhiteNoise, v: Vec3) -> Vec3 {
        fn to_world(x: Vec3, y: Vec3, z: Vec3, v: Vec3) -> Vec3 {
            v.x * x + v.y * y + v.z * z
        }

        fn to_local(x: Vec3, y: Vec3, z: Vec3, v: Vec3) -> Vec3 {
            vec3(v.dot(x), v.dot(y), v.dot(z))
        }

        fn ggx(v_local: Vec3, roughness: f32, s1: f32, s2: f32) -> Vec3 {
            let v_h =
                vec3(roughness * v_local.x, roughness * v_local.y, v_local.z)
                    .normalize();

            let len = v_h.x * v_h.x + v_h.y * v_h.y;

            let tt1 = if len > 0.0 {
                vec3(-v_h.y, v_h.x, 0.0) * (1.0 / len.sqrt())
            } else {
                vec3(1.0, 0.0, 0.0)
            };

            let tt2 = v_h.cross(tt1);

            let r = s1.sqrt();
            let phi = 2.0 * PI * s2;
            let t1 = r * phi.cos();
            let t2 = r * phi.sin();
            let s = 0.5 * (1.0 + v_h.z);
            let t2 = (1.0 - s) * (1.0 - t1 * t1).sqrt() + s * t2;

            let n_h = t1 * tt1
                + t2 * tt2
                + 0.0f32.max(1.0 - t1 * t1 - t2 * t2).sqrt() * v_h;

            vec3(roughness * n_h.x, roughness * n_h.y, 0.0f32.max(n_h.z))
                .normalize()
        }

        let n = self.surface.normal;
        let (t, b) = n.any_orthonormal_pair();
        let v_local = to_local(t, b, n, v);

        let mut h = ggx(
            v_local,
            self.surface.roughness,
            wnoise.sample(),
            wnoise.sample(),
        );

        if h.z < 0.0 {
            h = -h;
        }

        let h = to_world(t, b, n, h);

        (-v).reflect(h)
    }
}

/// Diffuse and specular lobes stacked, with lobe selection folded into the
/// sampling pdf.
#[derive(Clone, Copy)]
pub struct LayeredBrdf<'a> {
    surface: &'a Surface,
}

impl<'a> LayeredBrdf<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        Self { surface }
    }

    fn specular_probability(self) -> f32 {
        if self.surface.metallic >= 1.0 {
            1.0
        } else {
            0.5
        }
    }

    pub fn eval(self, l: Vec3, v: Vec3) -> Vec3 {
        DiffuseBrdf::new(self.surface).eval(l, v)
            + SpecularBrdf::new(self.surface).eval(l, v)
    }

    pub fn pdf(self, l: Vec3, v: Vec3) -> f32 {
        let spec_prob = self.specular_probability();

        spec_prob * SpecularBrdf::new(self.surface).pdf(l, v)
            + (1.0 - spec_prob) * DiffuseBrdf::new(self.surface).pdf(l)
    }

    pub fn sample(self, wnoise: &mut WhiteNoise, v: Vec3) -> BrdfSample {
        let n = self.surface.normal;

        if n.dot(v) <= 0.0 {
            return BrdfSample::absorbed();
        }

        let spec_prob = self.specular_probability();

        let (dir, event) = if wnoise.sample() < spec_prob {
            (
                SpecularBrdf::new(self.surface).sample(wnoise, v),
                ScatterEvent::Glossy,
            )
        } else {
            (
                DiffuseBrdf::new(self.surface).sample(wnoise),
                ScatterEvent::Diffuse,
            )
        };

        let n_o_l = n.dot(dir);

        if n_o_l <= 0.0 {
            return BrdfSample::absorbed();
        }

        let pdf = self.pdf(dir, v);

        if pdf < EPSILON {
            return BrdfSample::absorbed();
        }

        BrdfSample {
            dir,
            weight: self.eval(dir, v) * n_o_l / pdf,
            pdf,
            event,
        }
    }
}

/// Power heuristic, `pdf_a^2 / (pdf_a^2 + pdf_b^2)`; weights the estimator
/// that sampled from `pdf_a` against a competing strategy `pdf_b`.
pub fn mis_power_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    let a = pdf_a.sqr();
    let b = pdf_b.sqr();

    if a + b <= 0.0 {
        0.0
    } else {
        a / (a + b)
    }
}

fn fd_burley(roughness: f32, n_o_v: f32, n_o_l: f32, l_o_h: f32) -> f32 {
    let f90 = 0.5 + 2.0 * roughness * l_o_h * l_o_h;
    let light_scatter = f_schlick(1.0, f90, n_o_l);
    let view_scatter = f_schlick(1.0, f90, n_o_v);

    light_scatter * view_scatter * (1.0 / PI)
}

fn d_ggx(roughness: f32, n_o_h: f32) -> f32 {
    let one_minus_noh_squared = 1.0 - n_o_h * n_o_h;
    let a = n_o_h * roughness;
    let k = roughness / (one_minus_noh_squared + a * a);

    k * k * (1.0 / PI)
}

fn v_smith_ggx_correlated(roughness: f32, n_o_v: f32, n_o_l: f32) -> f32 {
    let a2 = roughness * roughness;
    let lambda_v = n_o_l * ((n_o_v - a2 * n_o_v) * n_o_v + a2).sqrt();
    let lambda_l = n_o_v * ((n_o_l - a2 * n_o_l) * n_o_l + a2).sqrt();

    0.5 / (lambda_v + lambda_l).max(EPSILON)
}

fn g1_smith_ggx(roughness: f32, n_o_v: f32) -> f32 {
    let a2 = roughness * roughness;

    2.0 * n_o_v / (n_o_v + (a2 + (1.0 - a2) * n_o_v * n_o_v).sqrt())
}

fn fresnel(f0: Vec3, l_o_h: f32) -> Vec3 {
    let f90 = f0.dot(Vec3::splat(50.0 * 0.33)).saturate();

    f_schlick_vec(f0, f90, l_o_h)
}

fn f_schlick(f0: f32, f90: f32, v_o_h: f32) -> f32 {
    f0 + (f90 - f0) * (1.0 - v_o_h).max(0.001).powf(5.0)
}

fn f_schlick_vec(f0: Vec3, f90: f32, v_o_h: f32) -> Vec3 {
    f0 + (f90 - f0) * (1.0 - v_o_h).max(0.001).powf(5.0)
}
