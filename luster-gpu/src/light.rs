use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{DiffuseBrdf, F32Ext, SpecularBrdf, Surface};

/// Analytic point light.
///
/// An extension point: the reference configuration runs with zero of these
/// and lights the scene from the environment alone.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Light {
    /// xyz - position, w - radius
    pub d0: Vec4,

    /// xyz - radiant intensity, w - unused
    pub d1: Vec4,
}

impl Light {
    pub fn point(position: Vec3, intensity: Vec3) -> Self {
        Self {
            d0: position.extend(0.0),
            d1: intensity.extend(0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.d0.xyz()
    }

    pub fn intensity(&self) -> Vec3 {
        self.d1.xyz()
    }

    /// Unoccluded contribution of this light at given shading point; the
    /// caller is responsible for the visibility test.
    pub fn contribution(&self, surface: &Surface, v: Vec3) -> Vec3 {
        let to_light = self.center() - surface.point;
        let distance_sq = to_light.length_squared().max(0.0001);
        let l = to_light * distance_sq.inverse_sqrt();
        let n_o_l = surface.normal.dot(l).saturate();

        if n_o_l <= 0.0 {
            return Vec3::ZERO;
        }

        let brdf = DiffuseBrdf::new(surface).eval(l, v)
            + SpecularBrdf::new(surface).eval(l, v);

        brdf * n_o_l * self.intensity() / distance_sq
    }
}

#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct LightId(u32);

impl LightId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy)]
pub struct LightsView<'a> {
    items: &'a [Light],
}

impl<'a> LightsView<'a> {
    pub fn new(items: &'a [Light]) -> Self {
        Self { items }
    }

    pub fn get(&self, id: LightId) -> Light {
        self.items[id.get() as usize]
    }
}
