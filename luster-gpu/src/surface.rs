use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::{Material, TriangleHit};

/// A shading point: a triangle hit with its material resolved.
///
/// `roughness` is the GGX alpha; the perceptual (square-rooted) value only
/// exists at the guide-buffer boundary.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Surface {
    pub point: Vec3,
    pub normal: Vec3,

    /// w - opacity
    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub reflectance: f32,
    pub emissive: Vec3,
}

impl Surface {
    pub fn resolve(hit: &TriangleHit, material: &Material) -> Self {
        Self {
            point: hit.offset_point(),
            normal: hit.normal,
            base_color: material.base_color,
            metallic: material.metallic,
            roughness: material.roughness,
            reflectance: material.reflectance,
            emissive: material.emissive.xyz(),
        }
    }

    /// Fresnel reflectance at normal incidence.
    pub fn f0(&self) -> Vec3 {
        0.16 * self.reflectance * self.reflectance * (1.0 - self.metallic)
            + self.base_color.xyz() * self.metallic
    }

    pub fn opacity(&self) -> f32 {
        self.base_color.w
    }

    /// GGX alpha clamped away from zero; evaluating the specular lobe at
    /// alpha zero divides by zero.
    pub fn clamped_roughness(&self) -> f32 {
        self.roughness.clamp(0.089 * 0.089, 1.0)
    }
}
