use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::{TracePassParams, MIRROR_ROUGHNESS_EPS};

/// Flat material record, as resolved by the scene provider.
///
/// Texture lookups happen upstream, in the provider's own pipeline; the
/// integrator only ever sees constant-folded values.
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Material {
    /// w - opacity
    pub base_color: Vec4,
    pub emissive: Vec4,
    pub roughness: f32,
    pub metallic: f32,
    pub reflectance: f32,
    pub _pad0: f32,
}

impl Material {
    /// Returns whether the primary-surface finder should follow this surface
    /// as a mirror.
    pub fn is_mirror(&self) -> bool {
        self.roughness < MIRROR_ROUGHNESS_EPS && self.metallic == 1.0
    }

    /// Applies the per-frame debugging overrides.
    pub fn apply_overrides(&mut self, params: &TracePassParams) {
        if let Some(roughness) = params.override_roughness() {
            self.roughness = roughness;
        }

        if let Some(metallic) = params.override_metallic() {
            self.metallic = metallic;
        }
    }

    /// Clamps roughness from below; the indirect integrator feeds in the
    /// maximum roughness seen along the path, which stops low-roughness
    /// surfaces deep in a path from spraying fireflies.
    pub fn regularize(&mut self, min_roughness: f32) {
        self.roughness = self.roughness.max(min_roughness);
    }
}

#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct MaterialId(u32);

impl MaterialId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_classification() {
        let mut material = Material {
            roughness: 0.0,
            metallic: 1.0,
            ..Default::default()
        };

        assert!(material.is_mirror());

        material.roughness = 0.5;
        assert!(!material.is_mirror());

        material.roughness = 0.0;
        material.metallic = 0.99;
        assert!(!material.is_mirror());
    }

    #[test]
    fn regularization_only_raises_roughness() {
        let mut material = Material {
            roughness: 0.2,
            ..Default::default()
        };

        material.regularize(0.6);
        assert_eq!(material.roughness, 0.6);

        material.regularize(0.3);
        assert_eq!(material.roughness, 0.6);
    }
}
