use glam::{Vec2, Vec3};

use crate::MaterialId;

/// Raw intersection record returned by the scene provider's ray query.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct TriangleHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub material_id: MaterialId,
}

impl TriangleHit {
    /// How far to move a hit point away from its surface when spawning
    /// follow-up rays, to avoid self-intersection.
    pub const NUDGE: f32 = 0.001;

    pub fn none() -> Self {
        Self {
            distance: f32::MAX,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            uv: Vec2::ZERO,
            material_id: MaterialId::new(0),
        }
    }

    pub fn is_some(&self) -> bool {
        self.distance < f32::MAX
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Hit point nudged along the surface normal; origin for bounce and
    /// shadow rays.
    pub fn offset_point(&self) -> Vec3 {
        self.point + self.normal * Self::NUDGE
    }
}
