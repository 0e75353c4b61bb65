use bytemuck::{Pod, Zeroable};
use glam::{vec2, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{Ray, TriangleHit};

/// Triangle with interpolated attributes, as supplied by the scene provider.
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Triangle {
    /// xyz - vertex position, w - vertex uv.x
    pub p0: Vec4,
    pub p1: Vec4,
    pub p2: Vec4,

    /// xyz - vertex normal, w - vertex uv.y
    pub n0: Vec4,
    pub n1: Vec4,
    pub n2: Vec4,
}

impl Triangle {
    pub fn new(
        positions: [Vec3; 3],
        normals: [Vec3; 3],
        uvs: [Vec2; 3],
    ) -> Self {
        Self {
            p0: positions[0].extend(uvs[0].x),
            p1: positions[1].extend(uvs[1].x),
            p2: positions[2].extend(uvs[2].x),
            n0: normals[0].extend(uvs[0].y),
            n1: normals[1].extend(uvs[1].y),
            n2: normals[2].extend(uvs[2].y),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.p0.xyz() + self.p1.xyz() + self.p2.xyz()) / 3.0
    }

    /// Möller-Trumbore; updates `hit` when this triangle lies closer than
    /// whatever `hit` already stores.
    pub fn hit(&self, ray: Ray, hit: &mut TriangleHit) -> bool {
        let v0v1 = self.p1.xyz() - self.p0.xyz();
        let v0v2 = self.p2.xyz() - self.p0.xyz();

        let pvec = ray.dir().cross(v0v2);
        let det = v0v1.dot(pvec);

        if det.abs() < f32::EPSILON {
            return false;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - self.p0.xyz();
        let u = tvec.dot(pvec) * inv_det;
        let qvec = tvec.cross(v0v1);
        let v = ray.dir().dot(qvec) * inv_det;
        let distance = v0v2.dot(qvec) * inv_det;

        if (u < 0.0)
            | (u > 1.0)
            | (v < 0.0)
            | (u + v > 1.0)
            | (distance <= 0.0)
            | (distance >= hit.distance)
        {
            return false;
        }

        let normal = ((1.0 - u - v) * self.n0.xyz()
            + u * self.n1.xyz()
            + v * self.n2.xyz())
        .normalize();

        let uv0 = vec2(self.p0.w, self.n0.w);
        let uv1 = vec2(self.p1.w, self.n1.w);
        let uv2 = vec2(self.p2.w, self.n2.w);

        hit.distance = distance;
        hit.point = ray.origin() + ray.dir() * distance;
        hit.normal = normal;
        hit.uv = uv0 + (uv1 - uv0) * u + (uv2 - uv0) * v;

        true
    }
}

#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct TriangleId(u32);

impl TriangleId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}
