use glam::{Vec4, Vec4Swizzles};

use crate::{
    BvhView, Material, MaterialId, MaterialsView, Ray, Triangle, TriangleHit,
    TriangleId, TrianglesView, BVH_STACK_SIZE,
};

/// The scene provider's ray-query surface: geometry, acceleration structure
/// and materials, bundled so kernels can take them as one argument.
#[derive(Clone, Copy)]
pub struct SceneView<'a> {
    triangles: TrianglesView<'a>,
    bvh: BvhView<'a>,
    materials: MaterialsView<'a>,
}

impl<'a> SceneView<'a> {
    pub fn new(
        triangles: &'a [Triangle],
        bvh: &'a [Vec4],
        materials: &'a [Material],
    ) -> Self {
        Self {
            triangles: TrianglesView::new(triangles),
            bvh: BvhView::new(bvh),
            materials: MaterialsView::new(materials),
        }
    }

    pub fn material(&self, id: MaterialId) -> Material {
        self.materials.get(id)
    }

    /// Traces given ray and returns its nearest hit.
    pub fn trace_nearest(&self, ray: Ray) -> TriangleHit {
        let mut hit = TriangleHit::none();

        self.trace(ray, TracingMode::Nearest, &mut hit);

        hit
    }

    /// Traces given ray and returns whether it hits anything up to the given
    /// distance; stops at the first intersection found, since occlusion tests
    /// don't care about ordering.
    pub fn trace_any(&self, ray: Ray, max_distance: f32) -> bool {
        let mut hit = TriangleHit {
            distance: max_distance,
            ..TriangleHit::none()
        };

        self.trace(ray, TracingMode::Any, &mut hit);

        hit.distance < max_distance
    }

    fn trace(&self, ray: Ray, mode: TracingMode, hit: &mut TriangleHit) {
        let mut stack = [0u32; BVH_STACK_SIZE];
        let mut stack_ptr = 0;
        let mut bvh_ptr = 0;

        loop {
            let d0 = self.bvh.get(bvh_ptr);
            let is_internal_node = d0.w.to_bits() == 0;

            if is_internal_node {
                let d1 = self.bvh.get(bvh_ptr + 1);
                let d2 = self.bvh.get(bvh_ptr + 2);
                let d3 = self.bvh.get(bvh_ptr + 3);

                let mut near_ptr = bvh_ptr + 4;
                let mut far_ptr = d1.w.to_bits();

                let mut near_distance =
                    ray.distance_to_aabb(d0.xyz(), d1.xyz());

                let mut far_distance = ray.distance_to_aabb(d2.xyz(), d3.xyz());

                if far_distance < near_distance {
                    core::mem::swap(&mut near_ptr, &mut far_ptr);
                    core::mem::swap(&mut near_distance, &mut far_distance);
                }

                // Descend into the closer child first; the farther one goes
                // onto the stack, but only if it can still beat the best hit
                // so far.
                if far_distance < hit.distance && stack_ptr < BVH_STACK_SIZE {
                    stack[stack_ptr] = far_ptr;
                    stack_ptr += 1;
                }

                if near_distance < hit.distance {
                    bvh_ptr = near_ptr;
                    continue;
                }
            } else {
                let has_more_triangles = d0.x.to_bits() & 1 == 1;
                let triangle_id = TriangleId::new(d0.y.to_bits());
                let material_id = MaterialId::new(d0.z.to_bits());

                if self.triangles.get(triangle_id).hit(ray, hit) {
                    hit.material_id = material_id;

                    if let TracingMode::Any = mode {
                        break;
                    }
                }

                if has_more_triangles {
                    bvh_ptr += 1;
                    continue;
                }
            }

            // Either a leaf ran out of triangles or an internal node was a
            // miss - pop the next candidate or bail out.
            if stack_ptr > 0 {
                stack_ptr -= 1;
                bvh_ptr = stack[stack_ptr];
            } else {
                break;
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TracingMode {
    Nearest,
    Any,
}
