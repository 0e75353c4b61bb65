//! CPU-side scene scaffolding for the unit tests.
//!
//! Builds the same flattened buffers the host uploads to the GPU: a triangle
//! array, a [`BvhView`]-compatible node array (a single root whose near child
//! is one leaf-chain over all triangles), and a material table.

use glam::{vec2, vec4, Vec3, Vec4, Vec4Swizzles};

use crate::{Material, SceneView, Triangle};

pub struct TestScene {
    triangles: Vec<(Triangle, u32)>,
    materials: Vec<Material>,
}

impl TestScene {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn push_material(&mut self, material: Material) -> u32 {
        self.materials.push(material);

        (self.materials.len() - 1) as u32
    }

    pub fn push_triangle(
        &mut self,
        positions: [Vec3; 3],
        normal: Vec3,
        material_id: u32,
    ) {
        let triangle = Triangle::new(
            positions,
            [normal; 3],
            [vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 1.0)],
        );

        self.triangles.push((triangle, material_id));
    }

    /// Adds a large quad centered at `center`, facing along `normal`.
    pub fn push_wall(&mut self, center: Vec3, normal: Vec3, material_id: u32) {
        const HALF: f32 = 100.0;

        let normal = normal.normalize();
        let (t, b) = normal.any_orthonormal_pair();

        let c0 = center - t * HALF - b * HALF;
        let c1 = center + t * HALF - b * HALF;
        let c2 = center + t * HALF + b * HALF;
        let c3 = center - t * HALF + b * HALF;

        self.push_triangle([c0, c1, c2], normal, material_id);
        self.push_triangle([c0, c2, c3], normal, material_id);
    }

    pub fn build(&self) -> BuiltScene {
        assert!(!self.triangles.is_empty());

        let mut aabb_min = Vec3::splat(f32::MAX);
        let mut aabb_max = Vec3::splat(f32::MIN);

        for (triangle, _) in &self.triangles {
            for position in
                [triangle.p0.xyz(), triangle.p1.xyz(), triangle.p2.xyz()]
            {
                aabb_min = aabb_min.min(position);
                aabb_max = aabb_max.max(position);
            }
        }

        let mut bvh = vec![
            // Root: near child is the leaf-chain right below, far child is a
            // degenerate always-miss AABB
            aabb_min.extend(f32::from_bits(0)),
            aabb_max.extend(f32::from_bits(0)),
            vec4(f32::MAX, f32::MAX, f32::MAX, 0.0),
            vec4(f32::MIN, f32::MIN, f32::MIN, 0.0),
        ];

        for (idx, (_, material_id)) in self.triangles.iter().enumerate() {
            let has_more = idx + 1 < self.triangles.len();

            bvh.push(vec4(
                f32::from_bits(has_more as u32),
                f32::from_bits(idx as u32),
                f32::from_bits(*material_id),
                1.0,
            ));
        }

        let materials = if self.materials.is_empty() {
            vec![Material::default()]
        } else {
            self.materials.clone()
        };

        BuiltScene {
            triangles: self
                .triangles
                .iter()
                .map(|(triangle, _)| *triangle)
                .collect(),
            bvh,
            materials,
        }
    }
}

pub struct BuiltScene {
    triangles: Vec<Triangle>,
    bvh: Vec<Vec4>,
    materials: Vec<Material>,
}

impl BuiltScene {
    pub fn view(&self) -> SceneView<'_> {
        SceneView::new(&self.triangles, &self.bvh, &self.materials)
    }
}

pub fn diffuse(color: Vec3) -> Material {
    Material {
        base_color: color.extend(1.0),
        roughness: 1.0,
        metallic: 0.0,
        reflectance: 0.5,
        ..Default::default()
    }
}

pub fn mirror(color: Vec3) -> Material {
    Material {
        base_color: color.extend(1.0),
        roughness: 0.0,
        metallic: 1.0,
        reflectance: 0.5,
        ..Default::default()
    }
}

