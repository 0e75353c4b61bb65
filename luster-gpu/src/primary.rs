use glam::{Mat3, Vec3};

use crate::{
    EnvSampler, FrameInfo, LayeredBrdf, Ray, ScatterEvent, SceneView, Surface,
    TracePassParams, WhiteNoise,
};

/// Iteration bound of the mirror-following loop. Five mirror-to-mirror
/// bounces cover every scene we've thrown at it; raising this trades GPU
/// time for fidelity in deep mirror stacks.
pub const MAX_MIRROR_DEPTH: u32 = 5;

/// The primary surface replacement: the first non-mirror surface reached by
/// reflecting the camera ray through perfectly specular surfaces.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct PrimarySurface {
    pub surface: Surface,

    /// Direction the chain's final ray arrived from.
    pub dir: Vec3,

    /// Distance accumulated along the whole chain; `eye + camera_dir * hit_t`
    /// is the *virtual* position the viewer perceives through the mirrors.
    pub hit_t: f32,

    /// Throughput accumulated across the mirror reflections.
    pub throughput: Vec3,

    /// Emissive radiance picked up from the mirror surfaces themselves.
    pub radiance: Vec3,

    /// Composed reflection transform; maps the surface's frame back into the
    /// virtual world the viewer sees.
    pub mirror_xform: Mat3,

    pub bounces: u32,
}

/// The camera ray (or its mirror chain) escaped to the environment; the
/// environment radiance is already folded into `radiance`.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct PrimaryMiss {
    pub radiance: Vec3,

    /// Distance to the last mirror of the chain; zero for a direct sky hit.
    pub hit_t: f32,

    pub bounces: u32,
}

pub enum PrimaryOutcome {
    Surface(PrimarySurface),
    Sky(PrimaryMiss),

    /// A mirror-classified surface produced a non-glossy sample; numerically
    /// this shouldn't happen, so the pixel gets a debug color instead of a
    /// crashed kernel.
    Invalid,
}

/// Resolves the camera ray to its primary surface, following mirror-like
/// surfaces when enabled.
///
/// The loop terminates on the first of: a non-mirror hit, an environment
/// escape, or the depth bound - a surface still classified as a mirror at
/// the bound is accepted as-is, which bounds GPU work per pixel at the cost
/// of a little bias in deep mirror stacks.
pub fn find_primary_surface<E: EnvSampler>(
    scene: &SceneView,
    env: &E,
    frame: &FrameInfo,
    params: &TracePassParams,
    camera_ray: Ray,
    wnoise: &mut WhiteNoise,
) -> PrimaryOutcome {
    let mut ray = camera_ray;
    let mut hit_t = 0.0;
    let mut throughput = Vec3::ONE;
    let mut radiance = Vec3::ZERO;
    let mut mirror_xform = Mat3::IDENTITY;
    let mut bounces = 0;

    loop {
        let hit = scene.trace_nearest(ray);

        if hit.is_none() {
            let escaped = env.eval(ray.dir()).radiance;

            return PrimaryOutcome::Sky(PrimaryMiss {
                radiance: radiance + throughput * escaped,
                hit_t,
                bounces,
            });
        }

        let mut material = scene.material(hit.material_id);

        material.apply_overrides(params);
        hit_t += hit.distance;

        let surface = Surface::resolve(&hit, &material);

        let follow = frame.flags().use_psr
            && material.is_mirror()
            && bounces < MAX_MIRROR_DEPTH;

        if !follow {
            return PrimaryOutcome::Surface(PrimarySurface {
                surface,
                dir: ray.dir(),
                hit_t,
                throughput,
                radiance,
                mirror_xform,
                bounces,
            });
        }

        let sample = LayeredBrdf::new(&surface).sample(wnoise, -ray.dir());

        if !matches!(sample.event, ScatterEvent::Glossy) {
            return PrimaryOutcome::Invalid;
        }

        radiance += throughput * surface.emissive;
        throughput *= sample.weight;
        mirror_xform = reflection_matrix(hit.normal) * mirror_xform;
        ray = Ray::new(surface.point, sample.dir);
        bounces += 1;
    }
}

/// Householder matrix reflecting across the plane with normal `n`.
pub fn reflection_matrix(n: Vec3) -> Mat3 {
    Mat3::IDENTITY - 2.0 * Mat3::from_cols(n.x * n, n.y * n, n.z * n)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;
    use crate::testing::{diffuse, mirror, TestScene};
    use crate::{frame_seed, FrameFlags, SkyEnv, SkyParams};

    fn params() -> TracePassParams {
        TracePassParams {
            max_depth: 2,
            max_luminance: 1000.0,
            override_roughness: -1.0,
            override_metallic: -1.0,
            ..Default::default()
        }
    }

    fn frame(use_psr: bool) -> FrameInfo {
        let mut frame = FrameInfo::default();

        frame.set_flags(FrameFlags {
            use_sky: true,
            use_psr,
            use_path_regularization: false,
        });

        frame
    }

    #[test]
    fn no_mirrors_means_psr_is_a_no_op() {
        let mut scene = TestScene::new();

        scene.push_material(diffuse(vec3(0.6, 0.4, 0.2)));
        scene.push_wall(vec3(0.0, 0.0, -3.0), vec3(0.0, 0.0, 1.0), 0);

        let scene = scene.build();
        let sky_params = SkyParams::uniform(Vec3::ONE);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);
        let ray = Ray::new(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, -1.0));

        for use_psr in [false, true] {
            let mut wnoise = WhiteNoise::new(frame_seed(0), uvec2(0, 0));

            let outcome = find_primary_surface(
                &scene.view(),
                &sky,
                &frame(use_psr),
                &params(),
                ray,
                &mut wnoise,
            );

            let PrimaryOutcome::Surface(primary) = outcome else {
                panic!("expected a surface");
            };

            assert_eq!(primary.bounces, 0);
            assert_relative_eq!(primary.hit_t, 3.0, epsilon = 0.001);
            assert_eq!(primary.throughput, Vec3::ONE);
            assert_eq!(primary.mirror_xform, Mat3::IDENTITY);
        }
    }

    #[test]
    fn mirror_chain_reports_virtual_distance() {
        let mut scene = TestScene::new();

        scene.push_material(mirror(vec3(1.0, 1.0, 1.0)));
        scene.push_material(diffuse(vec3(0.5, 0.5, 0.5)));

        // Mirror 2 units ahead, diffuse wall 3 units above the mirror
        scene.push_wall(vec3(0.0, 0.0, -2.0), vec3(0.0, 0.707, 0.707), 0);
        scene.push_wall(vec3(0.0, 3.0, -2.0), vec3(0.0, -1.0, 0.0), 1);

        let scene = scene.build();
        let sky_params = SkyParams::uniform(Vec3::ONE);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);
        let ray = Ray::new(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, -1.0));
        let mut wnoise = WhiteNoise::new(frame_seed(0), uvec2(0, 0));

        let outcome = find_primary_surface(
            &scene.view(),
            &sky,
            &frame(true),
            &params(),
            ray,
            &mut wnoise,
        );

        let PrimaryOutcome::Surface(primary) = outcome else {
            panic!("expected a surface");
        };

        assert_eq!(primary.bounces, 1);
        assert_relative_eq!(primary.hit_t, 5.0, epsilon = 0.01);

        // The wall's normal points down; seen through the 45-degree mirror
        // it must face the viewer
        let virtual_normal =
            (primary.mirror_xform * primary.surface.normal).normalize();

        assert_relative_eq!(virtual_normal.z, 1.0, epsilon = 0.01);
    }

    #[test]
    fn facing_mirrors_terminate_at_the_depth_bound() {
        let mut scene = TestScene::new();

        scene.push_material(mirror(vec3(1.0, 1.0, 1.0)));
        scene.push_wall(vec3(0.0, 0.0, -1.0), vec3(0.0, 0.0, 1.0), 0);
        scene.push_wall(vec3(0.0, 0.0, 1.0), vec3(0.0, 0.0, -1.0), 0);

        let scene = scene.build();
        let sky_params = SkyParams::uniform(Vec3::ONE);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);
        let ray = Ray::new(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, -1.0));
        let mut wnoise = WhiteNoise::new(frame_seed(0), uvec2(0, 0));

        let outcome = find_primary_surface(
            &scene.view(),
            &sky,
            &frame(true),
            &params(),
            ray,
            &mut wnoise,
        );

        let PrimaryOutcome::Surface(primary) = outcome else {
            panic!("expected the loop to accept a mirror at the bound");
        };

        assert_eq!(primary.bounces, MAX_MIRROR_DEPTH);
    }

    #[test]
    fn sky_seen_through_mirror_keeps_mirror_tint() {
        let mut scene = TestScene::new();

        scene.push_material(mirror(vec3(1.0, 0.5, 0.5)));
        scene.push_wall(vec3(0.0, 0.0, -2.0), vec3(0.0, 0.707, 0.707), 0);

        let scene = scene.build();
        let sky_params = SkyParams::uniform(vec3(2.0, 2.0, 2.0));
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);
        let ray = Ray::new(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, -1.0));
        let mut wnoise = WhiteNoise::new(frame_seed(0), uvec2(0, 0));

        let outcome = find_primary_surface(
            &scene.view(),
            &sky,
            &frame(true),
            &params(),
            ray,
            &mut wnoise,
        );

        let PrimaryOutcome::Sky(miss) = outcome else {
            panic!("expected the chain to escape to the sky");
        };

        assert_eq!(miss.bounces, 1);
        assert_relative_eq!(miss.hit_t, 2.0, epsilon = 0.01);

        // The red-tinted mirror reflects red more strongly than blue
        assert!(miss.radiance.x > miss.radiance.z);
        assert!(miss.radiance.x > 0.0);
    }

    #[test]
    fn reflection_matrix_is_involutory() {
        let n = vec3(0.3, 0.8, -0.5).normalize();
        let m = reflection_matrix(n);

        let twice = m * m;

        for (a, b) in [
            (twice.x_axis, vec3(1.0, 0.0, 0.0)),
            (twice.y_axis, vec3(0.0, 1.0, 0.0)),
            (twice.z_axis, vec3(0.0, 0.0, 1.0)),
        ] {
            assert_relative_eq!(a.x, b.x, epsilon = 0.0001);
            assert_relative_eq!(a.y, b.y, epsilon = 0.0001);
            assert_relative_eq!(a.z, b.z, epsilon = 0.0001);
        }
    }
}
