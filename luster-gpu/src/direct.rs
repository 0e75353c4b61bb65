use glam::Vec3;

use crate::{
    mis_power_heuristic, EnvSampler, LayeredBrdf, LightId, LightsView, Ray,
    SceneView, Surface, WhiteNoise, EPSILON,
};

/// Direct-lighting estimate at a shading point: the MIS-weighted
/// environment contribution plus, when the scene carries any, one
/// uniformly-picked analytic light.
///
/// The environment term is weighted with the power heuristic against the
/// BSDF's density for the same direction, because the indirect integrator's
/// BSDF sampling can reach the environment on its own - the two estimators
/// split the energy between them.
pub fn direct_light<E: EnvSampler>(
    scene: &SceneView,
    env: &E,
    lights: LightsView,
    light_count: u32,
    surface: &Surface,
    v: Vec3,
    wnoise: &mut WhiteNoise,
) -> Vec3 {
    let mut radiance = Vec3::ZERO;
    let brdf = LayeredBrdf::new(surface);

    let env_sample = env.sample(wnoise);
    let n_o_l = surface.normal.dot(env_sample.dir);

    if n_o_l > 0.0 && env_sample.pdf > EPSILON {
        let value = brdf.eval(env_sample.dir, v);
        let weight =
            mis_power_heuristic(env_sample.pdf, brdf.pdf(env_sample.dir, v));

        let shadow_ray = Ray::new(surface.point, env_sample.dir);

        // Occlusion only - first hit suffices, no shading needed
        if !scene.trace_any(shadow_ray, f32::MAX) {
            radiance +=
                env_sample.radiance * value * n_o_l * weight / env_sample.pdf;
        }
    }

    if light_count > 0 {
        let id = wnoise.sample_int() % light_count;
        let light = lights.get(LightId::new(id));

        let to_light = light.center() - surface.point;
        let distance = to_light.length();
        let shadow_ray = Ray::new(surface.point, to_light / distance);

        if !scene.trace_any(shadow_ray, distance) {
            // The uniform pick has pdf 1 / light_count
            radiance += light.contribution(surface, v) * light_count as f32;
        }
    }

    radiance
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use core::f32::consts::PI;
    use glam::{uvec2, vec3};

    use super::*;
    use crate::testing::{diffuse, TestScene};
    use crate::{frame_seed, Light, SkyEnv, SkyParams, TriangleHit};

    #[test]
    fn point_light_falls_off_with_inverse_square() {
        let mut scene = TestScene::new();

        scene.push_material(diffuse(vec3(0.8, 0.8, 0.8)));
        scene.push_wall(vec3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0), 0);

        let scene = scene.build();
        let scene = scene.view();

        let sky_params = SkyParams::uniform(Vec3::ZERO);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);

        let light = Light::point(vec3(0.0, 2.0, 0.0), vec3(4.0, 4.0, 4.0));
        let lights = [light];

        let surface = Surface {
            point: vec3(0.0, TriangleHit::NUDGE, 0.0),
            normal: vec3(0.0, 1.0, 0.0),
            base_color: vec3(0.8, 0.8, 0.8).extend(1.0),
            metallic: 0.0,
            roughness: 1.0,
            reflectance: 0.0,
            emissive: Vec3::ZERO,
        };

        let mut wnoise = WhiteNoise::new(frame_seed(0), uvec2(0, 0));

        let radiance = direct_light(
            &scene,
            &sky,
            LightsView::new(&lights),
            1,
            &surface,
            vec3(0.0, 1.0, 0.0),
            &mut wnoise,
        );

        // Lambert-ish response: albedo / pi * I / d^2; Burley at normal
        // incidence stays within a few percent of Lambert
        let expected = 0.8 / PI * 4.0 / 4.0;

        assert_relative_eq!(radiance.x, expected, epsilon = expected * 0.1);
    }

    #[test]
    fn occluded_light_contributes_nothing() {
        let mut scene = TestScene::new();

        scene.push_material(diffuse(vec3(0.8, 0.8, 0.8)));
        scene.push_wall(vec3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0), 0);
        scene.push_wall(vec3(0.0, 1.0, 0.0), vec3(0.0, 1.0, 0.0), 0);

        let scene = scene.build();
        let scene = scene.view();

        let sky_params = SkyParams::uniform(Vec3::ZERO);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);

        let light = Light::point(vec3(0.0, 2.0, 0.0), vec3(4.0, 4.0, 4.0));
        let lights = [light];

        let surface = Surface {
            point: vec3(0.0, TriangleHit::NUDGE, 0.0),
            normal: vec3(0.0, 1.0, 0.0),
            base_color: vec3(0.8, 0.8, 0.8).extend(1.0),
            metallic: 0.0,
            roughness: 1.0,
            reflectance: 0.0,
            emissive: Vec3::ZERO,
        };

        let mut wnoise = WhiteNoise::new(frame_seed(0), uvec2(0, 0));

        let radiance = direct_light(
            &scene,
            &sky,
            LightsView::new(&lights),
            1,
            &surface,
            vec3(0.0, 1.0, 0.0),
            &mut wnoise,
        );

        assert_eq!(radiance, Vec3::ZERO);
    }
}
