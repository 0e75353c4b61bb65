use glam::{vec2, vec4, Vec3};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    direct_light, mis_power_heuristic, EnvSampler, FrameInfo, LayeredBrdf,
    LightsView, Ray, ScatterEvent, SceneView, Surface, TracePassParams,
    TriangleHit, Vec3Ext, WhiteNoise,
};

/// What tracing one path segment produced.
///
/// `MissAccounted` records that the segment escaped to the environment *and*
/// its contribution has already been merged into the path radiance - keeping
/// that distinction in the type system rather than in the sign bit of a
/// hit-distance float.
pub enum TraceOutcome {
    Hit(TriangleHit),
    Miss,
    MissAccounted,
}

#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct IndirectOutput {
    pub radiance: Vec3,

    /// Pre-integrated environment specular response, for the specular-albedo
    /// guide buffer; zero when the first scattering event was diffuse.
    pub specular_albedo: Vec3,

    /// Length of the first path segment when the first scattering event was
    /// glossy; tells the reconstruction stage how far the reflected detail
    /// actually sits. Zero otherwise.
    pub specular_hit_distance: f32,

    pub first_event: ScatterEvent,
}

impl IndirectOutput {
    fn none() -> Self {
        Self {
            radiance: Vec3::ZERO,
            specular_albedo: Vec3::ZERO,
            specular_hit_distance: 0.0,
            first_event: ScatterEvent::Absorbed,
        }
    }
}

/// Estimates the indirect part of the rendering equation at the primary
/// surface by extending the path with BSDF importance sampling, for at most
/// `params.max_depth` bounces.
///
/// An environment miss is always terminal: its MIS-weighted radiance is
/// merged against the pdf of the segment that escaped and the loop ends.
pub fn integrate_indirect<E: EnvSampler>(
    scene: &SceneView,
    env: &E,
    lights: LightsView,
    frame: &FrameInfo,
    params: &TracePassParams,
    surface: &Surface,
    v: Vec3,
    wnoise: &mut WhiteNoise,
) -> IndirectOutput {
    let mut out = IndirectOutput::none();

    let first = LayeredBrdf::new(surface).sample(wnoise, v);

    out.first_event = first.event;

    if let ScatterEvent::Glossy = first.event {
        out.specular_albedo = env_specular_albedo(
            surface.f0(),
            surface.roughness,
            surface.normal.dot(v).max(0.0),
        );
    }

    if first.is_absorbed() {
        return out;
    }

    let mut throughput = first.weight;
    let mut last_pdf = first.pdf;
    let mut ray = Ray::new(surface.point, first.dir);
    let mut max_roughness = surface.roughness;
    let mut depth = 1;
    let mut segment = trace_segment(scene, ray);

    loop {
        match segment {
            TraceOutcome::Hit(hit) => {
                if depth == 1 {
                    if let ScatterEvent::Glossy = first.event {
                        out.specular_hit_distance = hit.distance;
                    }
                }

                let mut material = scene.material(hit.material_id);

                material.apply_overrides(params);

                if frame.flags().use_path_regularization {
                    material.regularize(max_roughness);
                }

                max_roughness = max_roughness.max(material.roughness);

                let bounce = Surface::resolve(&hit, &material);
                let bounce_v = -ray.dir();

                let contribution = bounce.emissive
                    + direct_light(
                        scene,
                        env,
                        lights,
                        frame.light_count,
                        &bounce,
                        bounce_v,
                        wnoise,
                    );

                out.radiance += clamp_luminance(
                    throughput * contribution,
                    params.max_luminance,
                );

                depth += 1;

                if depth > params.max_depth {
                    break;
                }

                let sample = LayeredBrdf::new(&bounce).sample(wnoise, bounce_v);

                if sample.is_absorbed() {
                    break;
                }

                throughput *= sample.weight;
                last_pdf = sample.pdf;
                ray = Ray::new(bounce.point, sample.dir);
                segment = trace_segment(scene, ray);
            }

            TraceOutcome::Miss => {
                let env_sample = env.eval(ray.dir());
                let weight = mis_power_heuristic(last_pdf, env_sample.pdf);

                out.radiance += clamp_luminance(
                    throughput * env_sample.radiance * weight,
                    params.max_luminance,
                );

                segment = TraceOutcome::MissAccounted;
            }

            // A merged escape is terminal - there is no bounce off the
            // environment, and merging it twice would double-count
            TraceOutcome::MissAccounted => break,
        }
    }

    out
}

fn trace_segment(scene: &SceneView, ray: Ray) -> TraceOutcome {
    let hit = scene.trace_nearest(ray);

    if hit.is_some() {
        TraceOutcome::Hit(hit)
    } else {
        TraceOutcome::Miss
    }
}

/// Closed-form fit of the pre-integrated GGX environment response
/// (Lazarov's polynomial), as a function of view angle, reflectance at
/// normal incidence and roughness.
pub fn env_specular_albedo(f0: Vec3, roughness: f32, n_o_v: f32) -> Vec3 {
    let perceptual = roughness.sqrt();

    let c0 = vec4(-1.0, -0.0275, -0.572, 0.022);
    let c1 = vec4(1.0, 0.0425, 1.04, -0.04);
    let r = perceptual * c0 + c1;

    let a004 = (r.x * r.x).min((-9.28 * n_o_v).exp2()) * r.x + r.y;
    let ab = vec2(-1.04, 1.04) * a004 + vec2(r.z, r.w);

    f0 * ab.x + Vec3::splat(ab.y)
}

fn clamp_luminance(color: Vec3, max_luminance: f32) -> Vec3 {
    let luma = color.luma();

    if luma > max_luminance {
        color * (max_luminance / luma)
    } else {
        color
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3, vec4};

    use super::*;
    use crate::testing::{diffuse, TestScene};
    use crate::{frame_seed, FrameFlags, SkyEnv, SkyParams, Material};

    fn params(max_depth: u32) -> TracePassParams {
        TracePassParams {
            max_depth,
            max_luminance: 1000.0,
            override_roughness: -1.0,
            override_metallic: -1.0,
            ..Default::default()
        }
    }

    fn frame() -> FrameInfo {
        let mut frame = FrameInfo::default();

        frame.set_flags(FrameFlags {
            use_sky: true,
            use_psr: true,
            use_path_regularization: false,
        });

        frame
    }

    #[test]
    fn below_surface_view_terminates_with_zero() {
        let mut scene = TestScene::new();

        scene.push_material(diffuse(vec3(0.5, 0.5, 0.5)));
        scene.push_wall(vec3(0.0, 0.0, -5.0), vec3(0.0, 0.0, 1.0), 0);

        let scene = scene.build();
        let sky_params = SkyParams::uniform(Vec3::ONE);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);

        let surface = Surface {
            point: vec3(0.0, 0.0, -5.0),
            normal: vec3(0.0, 0.0, 1.0),
            base_color: vec3(0.5, 0.5, 0.5).extend(1.0),
            roughness: 1.0,
            ..Default::default()
        };

        let mut wnoise = WhiteNoise::new(frame_seed(0), uvec2(0, 0));

        let out = integrate_indirect(
            &scene.view(),
            &sky,
            LightsView::new(&[]),
            &frame(),
            &params(4),
            &surface,
            vec3(0.0, 0.0, -1.0),
            &mut wnoise,
        );

        assert!(out.radiance == Vec3::ZERO);
        assert_eq!(out.specular_hit_distance, 0.0);
    }

    #[test]
    fn glossy_first_segment_records_hit_distance() {
        let mut scene = TestScene::new();

        scene.push_material(diffuse(vec3(0.5, 0.5, 0.5)));
        scene.push_wall(vec3(0.0, 0.0, 4.0), vec3(0.0, 0.0, -1.0), 0);

        let scene = scene.build();
        let sky_params = SkyParams::uniform(Vec3::ZERO);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);

        // Near-mirror metal, but rough enough to escape PSR classification
        let surface = Surface {
            point: vec3(0.0, 0.0, 0.0),
            normal: vec3(0.0, 0.0, 1.0),
            base_color: vec3(1.0, 1.0, 1.0).extend(1.0),
            metallic: 1.0,
            roughness: 0.02,
            reflectance: 0.5,
            emissive: Vec3::ZERO,
        };

        let mut wnoise = WhiteNoise::new(frame_seed(1), uvec2(0, 0));

        let out = integrate_indirect(
            &scene.view(),
            &sky,
            LightsView::new(&[]),
            &frame(),
            &params(2),
            &surface,
            vec3(0.0, 0.0, 1.0),
            &mut wnoise,
        );

        assert_eq!(out.first_event, ScatterEvent::Glossy);
        assert_relative_eq!(out.specular_hit_distance, 4.0, epsilon = 0.1);
        assert!(out.specular_albedo.x > 0.0);
    }

    #[test]
    fn emissive_bounce_is_picked_up_within_one_bounce() {
        let mut scene = TestScene::new();

        scene.push_material(diffuse(vec3(1.0, 1.0, 1.0)));

        scene.push_material(Material {
            base_color: vec4(0.0, 0.0, 0.0, 1.0),
            emissive: vec4(3.0, 3.0, 3.0, 0.0),
            roughness: 1.0,
            ..Default::default()
        });

        // Emissive dome wall in front of the shading point
        scene.push_wall(vec3(0.0, 0.0, 4.0), vec3(0.0, 0.0, -1.0), 1);
        scene.push_wall(vec3(0.0, 0.0, -8.0), vec3(0.0, 0.0, 1.0), 0);

        let scene = scene.build();
        let sky_params = SkyParams::uniform(Vec3::ZERO);
        let sky = SkyEnv::new(&sky_params, Vec3::ONE);

        let surface = Surface {
            point: vec3(0.0, 0.0, 0.0),
            normal: vec3(0.0, 0.0, 1.0),
            base_color: vec3(1.0, 1.0, 1.0).extend(1.0),
            roughness: 1.0,
            reflectance: 0.0,
            ..Default::default()
        };

        let frame = frame();
        let mut sum = Vec3::ZERO;
        let rounds = 4000;

        for i in 0..rounds {
            let mut wnoise = WhiteNoise::new(frame_seed(i), uvec2(0, 0));

            sum += integrate_indirect(
                &scene.view(),
                &sky,
                LightsView::new(&[]),
                &frame,
                &params(1),
                &surface,
                vec3(0.0, 0.0, 1.0),
                &mut wnoise,
            )
            .radiance;
        }

        let avg = sum / rounds as f32;

        // Every bounce direction reaches the emissive wall, so a one-bounce
        // estimate converges to albedo * emitted radiance
        assert_relative_eq!(avg.x, 3.0, epsilon = 0.25);
    }
}
