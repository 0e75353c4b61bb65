use luster_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] params: &TracePassParams,
    #[spirv(descriptor_set = 0, binding = 0, storage_buffer)]
    triangles: &[Triangle],
    #[spirv(descriptor_set = 0, binding = 1, storage_buffer)] bvh: &[Vec4],
    #[spirv(descriptor_set = 0, binding = 2, storage_buffer)]
    materials: &[Material],
    #[spirv(descriptor_set = 0, binding = 3, storage_buffer)] lights: &[Light],
    #[spirv(descriptor_set = 1, binding = 0, uniform)] frame: &FrameInfo,
    #[spirv(descriptor_set = 1, binding = 1, uniform)] sky_params: &SkyParams,
    #[spirv(descriptor_set = 1, binding = 2)] env_tex: Tex,
    #[spirv(descriptor_set = 1, binding = 3)] env_sampler: &Sampler,
    #[spirv(descriptor_set = 1, binding = 4, storage_buffer)]
    env_table: &[f32],
    #[spirv(descriptor_set = 2, binding = 0)] color: TexRgba16,
    #[spirv(descriptor_set = 2, binding = 1)] diffuse_albedo: TexRgba16,
    #[spirv(descriptor_set = 2, binding = 2)] specular_albedo: TexRgba16,
    #[spirv(descriptor_set = 2, binding = 3)] specular_hit_dist: TexR32,
    #[spirv(descriptor_set = 2, binding = 4)] normal_roughness: TexRgba16,
    #[spirv(descriptor_set = 2, binding = 5)] motion: TexRg32,
    #[spirv(descriptor_set = 2, binding = 6)] view_z: TexR32,
) {
    let screen_pos = global_id.xy();

    if !frame.contains(screen_pos) {
        return;
    }

    let scene = SceneView::new(triangles, bvh, materials);
    let lights = LightsView::new(lights);

    // Both environment backends monomorphize `render_pixel`; which one runs
    // is a per-frame, not per-pixel, decision
    let guides = if frame.flags().use_sky {
        let env = SkyEnv::new(sky_params, frame.env_intensity.xyz());

        render_pixel(&scene, &env, lights, frame, params, screen_pos)
    } else {
        let env = MapEnv::new(
            env_tex,
            env_sampler,
            env_table,
            frame.env_rotation,
            frame.env_intensity.xyz(),
        );

        render_pixel(&scene, &env, lights, frame, params, screen_pos)
    };

    unsafe {
        color.write(screen_pos, guides.color);
        diffuse_albedo.write(screen_pos, guides.diffuse_albedo);
        specular_albedo.write(screen_pos, guides.specular_albedo);

        specular_hit_dist
            .write(screen_pos, Vec4::splat(guides.specular_hit_distance));

        normal_roughness.write(screen_pos, guides.normal_roughness);
        motion.write(screen_pos, guides.motion.extend(0.0).extend(0.0));
        view_z.write(screen_pos, Vec4::splat(guides.view_z));
    }
}
