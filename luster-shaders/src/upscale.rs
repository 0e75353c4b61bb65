use luster_gpu::prelude::*;

/// Fallback for frames the denoiser adapter rejects: bilinear upscale of the
/// noisy render-resolution color into the output image.
#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] params: &UpscalePassParams,
    #[spirv(descriptor_set = 0, binding = 0)] input: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 1)] output: TexRgba16,
) {
    let screen_pos = global_id.xy();

    if screen_pos.x >= params.dst_size.x || screen_pos.y >= params.dst_size.y {
        return;
    }

    let uv = (screen_pos.as_vec2() + 0.5) / params.dst_size.as_vec2();
    let pos = uv * params.src_size.as_vec2() - 0.5;
    let t = pos - pos.floor();

    let max = params.src_size.as_ivec2() - IVec2::ONE;
    let base = pos.floor().as_ivec2();

    let sample = |offset: IVec2| -> Vec4 {
        input.read((base + offset).clamp(IVec2::ZERO, max).as_uvec2())
    };

    let s00 = sample(ivec2(0, 0));
    let s10 = sample(ivec2(1, 0));
    let s01 = sample(ivec2(0, 1));
    let s11 = sample(ivec2(1, 1));

    let value = s00.lerp(s10, t.x).lerp(s01.lerp(s11, t.x), t.y);

    unsafe {
        output.write(screen_pos, value);
    }
}
