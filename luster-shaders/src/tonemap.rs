use luster_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] params: &TonemapPassParams,
    #[spirv(descriptor_set = 0, binding = 0)] input: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 1)] output: TexRgba8,
) {
    let screen_pos = global_id.xy();

    if screen_pos.x >= params.size.x || screen_pos.y >= params.size.y {
        return;
    }

    let hdr: Vec4 = input.read(screen_pos);
    let mapped = aces(hdr.xyz() * params.exposure);

    let encoded = vec3(
        mapped.x.powf(1.0 / 2.2),
        mapped.y.powf(1.0 / 2.2),
        mapped.z.powf(1.0 / 2.2),
    );

    unsafe {
        output.write(screen_pos, encoded.extend(1.0));
    }
}

/// Narkowicz's ACES filmic fit.
fn aces(color: Vec3) -> Vec3 {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;

    ((color * (a * color + b)) / (color * (c * color + d) + e))
        .clamp(Vec3::ZERO, Vec3::ONE)
}
