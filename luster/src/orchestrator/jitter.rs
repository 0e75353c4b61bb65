use glam::{vec2, Vec2};

/// Sub-pixel camera jitter for given frame, in `[-0.5, 0.5]` per axis.
///
/// Halton (2,3), cycled so the reconstruction stage sees a repeating,
/// well-distributed pattern; index zero is skipped because it lands dead
/// center.
pub fn jitter(frame: u32) -> Vec2 {
    let index = frame % 16 + 1;

    vec2(halton(index, 2) - 0.5, halton(index, 3) - 0.5)
}

fn halton(mut index: u32, base: u32) -> f32 {
    let mut factor = 1.0;
    let mut result = 0.0;

    while index > 0 {
        factor /= base as f32;
        result += factor * (index % base) as f32;
        index /= base;
    }

    result
}
