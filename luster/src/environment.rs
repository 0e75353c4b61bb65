use std::f32::consts::PI;

use glam::{UVec2, Vec4, Vec4Swizzles};

use crate::Error;

/// Equirectangular HDR panorama, plus the importance table its GPU-side
/// sampler walks.
///
/// The table layout is shared with the kernels: a four-float header (width,
/// height, total weight, unused), `height` marginal row-CDF entries, then
/// `height * width` per-row conditional-CDF entries. Texel weights are
/// `luminance * sin(theta)`, which folds the equirectangular area distortion
/// into the distribution and leaves the solid-angle pdf as
/// `luma * w * h / (2 pi^2 * total)`.
pub struct EnvironmentMap {
    size: UVec2,
    pixels: Vec<Vec4>,
}

impl EnvironmentMap {
    pub fn new(size: UVec2, pixels: Vec<Vec4>) -> Result<Self, Error> {
        let expected = (size.x * size.y) as usize;

        if pixels.len() != expected {
            return Err(Error::MalformedEnvironment {
                width: size.x,
                height: size.y,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self { size, pixels })
    }

    /// A single white texel; what the engine starts with before any panorama
    /// is loaded.
    pub fn placeholder() -> Self {
        Self {
            size: UVec2::ONE,
            pixels: vec![Vec4::ONE],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn importance_table(&self) -> Vec<f32> {
        let width = self.size.x as usize;
        let height = self.size.y as usize;

        let mut table = Vec::with_capacity(4 + height + height * width);

        // Per-texel weights; rows first so the marginal can reuse the sums
        let mut weights = vec![0.0f32; width * height];
        let mut row_sums = vec![0.0f32; height];

        for row in 0..height {
            let sin_theta = (PI * (row as f32 + 0.5) / height as f32).sin();

            for col in 0..width {
                let weight =
                    luma(self.pixels[row * width + col]) * sin_theta;

                weights[row * width + col] = weight;
                row_sums[row] += weight;
            }
        }

        let total: f32 = row_sums.iter().sum();

        table.push(width as f32);
        table.push(height as f32);
        table.push(total);
        table.push(0.0);

        // Marginal row CDF
        let mut acc = 0.0;

        for row in 0..height {
            acc += row_sums[row];

            table.push(if total > 0.0 {
                acc / total
            } else {
                (row as f32 + 1.0) / height as f32
            });
        }

        // Per-row conditional CDFs; a black row degenerates to uniform so
        // the binary search still lands somewhere sane
        for row in 0..height {
            let mut acc = 0.0;

            for col in 0..width {
                acc += weights[row * width + col];

                table.push(if row_sums[row] > 0.0 {
                    acc / row_sums[row]
                } else {
                    (col as f32 + 1.0) / width as f32
                });
            }
        }

        table
    }
}

fn luma(pixel: Vec4) -> f32 {
    pixel.xyz().dot(glam::vec3(0.2126, 0.7152, 0.0722))
}
