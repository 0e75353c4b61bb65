mod f32_ext;
mod vec3_ext;

use spirv_std::Image;

pub use self::f32_ext::*;
pub use self::vec3_ext::*;

pub type Tex<'a> = &'a Image!(2D, type = f32, sampled);
pub type TexRgba8<'a> = &'a Image!(2D, format = rgba8, sampled = false);
pub type TexRgba16<'a> = &'a Image!(2D, format = rgba16f, sampled = false);
pub type TexRg32<'a> = &'a Image!(2D, format = rg32f, sampled = false);
pub type TexR32<'a> = &'a Image!(2D, format = r32f, sampled = false);
