//! Common structs and algorithms shared by Luster's shaders and renderer.
//!
//! Everything in here compiles both for the host and for the `spirv` target;
//! the path-tracing core itself is plain code over slice-views, so it can be
//! exercised on the CPU by the test-suite.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::too_many_arguments)]

mod brdf;
mod bvh_view;
mod direct;
mod env;
mod frame;
mod guide;
mod hit;
mod indirect;
mod light;
mod material;
mod materials;
mod noise;
mod passes;
mod primary;
mod ray;
mod render;
mod scene;
mod sky;
mod surface;
mod triangle;
mod triangles;
mod utils;

pub use self::brdf::*;
pub use self::bvh_view::*;
pub use self::direct::*;
pub use self::env::*;
pub use self::frame::*;
pub use self::guide::*;
pub use self::hit::*;
pub use self::indirect::*;
pub use self::light::*;
pub use self::material::*;
pub use self::materials::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::primary::*;
pub use self::ray::*;
pub use self::render::*;
pub use self::scene::*;
pub use self::sky::*;
pub use self::surface::*;
pub use self::triangle::*;
pub use self::triangles::*;
pub use self::utils::*;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use spirv_std::glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;
    pub use spirv_std::{spirv, Image, Sampler};

    pub use crate::*;
}

/// Largest finite half-float; marks "no intersection" in the view-Z guide
/// buffer, whose consumers exchange data at half precision.
pub const HIT_T_MISS: f32 = 65504.0;

/// Surfaces with roughness below this bound and a metallic factor of one are
/// followed as mirrors by the primary-surface finder.
pub const MIRROR_ROUGHNESS_EPS: f32 = 0.01;

pub const EPSILON: f32 = 1e-6;
