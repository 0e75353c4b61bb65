//! Kernel entry points; thin image-I/O wrappers over the algorithms in
//! `luster-gpu`.

#![cfg_attr(target_arch = "spirv", no_std)]

pub mod pathtrace;
pub mod tonemap;
pub mod upscale;
