use glam::UVec2;
use thiserror::Error;

/// Renderer-level failures.
///
/// Construction-time variants are fatal to the caller; `Denoiser` is the one
/// per-frame error, and the frame loop degrades to the built-in upscale path
/// instead of propagating it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("device is missing required features: {0:?}")]
    MissingFeatures(wgpu::Features),

    #[error(
        "device push-constant limit too small: need {required} bytes, \
         got {supported}"
    )]
    PushConstantLimit { required: u32, supported: u32 },

    #[error(
        "environment map is malformed: {width}x{height} needs \
         {expected} pixels, got {actual}"
    )]
    MalformedEnvironment {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("output size {0} is not supported by the denoiser")]
    UnsupportedOutputSize(UVec2),

    #[error("denoiser failed: {0}")]
    Denoiser(String),
}
