use glam::IVec2;

use crate::gpu;

/// Host-owned rendering knobs; serialized into the trace kernel's
/// push-constant block once per frame and never mutated mid-frame.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Maximum number of indirect bounces; clamped to at least one.
    pub max_depth: u32,

    /// Firefly clamp applied to per-vertex path contributions.
    pub max_luminance: f32,

    /// Debugging override for every material's roughness.
    pub override_roughness: Option<f32>,

    /// Debugging override for every material's metallic factor.
    pub override_metallic: Option<f32>,

    /// Forwarded to the scene provider's tangent-frame resolution.
    pub bitangent_flip: f32,

    /// Cursor position, forwarded to the picking collaborator.
    pub mouse_coord: IVec2,

    /// Exposure applied by the tonemap stage.
    pub exposure: f32,
}

impl RenderSettings {
    pub(crate) fn serialize(&self, frame: u32) -> gpu::TracePassParams {
        gpu::TracePassParams {
            seed: gpu::frame_seed(frame),
            frame,
            max_depth: self.max_depth.max(1),
            max_luminance: self.max_luminance,
            override_roughness: self.override_roughness.unwrap_or(-1.0),
            override_metallic: self.override_metallic.unwrap_or(-1.0),
            bitangent_flip: self.bitangent_flip,
            mouse_coord: self.mouse_coord,
            ..Default::default()
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_luminance: 100.0,
            override_roughness: None,
            override_metallic: None,
            bitangent_flip: 1.0,
            mouse_coord: IVec2::ZERO,
            exposure: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_clamps_depth_and_encodes_overrides() {
        let settings = RenderSettings {
            max_depth: 0,
            override_roughness: Some(0.5),
            override_metallic: None,
            ..Default::default()
        };

        let params = settings.serialize(7);

        assert_eq!(params.max_depth, 1);
        assert_eq!(params.frame, 7);
        assert_eq!(params.seed, gpu::frame_seed(7));
        assert_eq!(params.override_roughness(), Some(0.5));
        assert_eq!(params.override_metallic(), None);
    }

    #[test]
    fn same_frame_serializes_to_same_seed() {
        let settings = RenderSettings::default();

        assert_eq!(settings.serialize(3).seed, settings.serialize(3).seed);
        assert_ne!(settings.serialize(3).seed, settings.serialize(4).seed);
    }
}
