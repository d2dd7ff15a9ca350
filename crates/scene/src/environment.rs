use showroom_common::NodeId;
use std::sync::Arc;

/// How a texture is wrapped when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureMapping {
    #[default]
    Uv,
    /// Panoramic latitude/longitude lookup by direction, for reflections.
    EquirectangularReflection,
}

/// High-dynamic-range RGBA texture used as the scene environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentTexture {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 4]>,
    pub mapping: TextureMapping,
}

impl EnvironmentTexture {
    pub fn new(width: u32, height: u32, texels: Vec<[f32; 4]>) -> Self {
        Self {
            width,
            height,
            texels,
            mapping: TextureMapping::Uv,
        }
    }

    /// Mean of all texels' RGB, a cheap stand-in for the irradiance term.
    pub fn average_color(&self) -> [f32; 3] {
        if self.texels.is_empty() {
            return [0.0; 3];
        }
        let sum = self.texels.iter().fold([0.0f64; 3], |mut acc, t| {
            acc[0] += t[0] as f64;
            acc[1] += t[1] as f64;
            acc[2] += t[2] as f64;
            acc
        });
        let n = self.texels.len() as f64;
        [(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32]
    }
}

/// Value held by the scene's environment slot.
///
/// Competing offers are resolved by rank: a texture always wins over a node,
/// regardless of which arrives first, and a later offer of equal rank
/// replaces the earlier one.
#[derive(Debug, Clone)]
pub enum EnvironmentSource {
    Node(NodeId),
    Texture(Arc<EnvironmentTexture>),
}

impl EnvironmentSource {
    pub fn rank(&self) -> u8 {
        match self {
            EnvironmentSource::Node(_) => 1,
            EnvironmentSource::Texture(_) => 2,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EnvironmentSource::Node(_) => "node",
            EnvironmentSource::Texture(_) => "texture",
        }
    }

    pub fn texture(&self) -> Option<&Arc<EnvironmentTexture>> {
        match self {
            EnvironmentSource::Texture(t) => Some(t),
            EnvironmentSource::Node(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_outranks_node() {
        let node = EnvironmentSource::Node(NodeId::new());
        let tex = EnvironmentSource::Texture(Arc::new(EnvironmentTexture::new(1, 1, vec![[0.0; 4]])));
        assert!(tex.rank() > node.rank());
        assert_eq!(tex.kind(), "texture");
        assert!(node.texture().is_none());
    }

    #[test]
    fn average_of_two_texels() {
        let tex = EnvironmentTexture::new(2, 1, vec![[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
        assert_eq!(tex.average_color(), [0.5, 0.5, 0.0]);
        assert_eq!(EnvironmentTexture::new(0, 0, vec![]).average_color(), [0.0; 3]);
    }
}
