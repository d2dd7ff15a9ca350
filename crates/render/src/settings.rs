use serde::{Deserialize, Serialize};
use showroom_common::Color;

/// Output settings shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Clear color; alpha is always 1.
    pub clear_color: Color,
    /// Multisample the color target.
    pub antialias: bool,
    /// Samples used when `antialias` is on and the adapter supports them.
    pub msaa_samples: u32,
    /// Prefer an sRGB surface format.
    pub srgb: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            antialias: true,
            msaa_samples: 4,
            srgb: true,
        }
    }
}

impl RenderSettings {
    /// Sample count actually requested from the backend.
    pub fn sample_count(&self) -> u32 {
        if self.antialias {
            self.msaa_samples.max(1)
        } else {
            1
        }
    }
}
