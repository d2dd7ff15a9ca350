use glam::Vec3;
use serde::{Deserialize, Serialize};
use showroom_camera::OrbitSettings;
use showroom_common::Color;
use showroom_render::RenderSettings;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scene configuration. Every field is optional in YAML; defaults reproduce
/// the warehouse showroom.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub model: ModelConfig,
    pub environment: EnvironmentConfig,
    pub camera: CameraConfig,
    pub controls: OrbitSettings,
    pub sphere: SphereConfig,
    pub lights: LightsConfig,
    pub renderer: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Relative to the assets directory.
    pub path: PathBuf,
    pub scale: f32,
    pub position: Vec3,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("warehouse_fbx_model_free/scene.gltf"),
            scale: 15.0,
            position: Vec3::new(-120.0, -25.0, 130.0),
        }
    }
}

/// Empty path means no environment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 1.0,
            far: 300.0,
            position: Vec3::new(0.0, 0.0, 40.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Local position; relative to the model root once attached.
    pub position: Vec3,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 1.3,
            width_segments: 64,
            height_segments: 64,
            position: Vec3::new(8.0, 1.5, -17.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// sRGB `0xRRGGBB`.
    pub color: u32,
    pub intensity: f32,
}

impl LightConfig {
    pub fn color(&self) -> Color {
        Color::from_hex(self.color)
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalConfig {
    /// sRGB `0xRRGGBB`.
    pub color: u32,
    pub intensity: f32,
    /// The light shines from here toward the origin.
    pub position: Vec3,
}

impl DirectionalConfig {
    pub fn color(&self) -> Color {
        Color::from_hex(self.color)
    }
}

impl Default for DirectionalConfig {
    fn default() -> Self {
        Self {
            color: 0xffcc88,
            intensity: 1.0,
            position: Vec3::new(1.0, 10.0, -10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub ambient: LightConfig,
    pub directional: DirectionalConfig,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient: LightConfig {
                color: 0xcccccc,
                intensity: 0.5,
            },
            directional: DirectionalConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_reader(std::fs::File::open(path.as_ref())?)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the scene cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.camera;
        if !(c.fov > 0.0 && c.fov < 180.0) {
            return Err(ConfigError::Invalid(format!("camera.fov {} out of (0, 180)", c.fov)));
        }
        if !(c.near > 0.0 && c.far > c.near) {
            return Err(ConfigError::Invalid(format!(
                "camera planes near={} far={} must satisfy 0 < near < far",
                c.near, c.far
            )));
        }
        let s = &self.sphere;
        if s.radius <= 0.0 || s.width_segments < 3 || s.height_segments < 2 {
            return Err(ConfigError::Invalid(
                "sphere needs radius > 0, width_segments >= 3, height_segments >= 2".into(),
            ));
        }
        let o = &self.controls;
        // `!(min <= max)` also rejects NaN, which the controller's clamps cannot take.
        let limits = [
            ("polar angle", o.min_polar_angle, o.max_polar_angle),
            ("azimuth angle", o.min_azimuth_angle, o.max_azimuth_angle),
            ("distance", o.min_distance, o.max_distance),
        ];
        for (name, min, max) in limits {
            if !(min <= max) {
                return Err(ConfigError::Invalid(format!(
                    "controls {name} limits min={min} max={max} must satisfy min <= max"
                )));
            }
        }
        if !(0.0..=1.0).contains(&o.damping_factor) {
            return Err(ConfigError::Invalid(format!(
                "controls.damping_factor {} out of [0, 1]",
                o.damping_factor
            )));
        }
        Ok(())
    }
}
