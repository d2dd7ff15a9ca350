use glam::Vec3;
use showroom_common::Color;

/// Uniform light applied equally to every surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }

    pub fn radiance(&self) -> Color {
        self.color.scaled(self.intensity)
    }
}

/// Light shining from the node's world position toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            target: Vec3::ZERO,
        }
    }

    pub fn radiance(&self) -> Color {
        self.color.scaled(self.intensity)
    }

    /// Unit vector from the target toward the light, given the light's world position.
    pub fn direction_to_light(&self, world_position: Vec3) -> Vec3 {
        (world_position - self.target).try_normalize().unwrap_or(Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_from_target_to_light() {
        let light = DirectionalLight::new(Color::WHITE, 1.0);
        let dir = light.direction_to_light(Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(dir, Vec3::Y);
    }

    #[test]
    fn coincident_light_falls_back_to_up() {
        let light = DirectionalLight::new(Color::WHITE, 1.0);
        assert_eq!(light.direction_to_light(Vec3::ZERO), Vec3::Y);
    }

    #[test]
    fn radiance_scales_by_intensity() {
        let ambient = AmbientLight::new(Color::WHITE, 0.5);
        assert_eq!(ambient.radiance(), Color::new(0.5, 0.5, 0.5));
    }
}
