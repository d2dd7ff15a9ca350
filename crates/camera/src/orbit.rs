use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use showroom_common::Viewport;
use std::f32::consts::{PI, TAU};

use crate::camera::PerspectiveCamera;
use crate::input::{PointerButton, PointerInput};

const EPS: f32 = 1e-6;

/// Orbit controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Polar angle window, radians from +Y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Azimuth window, radians around +Y measured from +Z.
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: false,
            enable_pan: false,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_polar_angle: PI / 3.0,
            max_polar_angle: PI / 1.5,
            min_azimuth_angle: -PI / 4.0,
            max_azimuth_angle: PI / 4.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Rotate,
    Pan,
    Dolly,
}

/// Spherical coordinates around the target.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, zero along +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Damped orbit controller around a fixed target.
///
/// Pointer motion accumulates a pending rotation; [`update`](Self::update)
/// applies a fraction of it each frame when damping is on and clamps the
/// result to the angular window.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    camera: PerspectiveCamera,
    settings: OrbitSettings,
    spherical: Spherical,
    delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
    drag: DragState,
    viewport_height: f32,
}

impl OrbitControls {
    pub fn new(camera: PerspectiveCamera, settings: OrbitSettings) -> Self {
        let spherical = Spherical::from_offset(camera.position - camera.target);
        let mut controls = Self {
            camera,
            settings,
            spherical,
            delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            drag: DragState::Idle,
            viewport_height: 1.0,
        };
        controls.update();
        controls
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    pub fn azimuthal_angle(&self) -> f32 {
        self.spherical.theta
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != DragState::Idle
    }

    /// Track the viewport: aspect ratio for projection, height for drag scaling.
    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.camera.aspect = viewport.aspect();
        self.viewport_height = viewport.height.max(1) as f32;
    }

    /// Feed one pointer event. Returns whether the controller consumed it.
    pub fn handle(&mut self, input: PointerInput) -> bool {
        match input {
            PointerInput::Down(button) => {
                self.drag = match button {
                    PointerButton::Primary if self.settings.enable_rotate => DragState::Rotate,
                    PointerButton::Secondary if self.settings.enable_pan => DragState::Pan,
                    PointerButton::Middle if self.settings.enable_zoom => DragState::Dolly,
                    _ => DragState::Idle,
                };
                self.drag != DragState::Idle
            }
            PointerInput::Up(_) | PointerInput::Cancel => {
                let was_dragging = self.is_dragging();
                self.drag = DragState::Idle;
                was_dragging
            }
            PointerInput::Moved(delta) => match self.drag {
                DragState::Idle => false,
                DragState::Rotate => {
                    self.rotate(delta);
                    true
                }
                DragState::Pan => {
                    self.pan(delta);
                    true
                }
                DragState::Dolly => {
                    self.dolly(-delta.y);
                    true
                }
            },
            PointerInput::Wheel(amount) => {
                if !self.settings.enable_zoom {
                    return false;
                }
                self.dolly(amount);
                true
            }
        }
    }

    fn rotate(&mut self, delta: Vec2) {
        let k = TAU * self.settings.rotate_speed / self.viewport_height;
        self.delta.theta -= delta.x * k;
        self.delta.phi -= delta.y * k;
    }

    fn pan(&mut self, delta: Vec2) {
        let view = self.camera.view_matrix().inverse();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();
        let world_per_pixel =
            2.0 * self.spherical.radius * (self.camera.fov / 2.0).tan() / self.viewport_height;
        let k = world_per_pixel * self.settings.pan_speed;
        self.pan_offset += -right * delta.x * k + up * delta.y * k;
    }

    fn dolly(&mut self, amount: f32) {
        let step = 0.95_f32.powf(self.settings.zoom_speed);
        if amount > 0.0 {
            self.scale *= step;
        } else if amount < 0.0 {
            self.scale /= step;
        }
    }

    /// Apply pending input to the camera. Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        let s = &self.settings;
        let before = self.camera.position;
        let factor = if s.enable_damping { s.damping_factor } else { 1.0 };

        self.spherical.theta += self.delta.theta * factor;
        self.spherical.phi += self.delta.phi * factor;

        if s.min_azimuth_angle.is_finite() && s.max_azimuth_angle.is_finite() {
            self.spherical.theta = self
                .spherical
                .theta
                .clamp(s.min_azimuth_angle, s.max_azimuth_angle);
        }
        self.spherical.phi = self
            .spherical
            .phi
            .clamp(s.min_polar_angle, s.max_polar_angle)
            .clamp(EPS, PI - EPS);

        self.spherical.radius =
            (self.spherical.radius * self.scale).clamp(s.min_distance, s.max_distance);

        self.camera.target += self.pan_offset * factor;
        self.camera.position = self.camera.target + self.spherical.to_offset();

        if s.enable_damping {
            self.delta.theta *= 1.0 - s.damping_factor;
            self.delta.phi *= 1.0 - s.damping_factor;
            self.pan_offset *= 1.0 - s.damping_factor;
        } else {
            self.delta.theta = 0.0;
            self.delta.phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = (self.camera.position - before).length_squared() > EPS;
        if moved {
            tracing::trace!(
                polar = self.spherical.phi,
                azimuth = self.spherical.theta,
                "camera moved"
            );
        }
        moved
    }
}
