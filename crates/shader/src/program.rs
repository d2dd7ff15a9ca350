use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

const BASE: Vec3 = Vec3::ONE;
const RIM_LAVENDER: Vec3 = Vec3::new(0.9, 0.8, 1.0);
const WAVE_PINK: Vec3 = Vec3::new(1.0, 0.6, 0.8);
const SWIRL_LAVENDER: Vec3 = Vec3::new(0.8, 0.6, 1.0);

/// GPU layout of the program's uniform block, padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TimeUniform {
    pub time: f32,
    _pad: [f32; 3],
}

impl TimeUniform {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            _pad: [0.0; 3],
        }
    }
}

/// The sphere's shader program: one `time` uniform and the two stage functions.
///
/// `vertex` and `fragment` are the CPU reference of the WGSL in
/// [`crate::SPHERE_SHADER`]; both are pure in their inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShaderProgram {
    time: f32,
}

impl ShaderProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn uniform(&self) -> TimeUniform {
        TimeUniform::new(self.time)
    }

    /// Clip-space position of a vertex.
    pub fn vertex(projection: Mat4, model_view: Mat4, position: Vec3) -> Vec4 {
        projection * model_view * position.extend(1.0)
    }

    /// Surface color at texture coordinate `uv` for the current time.
    pub fn fragment(&self, uv: Vec2) -> Vec4 {
        fragment_color(uv, self.time).extend(1.0)
    }
}

/// Sequential blend of white toward the rim, wave and swirl tones.
pub fn fragment_color(uv: Vec2, time: f32) -> Vec3 {
    let mut color = BASE;

    let radial_dist = (uv - Vec2::splat(0.5)).length();
    color = mix(color, RIM_LAVENDER, smoothstep(0.3, 0.5, radial_dist));

    let wave = (uv.y * 10.0 + time * 3.0).sin();
    color = mix(color, WAVE_PINK, smoothstep(0.48, 0.52, wave));

    let swirl = ((uv.x + uv.y) * 10.0 + time * 2.0).sin();
    mix(color, SWIRL_LAVENDER, smoothstep(0.48, 0.52, swirl))
}

/// Hermite interpolation between two edges, as in GLSL/WGSL.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn smoothstep_edges() {
        assert_eq!(smoothstep(0.3, 0.5, 0.0), 0.0);
        assert_eq!(smoothstep(0.3, 0.5, 0.3), 0.0);
        assert_eq!(smoothstep(0.3, 0.5, 0.5), 1.0);
        assert_eq!(smoothstep(0.3, 0.5, 0.9), 1.0);
        assert!((smoothstep(0.3, 0.5, 0.4) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn center_at_time_zero_is_white() {
        // uv.y * 10 = 5 gives sin(5) < 0; swirl sin(10) < 0; radial 0.
        let c = fragment_color(Vec2::new(0.5, 0.5), 0.0);
        assert!(close(c, Vec3::ONE));
    }

    #[test]
    fn corner_takes_rim_tone() {
        // Radial distance ~0.707 saturates the rim blend; wave sin(0) = 0 and
        // swirl sin(0) = 0 both stay below the 0.48 band.
        let c = fragment_color(Vec2::new(0.0, 0.0), 0.0);
        assert!(close(c, RIM_LAVENDER));
    }

    #[test]
    fn wave_crest_turns_pink() {
        // uv.y * 10 = pi/2 puts the wave at its crest. With uv.x = 0.5 - pi/20
        // the swirl phase is 5.0, where sin is negative.
        let y = std::f32::consts::FRAC_PI_2 / 10.0;
        let x = 0.5 - y;
        let radial = (Vec2::new(x, y) - Vec2::splat(0.5)).length();
        let rim = mix(Vec3::ONE, RIM_LAVENDER, smoothstep(0.3, 0.5, radial));
        let expected = mix(rim, WAVE_PINK, 1.0);
        assert!(close(fragment_color(Vec2::new(x, y), 0.0), expected));
    }

    #[test]
    fn deterministic_for_fixed_time() {
        let program = {
            let mut p = ShaderProgram::new();
            p.set_time(3.25);
            p
        };
        for i in 0..=16 {
            for j in 0..=16 {
                let uv = Vec2::new(i as f32 / 16.0, j as f32 / 16.0);
                assert_eq!(program.fragment(uv), program.fragment(uv));
                assert_eq!(program.fragment(uv).w, 1.0);
            }
        }
    }

    #[test]
    fn time_shifts_the_pattern() {
        let uv = Vec2::new(0.2, 0.3);
        let a = fragment_color(uv, 0.0);
        let period = std::f32::consts::TAU;
        // Both phases (3t and 2t) complete whole cycles at t = 2 pi.
        let b = fragment_color(uv, period);
        assert!((a - b).abs().max_element() < 1e-3);
        let c = fragment_color(uv, 1.6);
        assert_ne!(a, c);
    }

    #[test]
    fn uniform_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<TimeUniform>(), 16);
        let mut p = ShaderProgram::new();
        p.set_time(1.5);
        assert_eq!(p.uniform().time, 1.5);
    }

    #[test]
    fn vertex_applies_model_view_then_projection() {
        let model_view = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
        let clip = ShaderProgram::vertex(Mat4::IDENTITY, model_view, Vec3::ZERO);
        assert_eq!(clip, Vec4::new(0.0, 0.0, -10.0, 1.0));
    }
}
