/// WGSL source of the animated sphere.
///
/// Bind groups follow the renderer layout: group 0 holds the per-frame
/// camera block, group 1 the per-draw model matrix, group 2 the program's
/// own `time` uniform.
pub const SPHERE_SHADER: &str = r#"
struct FrameUniforms {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_direction: vec4<f32>,
    light_color: vec4<f32>,
    environment: vec4<f32>,
};

struct DrawUniforms {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    base_color: vec4<f32>,
    material: vec4<f32>,
};

struct ShaderUniforms {
    time: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

@group(1) @binding(0)
var<uniform> draw: DrawUniforms;

@group(2) @binding(0)
var<uniform> program: ShaderUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_sphere(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.uv = vertex.uv;
    out.clip_position = frame.view_proj * draw.model * vec4<f32>(vertex.position, 1.0);
    return out;
}

@fragment
fn fs_sphere(in: VertexOutput) -> @location(0) vec4<f32> {
    var color = vec3<f32>(1.0);

    let radial_dist = length(in.uv - vec2<f32>(0.5, 0.5));
    color = mix(color, vec3<f32>(0.9, 0.8, 1.0), smoothstep(0.3, 0.5, radial_dist));

    let wave = sin(in.uv.y * 10.0 + program.time * 3.0);
    color = mix(color, vec3<f32>(1.0, 0.6, 0.8), smoothstep(0.48, 0.52, wave));

    let swirl = sin((in.uv.x + in.uv.y) * 10.0 + program.time * 2.0);
    color = mix(color, vec3<f32>(0.8, 0.6, 1.0), smoothstep(0.48, 0.52, swirl));

    return vec4<f32>(color, 1.0);
}
"#;

pub const VERTEX_ENTRY: &str = "vs_sphere";
pub const FRAGMENT_ENTRY: &str = "fs_sphere";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_present() {
        assert!(SPHERE_SHADER.contains(&format!("fn {VERTEX_ENTRY}(")));
        assert!(SPHERE_SHADER.contains(&format!("fn {FRAGMENT_ENTRY}(")));
    }

    #[test]
    fn blend_constants_match_reference() {
        for needle in [
            "smoothstep(0.3, 0.5, radial_dist)",
            "program.time * 3.0",
            "program.time * 2.0",
            "vec3<f32>(0.9, 0.8, 1.0)",
            "vec3<f32>(1.0, 0.6, 0.8)",
            "vec3<f32>(0.8, 0.6, 1.0)",
        ] {
            assert!(SPHERE_SHADER.contains(needle), "missing {needle}");
        }
    }
}
