/// WGSL shader for standard (glTF metallic-roughness) materials.
///
/// Lighting is ambient plus one directional light. When an environment
/// texture is bound (`frame.environment.w == 1`), its mean color adds a flat
/// irradiance term and the equirectangular map is sampled along the
/// reflection vector.
pub const MODEL_SHADER: &str = r#"
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

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;
@group(0) @binding(1)
var env_texture: texture_2d<f32>;
@group(0) @binding(2)
var env_sampler: sampler;

@group(1) @binding(0)
var<uniform> draw: DrawUniforms;

@group(2) @binding(0)
var base_texture: texture_2d<f32>;
@group(2) @binding(1)
var base_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

const PI: f32 = 3.14159265359;

fn equirect_uv(dir: vec3<f32>) -> vec2<f32> {
    let u = atan2(dir.z, dir.x) / (2.0 * PI) + 0.5;
    let v = 0.5 - asin(clamp(dir.y, -1.0, 1.0)) / PI;
    return vec2<f32>(u, v);
}

@vertex
fn vs_model(vertex: VertexInput) -> VertexOutput {
    let world = draw.model * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = (draw.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_model(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = draw.base_color * textureSample(base_texture, base_sampler, in.uv);
    let n = normalize(in.world_normal);
    let metallic = draw.material.x;
    let roughness = draw.material.y;

    let diffuse = max(dot(n, frame.light_direction.xyz), 0.0) * frame.light_color.rgb;
    var lit = base.rgb * (frame.ambient.rgb + diffuse * (1.0 - 0.5 * metallic));

    if frame.environment.w > 0.5 {
        let view_dir = normalize(in.world_position - frame.camera_position.xyz);
        let r = reflect(view_dir, n);
        let env = textureSampleLevel(env_texture, env_sampler, equirect_uv(r), 0.0).rgb;
        let reflectivity = mix(0.04, 1.0, metallic) * (1.0 - roughness);
        lit = lit + base.rgb * frame.environment.rgb * (1.0 - metallic);
        lit = mix(lit, env * base.rgb, reflectivity);
    }

    return vec4<f32>(lit, base.a);
}
"#;

pub const MODEL_VERTEX_ENTRY: &str = "vs_model";
pub const MODEL_FRAGMENT_ENTRY: &str = "fs_model";

#[cfg(test)]
mod tests {
    use super::*;

    fn block<'a>(src: &'a str, name: &str) -> &'a str {
        let start = src.find(&format!("struct {name} {{")).unwrap();
        let end = start + src[start..].find("};").unwrap();
        &src[start..end]
    }

    #[test]
    fn uniform_blocks_match_sphere_shader() {
        let sphere = showroom_shader::SPHERE_SHADER;
        for name in ["FrameUniforms", "DrawUniforms"] {
            assert_eq!(block(MODEL_SHADER, name), block(sphere, name), "{name} differs");
        }
    }

    #[test]
    fn entry_points_present() {
        assert!(MODEL_SHADER.contains(&format!("fn {MODEL_VERTEX_ENTRY}(")));
        assert!(MODEL_SHADER.contains(&format!("fn {MODEL_FRAGMENT_ENTRY}(")));
    }
}
