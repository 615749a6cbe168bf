/// Scene uniform shared by the shadow and main programs. Matches `SceneUniform`.
const SCENE_STRUCT: &str = r#"
struct Scene {
    camera_view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    light_dir: vec3<f32>,
    time: f32,
    target_size: vec2<f32>,
    camera_pos: vec3<f32>,
};

struct Model {
    transform: mat4x4<f32>,
    aabb_min: vec3<f32>,
    aabb_max: vec3<f32>,
};
"#;

/// Depth-only program for the shadow pass.
const SHADOW_BODY: &str = r#"
@group(0) @binding(0) var<uniform> scene: Scene;
@group(1) @binding(0) var<uniform> model: Model;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return scene.light_view_proj * model.transform * vec4<f32>(position, 1.0);
}
"#;

/// Flat-shaded program for the main pass.
const MAIN_BODY: &str = r#"
@group(0) @binding(0) var<uniform> scene: Scene;
@group(0) @binding(1) var shadow_map: texture_depth_2d;
@group(0) @binding(2) var shadow_sampler: sampler_comparison;
@group(0) @binding(3) var procedural_tex: texture_2d<f32>;
@group(0) @binding(4) var procedural_sampler: sampler;
@group(1) @binding(0) var<uniform> model: Model;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) shadow_pos: vec3<f32>,
    @location(1) @interpolate(flat) normal: vec3<f32>,
    @location(2) @interpolate(flat) color: vec3<f32>,
    @location(3) world_pos: vec3<f32>,
};

fn water_displace(pos: vec3<f32>) -> vec3<f32> {
    let t = scene.time * 0.004;
    let xt = pos.x + t;
    let zt = pos.z + t;
    let y = sin(xt * 0.2)
        + cos((zt * 2.0 + xt) * 0.1) * 2.0
        + cos((zt * 0.5 + xt * 0.2) * 0.2) * 4.0
        + sin((xt * 0.5 + zt) * 0.9) * 0.2
        + sin((xt - zt * 0.5) * 0.7) * 0.1;
    return vec3<f32>(0.0, y, 0.0);
}

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) kind: u32,
) -> VertexOutput {
    var pos = position;
    var norm = normal;
    if (kind == 1u) {
        let left = vec3<f32>(position.x - 1.0, position.y, position.z);
        let back = vec3<f32>(position.x, position.y, position.z - 1.0);
        pos = position + water_displace(position);
        let pos_l = left + water_displace(left);
        let pos_b = back + water_displace(back);
        norm = normalize(cross(pos_b - pos, pos_l - pos));
    }

    let world_pos = model.transform * vec4<f32>(pos, 1.0);
    let from_light = scene.light_view_proj * world_pos;

    var out: VertexOutput;
    // Light clip XY to texture UV; V points down.
    out.shadow_pos = vec3<f32>(
        from_light.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5),
        from_light.z,
    );
    out.position = scene.camera_view_proj * world_pos;
    out.normal = normalize((model.transform * vec4<f32>(norm, 0.0)).xyz);
    out.color = color;
    out.world_pos = world_pos.xyz;
    return out;
}

fn quantize(n: vec3<f32>, step: f32) -> vec3<f32> {
    return floor(n / step) * step;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let shadow_vis = textureSampleCompare(shadow_map, shadow_sampler, in.shadow_pos.xy, in.shadow_pos.z - 0.007);
    let sun = shadow_vis * clamp(dot(-scene.light_dir, in.normal), 0.0, 1.0);

    let screen_uv = in.position.xy / scene.target_size;
    let procedural = quantize(textureSample(procedural_tex, procedural_sampler, screen_uv).rgb, 0.1);

    let lit = in.color * (sun * 2.0 + 0.2) + procedural * 0.02;
    return vec4<f32>(pow(lit, vec3<f32>(1.0 / 2.2)), 1.0);
}
"#;

/// Fullscreen procedural texture, a pure function of time.
pub const PROCEDURAL_SHADER: &str = r#"
struct Procedural {
    time: f32,
};

@group(0) @binding(0) var<uniform> procedural: Procedural;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// One triangle covering the whole target.
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let xy = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u)) * 2.0 - 1.0;
    var out: VertexOutput;
    out.position = vec4<f32>(xy, 0.0, 1.0);
    out.uv = xy * 0.5 + 0.5;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let t = procedural.time * 0.001;
    let r = in.uv.x;
    let g = in.uv.y;
    let b = 0.5 + 0.5 * sin(t + (in.uv.x + in.uv.y) * 6.2831853);
    return vec4<f32>(r, g, b, 1.0);
}
"#;

pub fn shadow_shader() -> String {
    format!("{SCENE_STRUCT}{SHADOW_BODY}")
}

pub fn main_shader() -> String {
    format!("{SCENE_STRUCT}{MAIN_BODY}")
}
