/// WGSL shader for the instanced, point-lit boxes.
///
/// Writes the lit color to target 0 and the raw emissive color to target 1,
/// which feeds the glow blur.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // xyz = position, w = intensity
    light: vec4<f32>,
    // x = specular power
    material: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

struct FragmentOutput {
    @location(0) color: vec4<f32>,
    @location(1) emissive: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> FragmentOutput {
    let n = normalize(in.world_normal);
    let l = normalize(uniforms.light.xyz - in.world_pos);
    let v = normalize(uniforms.camera_pos.xyz - in.world_pos);
    let h = normalize(l + v);
    let intensity = uniforms.light.w;

    let ndl = max(dot(n, l), 0.0);
    var specular = 0.0;
    if ndl > 0.0 {
        specular = pow(max(dot(n, h), 0.0), uniforms.material.x);
    }

    // emissive + diffuse + specular, diffuse and emissive share the box color
    let base = in.color.rgb;
    let lit = base + base * ndl * intensity + vec3<f32>(specular * intensity);

    var out: FragmentOutput;
    out.color = vec4<f32>(clamp(lit, vec3<f32>(0.0), vec3<f32>(1.0)), 1.0);
    out.emissive = vec4<f32>(base, 1.0);
    return out;
}
"#;

/// Fullscreen triangle shared by the screen-space passes.
const FULLSCREEN_VS: &str = r#"
struct ScreenOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_screen(@builtin(vertex_index) index: u32) -> ScreenOutput {
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: ScreenOutput;
    out.position = vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(corner.x, 1.0 - corner.y);
    return out;
}
"#;

const BLUR_FS: &str = r#"
struct BlurParams {
    texel_size: vec2<f32>,
    direction: vec2<f32>,
    radius: i32,
    _pad0: i32,
    _pad1: i32,
    _pad2: i32,
};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: BlurParams;

@fragment
fn fs_blur(in: ScreenOutput) -> @location(0) vec4<f32> {
    let sigma = max(f32(params.radius) * 0.5, 1.0);
    let texel_step = params.texel_size * params.direction;
    var sum = vec3<f32>(0.0);
    var total = 0.0;
    for (var i = -params.radius; i <= params.radius; i = i + 1) {
        let x = f32(i);
        let w = exp(-(x * x) / (2.0 * sigma * sigma));
        sum = sum + textureSample(source, source_sampler, in.uv + texel_step * x).rgb * w;
        total = total + w;
    }
    return vec4<f32>(sum / total, 1.0);
}
"#;

const COMPOSITE_FS: &str = r#"
struct CompositeParams {
    // scale x, scale y, centre offset x, centre offset y
    vignette1: vec4<f32>,
    // rgb color, power
    vignette2: vec4<f32>,
    // distortion, chromatic aberration (px), 1/width, 1/height
    lens: vec4<f32>,
    // glow intensity, gamma, vignette enabled, unused
    misc: vec4<f32>,
};

@group(0) @binding(0) var scene_tex: texture_2d<f32>;
@group(0) @binding(1) var glow_tex: texture_2d<f32>;
@group(0) @binding(2) var linear_sampler: sampler;
@group(0) @binding(3) var<uniform> params: CompositeParams;

fn distort(uv: vec2<f32>) -> vec2<f32> {
    let centered = uv - vec2<f32>(0.5);
    let r2 = dot(centered, centered);
    return vec2<f32>(0.5) + centered * (1.0 + params.lens.x * r2);
}

@fragment
fn fs_composite(in: ScreenOutput) -> @location(0) vec4<f32> {
    let uv = distort(in.uv);
    let centered = uv - vec2<f32>(0.5);
    let edge = length(centered) * 2.0;
    var dir = vec2<f32>(0.0);
    if edge > 0.0 {
        dir = normalize(centered);
    }
    let shift = dir * params.lens.y * edge * params.lens.zw;

    var color = vec3<f32>(
        textureSample(scene_tex, linear_sampler, uv + shift).r,
        textureSample(scene_tex, linear_sampler, uv).g,
        textureSample(scene_tex, linear_sampler, uv - shift).b,
    );
    color = color + textureSample(glow_tex, linear_sampler, uv).rgb * params.misc.x;

    if params.misc.z > 0.5 {
        let xy = in.uv * 2.0 - 1.0;
        let v = vec3<f32>(xy * params.vignette1.xy + params.vignette1.zw, 1.0);
        let falloff = pow(dot(v, v), params.vignette2.w);
        color = color * mix(params.vignette2.rgb, vec3<f32>(1.0), falloff);
    }

    color = pow(clamp(color, vec3<f32>(0.0), vec3<f32>(1.0)), vec3<f32>(params.misc.y));
    return vec4<f32>(color, 1.0);
}
"#;

/// Separable Gaussian blur over a fullscreen triangle.
pub fn blur_shader() -> String {
    format!("{FULLSCREEN_VS}\n{BLUR_FS}")
}

/// Lens distortion, glow add, vignette and gamma.
pub fn composite_shader() -> String {
    format!("{FULLSCREEN_VS}\n{COMPOSITE_FS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_shaders_share_the_fullscreen_stage() {
        assert!(blur_shader().contains("fn vs_screen"));
        assert!(blur_shader().contains("fn fs_blur"));
        assert!(composite_shader().contains("fn vs_screen"));
        assert!(composite_shader().contains("fn fs_composite"));
    }

    #[test]
    fn scene_shader_writes_two_targets() {
        assert!(SCENE_SHADER.contains("@location(0) color"));
        assert!(SCENE_SHADER.contains("@location(1) emissive"));
    }
}
