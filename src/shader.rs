//! WGSL for the preview host's single pipeline.
//!
//! Vertices arrive in pixel coordinates; the vertex stage maps them to NDC
//! with the viewport uniform. The fragment stage applies a radial soft
//! edge driven by the quad-local `uv`: billboards span [-1, 1] and feather
//! out toward their rim, strip vertices carry (0, 0) and stay solid.

pub const SHADER_SOURCE: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let ndc = vec2<f32>(
        in.position.x / uniforms.viewport.x * 2.0 - 1.0,
        1.0 - in.position.y / uniforms.viewport.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    let falloff = 1.0 - smoothstep(0.35, 1.0, dist);
    return vec4<f32>(in.color.rgb, in.color.a * falloff);
}
"#;
