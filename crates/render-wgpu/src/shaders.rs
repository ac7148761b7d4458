/// WGSL shader for instanced node spheres, including the glow entry points.
pub const NODE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) center: vec3<f32>,
    @location(3) scale: f32,
    @location(4) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

fn node_world(vertex: VertexInput, instance: InstanceInput, scale: f32) -> VertexOutput {
    let local = instance.center + vertex.position * instance.scale * scale;
    let world_pos = uniforms.model * vec4<f32>(local, 1.0);
    let world_normal = (uniforms.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

@vertex
fn vs_node(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    return node_world(vertex, instance, 1.0);
}

@fragment
fn fs_node(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let diffuse = max(dot(in.world_normal, light_dir), 0.0);
    let lighting = 0.4 + diffuse * 0.6;
    return vec4<f32>(in.color.rgb * lighting * in.color.a, in.color.a);
}

// Glow: the same instances drawn inflated with a faint additive shell.

@vertex
fn vs_glow(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    return node_world(vertex, instance, 1.9);
}

@fragment
fn fs_glow(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color.rgb * 0.12 * in.color.a, 0.0);
}
"#;

/// WGSL shader for the batched edge lines.
pub const EDGE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct EdgeVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct EdgeOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_edge(vertex: EdgeVertex) -> EdgeOutput {
    var out: EdgeOutput;
    out.clip_position = uniforms.view_proj * uniforms.model * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_edge(in: EdgeOutput) -> @location(0) vec4<f32> {
    // Additive target: alpha rides in the color, opacity overshoot is
    // clamped by the blend, not here.
    return vec4<f32>(in.color.rgb * in.color.a, 0.0);
}
"#;
