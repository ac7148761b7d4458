use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use synapse_common::Color;
use synapse_render::{Frustum, LodBands, LodLevel, RenderView};
use synapse_scene::{AnimationParams, SceneGraph};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct NodeInstance {
    center: [f32; 3],
    scale: f32,
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct EdgeVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Generate a unit UV sphere.
fn sphere_mesh(sectors: u32, stacks: u32) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    for stack in 0..=stacks {
        let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
        for sector in 0..=sectors {
            let theta = std::f32::consts::TAU * sector as f32 / sectors as f32;
            let p = [
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            ];
            vertices.push(Vertex {
                position: p,
                normal: p,
            });
        }
    }

    let ring = sectors + 1;
    for stack in 0..stacks {
        for sector in 0..sectors {
            let a = (stack * ring + sector) as u16;
            let b = a + ring as u16;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

/// Geometry detail per LOD level. `Far` is little more than a blob.
fn sphere_detail(level: LodLevel) -> (u32, u32) {
    match level {
        LodLevel::Near => (16, 12),
        LodLevel::Mid => (10, 7),
        LodLevel::Far => (6, 4),
    }
}

struct SphereMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl SphereMesh {
    fn new(device: &wgpu::Device, level: LodLevel) -> Self {
        let (sectors, stacks) = sphere_detail(level);
        let (vertices, indices) = sphere_mesh(sectors, stacks);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("node_sphere_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("node_sphere_indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Per-frame draw statistics for the performance overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    pub nodes_drawn: usize,
    pub nodes_culled: usize,
    pub edges_drawn: usize,
    pub glow_pass: bool,
    /// Instances per LOD bin (near, mid, far).
    pub lod_bins: [usize; 3],
}

/// wgpu-based scene renderer.
///
/// All nodes of one LOD bin go through a single instanced draw; all edges
/// go through a single line-list draw. Everything blends additively, which
/// is what implicitly clamps the overshooting edge opacities.
pub struct WgpuSceneRenderer {
    node_pipeline: wgpu::RenderPipeline,
    glow_pipeline: wgpu::RenderPipeline,
    edge_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: [SphereMesh; 3],
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    edge_vertex_buffer: wgpu::Buffer,
    max_edge_vertices: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    background: wgpu::Color,
    color1: Color,
    color2: Color,
    lod_bands: LodBands,
}

impl WgpuSceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        background: wgpu::Color,
        color1: Color,
        color2: Color,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                model: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let node_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("node_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::NODE_SHADER.into()),
        });

        let node_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                ],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<NodeInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    2 => Float32x3,
                    3 => Float32,
                    4 => Float32x4,
                ],
            },
        ];

        let make_node_pipeline = |label: &str, vs: &str, fs: &str, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &node_shader,
                    entry_point: Some(vs),
                    compilation_options: Default::default(),
                    buffers: &node_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &node_shader,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(additive),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let node_pipeline = make_node_pipeline("node_pipeline", "vs_node", "fs_node", true);
        let glow_pipeline = make_node_pipeline("glow_pipeline", "vs_glow", "fs_glow", false);

        let edge_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("edge_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::EDGE_SHADER.into()),
        });

        let edge_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("edge_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &edge_shader,
                entry_point: Some("vs_edge"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<EdgeVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &edge_shader,
                entry_point: Some("fs_edge"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let meshes = [
            SphereMesh::new(device, LodLevel::Near),
            SphereMesh::new(device, LodLevel::Mid),
            SphereMesh::new(device, LodLevel::Far),
        ];

        let max_instances = 512u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("node_instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<NodeInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let max_edge_vertices = 4096u32;
        let edge_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("edge_vertex_buffer"),
            size: (max_edge_vertices as u64) * std::mem::size_of::<EdgeVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(format = ?surface_format, "scene renderer ready");

        Self {
            node_pipeline,
            glow_pipeline,
            edge_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes,
            instance_buffer,
            max_instances,
            edge_vertex_buffer,
            max_edge_vertices,
            depth_texture,
            surface_format,
            background,
            color1,
            color2,
            lod_bands: LodBands::default(),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: edge batch, node batch per LOD bin, optional glow.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView,
        scene: &SceneGraph,
        params: &AnimationParams,
    ) -> RenderStats {
        let (drift_x, drift_y) = scene.drift_angles();
        let model = Mat4::from_rotation_y(drift_y) * Mat4::from_rotation_x(drift_x);
        let view_proj = view.view_projection();

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view_proj.to_cols_array_2d(),
                model: model.to_cols_array_2d(),
            }),
        );

        // Cull and LOD-select in the scene's local space: fold the drift
        // into the frustum and bring the eye back through the inverse.
        let frustum = Frustum::from_view_projection(&(view_proj * model));
        let local_eye = model.inverse().transform_point3(view.eye);

        let mut bins: [Vec<NodeInstance>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut culled = 0usize;
        for (i, node) in scene.nodes().iter().enumerate() {
            let scale = scene.node_render_size(i, params);
            // Glow inflates the silhouette; cull against the inflated bound.
            if !frustum.contains_sphere(node.position, scale * 2.0) {
                culled += 1;
                continue;
            }
            let level = self.lod_bands.select(local_eye.distance(node.position));
            let pulse = scene.node_pulse(i, params);
            let color = self
                .color1
                .lerp(self.color2, node.base_strength)
                .with_alpha(0.4 + 0.6 * pulse);
            let bin = match level {
                LodLevel::Near => &mut bins[0],
                LodLevel::Mid => &mut bins[1],
                LodLevel::Far => &mut bins[2],
            };
            bin.push(NodeInstance {
                center: node.position.to_array(),
                scale,
                color,
            });
        }

        let lod_counts = [bins[0].len(), bins[1].len(), bins[2].len()];
        let mut instances: Vec<NodeInstance> = Vec::with_capacity(
            lod_counts.iter().sum::<usize>().min(self.max_instances as usize),
        );
        for bin in &bins {
            for instance in bin {
                if instances.len() >= self.max_instances as usize {
                    break;
                }
                instances.push(*instance);
            }
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut edge_vertices: Vec<EdgeVertex> = Vec::with_capacity(scene.edge_count() * 2);
        for (i, edge) in scene.edges().iter().enumerate() {
            if edge_vertices.len() + 2 > self.max_edge_vertices as usize {
                break;
            }
            let opacity = scene.edge_opacity(i, params);
            let color = self
                .color1
                .lerp(self.color2, edge.strength)
                .with_alpha(opacity);
            edge_vertices.push(EdgeVertex {
                position: scene.nodes()[edge.a].position.to_array(),
                color,
            });
            edge_vertices.push(EdgeVertex {
                position: scene.nodes()[edge.b].position.to_array(),
                color,
            });
        }
        if !edge_vertices.is_empty() {
            queue.write_buffer(
                &self.edge_vertex_buffer,
                0,
                bytemuck::cast_slice(&edge_vertices),
            );
        }

        let glow_pass = scene.tier().glow_enabled();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Edges first so node bodies read on top of the web.
            if !edge_vertices.is_empty() {
                pass.set_pipeline(&self.edge_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.edge_vertex_buffer.slice(..));
                pass.draw(0..edge_vertices.len() as u32, 0..1);
            }

            if !instances.is_empty() {
                self.draw_node_bins(&mut pass, &self.node_pipeline, &lod_counts);
                if glow_pass {
                    self.draw_node_bins(&mut pass, &self.glow_pipeline, &lod_counts);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));

        RenderStats {
            nodes_drawn: instances.len(),
            nodes_culled: culled,
            edges_drawn: edge_vertices.len() / 2,
            glow_pass,
            lod_bins: lod_counts,
        }
    }

    /// One instanced draw per non-empty LOD bin, sharing one instance buffer.
    fn draw_node_bins(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &wgpu::RenderPipeline,
        lod_counts: &[usize; 3],
    ) {
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);

        let stride = std::mem::size_of::<NodeInstance>() as u64;
        let mut offset = 0usize;
        for (level, &count) in lod_counts.iter().enumerate() {
            let count = count.min(self.max_instances as usize - offset);
            if count == 0 {
                continue;
            }
            let mesh = &self.meshes[level];
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_vertex_buffer(
                1,
                self.instance_buffer
                    .slice(offset as u64 * stride..(offset + count) as u64 * stride),
            );
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..mesh.index_count, 0, 0..count as u32);
            offset += count;
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_mesh_is_watertight_sized() {
        let (vertices, indices) = sphere_mesh(16, 12);
        assert_eq!(vertices.len(), 17 * 13);
        assert_eq!(indices.len() as u32, 16 * 12 * 6);
        // All positions on the unit sphere.
        for v in &vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_detail_decreases_with_lod() {
        let near = sphere_detail(LodLevel::Near);
        let mid = sphere_detail(LodLevel::Mid);
        let far = sphere_detail(LodLevel::Far);
        assert!(near.0 > mid.0 && mid.0 > far.0);
        assert!(near.1 > mid.1 && mid.1 > far.1);
    }

    #[test]
    fn sphere_indices_fit_u16() {
        let (vertices, _) = sphere_mesh(16, 12);
        assert!(vertices.len() < u16::MAX as usize);
    }
}
