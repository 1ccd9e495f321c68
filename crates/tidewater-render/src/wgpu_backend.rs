//! wgpu implementation of [`RenderBackend`]
//!
//! Draws are recorded while a pass is open and encoded when it ends, so
//! the viewport and clip plane set by the orchestrator apply to the whole
//! pass the way they do on a stateful API. Each draw gets its own uniform
//! buffer and bind group.

use std::collections::HashMap;

use glam::Vec4;
use tidewater_geometry::{
    IndexedMesh, ModelPart, PositionVertex, RgbaImage, TangentVertex, TerrainMesh, TexturedVertex,
};
use tidewater_core::MAX_CASCADES;
use wgpu::util::DeviceExt;

use crate::backend::{
    ClearOp, DrawCall, MeshId, PassTarget, RenderBackend, TargetDesc, TargetId, Viewport,
};
use crate::context::{RenderContext, RenderError};
use crate::gpu_mesh::{GpuMesh, VertexKind};
use crate::params::ShaderParams;
use crate::pipelines::{
    DepthUniforms, MarkerUniforms, ModelUniforms, ScenePipelines, SkyboxUniforms,
    TerrainUniforms, WallUniforms, WaterUniforms, NO_CLIP,
};
use crate::textures::{self, GpuTarget, GpuTexture};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineKind {
    Skybox,
    Terrain,
    Model,
    DepthTerrain,
    DepthModel,
    Wall,
    Marker,
    Water,
}

impl PipelineKind {
    fn pipeline(self, pipelines: &ScenePipelines) -> &wgpu::RenderPipeline {
        match self {
            PipelineKind::Skybox => &pipelines.skybox,
            PipelineKind::Terrain => &pipelines.terrain,
            PipelineKind::Model => &pipelines.model,
            PipelineKind::DepthTerrain => &pipelines.depth_terrain,
            PipelineKind::DepthModel => &pipelines.depth_model,
            PipelineKind::Wall => &pipelines.wall,
            PipelineKind::Marker => &pipelines.marker,
            PipelineKind::Water => &pipelines.water,
        }
    }

    /// Vertex layout the pipeline reads
    fn vertex_kind(self) -> VertexKind {
        match self {
            PipelineKind::Skybox | PipelineKind::Marker => VertexKind::Position,
            PipelineKind::Terrain | PipelineKind::DepthTerrain => VertexKind::Terrain,
            PipelineKind::Model | PipelineKind::DepthModel => VertexKind::Model,
            PipelineKind::Wall => VertexKind::Wall,
            PipelineKind::Water => VertexKind::Water,
        }
    }
}

enum Binding {
    Owned(wgpu::BindGroup),
    /// The mesh's material bind group
    Material,
}

struct PendingDraw {
    pipeline: PipelineKind,
    mesh: MeshId,
    groups: Vec<Binding>,
    indexed: bool,
}

struct PendingPass {
    label: String,
    target: PassTarget,
    clear: ClearOp,
    viewport: Option<Viewport>,
    draws: Vec<PendingDraw>,
}

struct Frame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: Option<wgpu::CommandEncoder>,
}

/// Renders through wgpu into the window surface and off-screen targets
pub struct WgpuBackend {
    context: RenderContext,
    pipelines: ScenePipelines,
    meshes: Vec<GpuMesh>,
    targets: HashMap<TargetId, GpuTarget>,
    next_target: u32,
    placeholder_depth: (wgpu::Texture, wgpu::TextureView),
    shadow_sampler: wgpu::Sampler,
    target_sampler: wgpu::Sampler,
    viewport: Option<Viewport>,
    clip_plane: Option<Vec4>,
    frame: Option<Frame>,
    pass: Option<PendingPass>,
}

impl WgpuBackend {
    pub fn new(context: RenderContext) -> Self {
        let pipelines = ScenePipelines::new(&context.device, context.format());
        let placeholder_depth = textures::placeholder_depth(&context.device);
        let shadow_sampler = textures::shadow_sampler(&context.device);
        let target_sampler = textures::target_sampler(&context.device);

        Self {
            context,
            pipelines,
            meshes: Vec::new(),
            targets: HashMap::new(),
            next_target: 0,
            placeholder_depth,
            shadow_sampler,
            target_sampler,
            viewport: None,
            clip_plane: None,
            frame: None,
            pass: None,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.context.format()
    }

    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.context.resize(size);
    }

    fn push_mesh(&mut self, mesh: GpuMesh) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        log::debug!(
            "Uploaded mesh {} '{}' ({} vertices, {} indices)",
            id.0,
            mesh.label,
            mesh.vertex_count,
            mesh.index_count
        );
        self.meshes.push(mesh);
        id
    }

    fn material(
        &self,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        textures: &[&GpuTexture],
    ) -> wgpu::BindGroup {
        let mut entries: Vec<wgpu::BindGroupEntry> = textures
            .iter()
            .enumerate()
            .map(|(i, t)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(&t.view),
            })
            .collect();
        if let Some(first) = textures.first() {
            entries.push(wgpu::BindGroupEntry {
                binding: textures.len() as u32,
                resource: wgpu::BindingResource::Sampler(&first.sampler),
            });
        }
        self.context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} Material Bind Group", label)),
                layout,
                entries: &entries,
            })
    }

    /// Upload the terrain with its sand, grass and rock textures
    pub fn upload_terrain(
        &mut self,
        mesh: &TerrainMesh,
        images: [&RgbaImage; 3],
    ) -> Result<MeshId, RenderError> {
        let (device, queue) = (&self.context.device, &self.context.queue);
        let sand = textures::upload_image(device, queue, "Sand Texture", images[0], true)?;
        let grass = textures::upload_image(device, queue, "Grass Texture", images[1], true)?;
        let rock = textures::upload_image(device, queue, "Rock Texture", images[2], true)?;

        let material = self.material(
            "Terrain",
            &self.pipelines.terrain_material_layout,
            &[&sand, &grass, &rock],
        );
        let gpu = GpuMesh::new(device, "Terrain", &mesh.vertices, Some(&mesh.indices))
            .with_material(material);
        Ok(self.push_mesh(gpu))
    }

    /// Upload one model primitive. Parts without a texture sample white.
    pub fn upload_model_part(&mut self, name: &str, part: &ModelPart) -> Result<MeshId, RenderError> {
        let (device, queue) = (&self.context.device, &self.context.queue);
        let texture = match &part.base_color_texture {
            Some(image) => textures::upload_image(
                device,
                queue,
                &format!("{} Base Color", name),
                image,
                true,
            )?,
            None => textures::solid(device, queue, "White Texture", [255, 255, 255, 255]),
        };

        let material = self.material(name, &self.pipelines.model_material_layout, &[&texture]);
        let mut gpu = GpuMesh::new(device, name, &part.vertices, Some(&part.indices))
            .with_material(material);
        gpu.base_color = part.base_color;
        gpu.has_texture = part.base_color_texture.is_some();
        Ok(self.push_mesh(gpu))
    }

    /// Upload the water quad with its color, normal and distortion maps
    pub fn upload_water(
        &mut self,
        mesh: &IndexedMesh<TexturedVertex>,
        images: [&RgbaImage; 3],
    ) -> Result<MeshId, RenderError> {
        let (device, queue) = (&self.context.device, &self.context.queue);
        let color = textures::upload_image(device, queue, "Water Texture", images[0], true)?;
        let normal = textures::upload_image(device, queue, "Water Normal Map", images[1], false)?;
        let dudv = textures::upload_image(device, queue, "Water DuDv Map", images[2], false)?;

        let material = self.material(
            "Water",
            &self.pipelines.water_material_layout,
            &[&color, &normal, &dudv],
        );
        let gpu = GpuMesh::new(device, "Water", &mesh.vertices, Some(&mesh.indices))
            .with_material(material);
        Ok(self.push_mesh(gpu))
    }

    /// Upload the wall with its diffuse, normal and height maps
    pub fn upload_wall(
        &mut self,
        mesh: &IndexedMesh<TangentVertex>,
        images: [&RgbaImage; 3],
    ) -> Result<MeshId, RenderError> {
        let (device, queue) = (&self.context.device, &self.context.queue);
        let diffuse = textures::upload_image(device, queue, "Wall Diffuse", images[0], true)?;
        let normal = textures::upload_image(device, queue, "Wall Normal Map", images[1], false)?;
        let height = textures::upload_image(device, queue, "Wall Height Map", images[2], false)?;

        let material = self.material(
            "Wall",
            &self.pipelines.wall_material_layout,
            &[&diffuse, &normal, &height],
        );
        let gpu = GpuMesh::new(device, "Wall", &mesh.vertices, Some(&mesh.indices))
            .with_material(material);
        Ok(self.push_mesh(gpu))
    }

    /// Upload an untextured triangle list, such as the light marker cube
    pub fn upload_cube(&mut self, label: &str, vertices: &[PositionVertex]) -> MeshId {
        let gpu = GpuMesh::new(&self.context.device, label, vertices, None);
        self.push_mesh(gpu)
    }

    pub fn upload_skybox(
        &mut self,
        vertices: &[PositionVertex],
        faces: &[RgbaImage; 6],
    ) -> Result<MeshId, RenderError> {
        let cubemap = textures::upload_cubemap(&self.context.device, &self.context.queue, faces)?;
        let material = self
            .context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Skybox Bind Group"),
                layout: &self.pipelines.skybox_texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&cubemap.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&cubemap.sampler),
                    },
                ],
            });
        let gpu = GpuMesh::new(&self.context.device, "Skybox", vertices, None).with_material(material);
        Ok(self.push_mesh(gpu))
    }

    /// Acquire the next surface texture. Returns `Ok(false)` when the frame
    /// should be skipped.
    pub fn begin_frame(&mut self) -> Result<bool, RenderError> {
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.context.reconfigure();
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(false);
            }
            Err(e) => return Err(RenderError::SurfaceError(e.to_string())),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.frame = Some(Frame {
            output,
            view,
            encoder: Some(encoder),
        });
        Ok(true)
    }

    /// Run `overlay` against the surface view, then submit and present
    pub fn end_frame<F>(&mut self, overlay: F)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        if self.pass.is_some() {
            log::warn!("Frame ended with an open pass");
            self.end_pass();
        }
        let Some(mut frame) = self.frame.take() else {
            return;
        };
        let Some(mut encoder) = frame.encoder.take() else {
            return;
        };

        overlay(&self.context.device, &self.context.queue, &mut encoder, &frame.view);

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.output.present();
    }

    fn uniform_group(&self, label: &str, contents: &[u8]) -> wgpu::BindGroup {
        let buffer = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Uniform Buffer", label)),
                contents,
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} Uniform Bind Group", label)),
                layout: &self.pipelines.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
    }

    /// Shadow maps for the terrain, padded with a 1x1 placeholder
    fn shadow_group(&self, maps: &[TargetId]) -> wgpu::BindGroup {
        let views: Vec<&wgpu::TextureView> = (0..MAX_CASCADES)
            .map(|i| {
                maps.get(i)
                    .and_then(|id| self.targets.get(id))
                    .map(GpuTarget::depth_view)
                    .unwrap_or(&self.placeholder_depth.1)
            })
            .collect();

        let mut entries: Vec<wgpu::BindGroupEntry> = views
            .iter()
            .enumerate()
            .map(|(i, view)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: MAX_CASCADES as u32,
            resource: wgpu::BindingResource::Sampler(&self.shadow_sampler),
        });

        self.context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Maps Bind Group"),
                layout: &self.pipelines.shadow_maps_layout,
                entries: &entries,
            })
    }

    fn water_targets_group(
        &self,
        reflection: TargetId,
        refraction: TargetId,
    ) -> Option<wgpu::BindGroup> {
        let reflection = self.targets.get(&reflection)?.color_view()?;
        let refraction = self.targets.get(&refraction)?.color_view()?;
        Some(
            self.context
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Water Targets Bind Group"),
                    layout: &self.pipelines.water_targets_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(reflection),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(refraction),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.target_sampler),
                        },
                    ],
                }),
        )
    }

    fn record(&mut self, draw: DrawCall, indexed: bool) {
        if self.pass.is_none() {
            log::warn!("Draw of mesh {} outside a pass dropped", draw.mesh.0);
            return;
        }
        let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
            log::warn!("Draw of unknown mesh {} dropped", draw.mesh.0);
            return;
        };
        let (mesh_kind, base_color, has_texture) = (mesh.kind, mesh.base_color, mesh.has_texture);
        let clip = self.clip_plane.unwrap_or(NO_CLIP);

        let (pipeline, uniforms, mut groups) = match &draw.params {
            ShaderParams::Skybox(p) => (
                PipelineKind::Skybox,
                self.uniform_group("Skybox", bytemuck::bytes_of(&SkyboxUniforms::new(p))),
                vec![Binding::Material],
            ),
            ShaderParams::Terrain(p) => (
                PipelineKind::Terrain,
                self.uniform_group("Terrain", bytemuck::bytes_of(&TerrainUniforms::new(p, clip))),
                vec![
                    Binding::Material,
                    Binding::Owned(self.shadow_group(&p.shadow_maps)),
                ],
            ),
            ShaderParams::Model(p) => (
                PipelineKind::Model,
                self.uniform_group(
                    "Model",
                    bytemuck::bytes_of(&ModelUniforms::new(p, base_color, has_texture, clip)),
                ),
                vec![Binding::Material],
            ),
            ShaderParams::Depth(p) => {
                let pipeline = match mesh_kind {
                    VertexKind::Model => PipelineKind::DepthModel,
                    _ => PipelineKind::DepthTerrain,
                };
                (
                    pipeline,
                    self.uniform_group("Depth", bytemuck::bytes_of(&DepthUniforms::new(p))),
                    Vec::new(),
                )
            }
            ShaderParams::Wall(p) => (
                PipelineKind::Wall,
                self.uniform_group("Wall", bytemuck::bytes_of(&WallUniforms::new(p))),
                vec![Binding::Material],
            ),
            ShaderParams::Marker(p) => (
                PipelineKind::Marker,
                self.uniform_group("Marker", bytemuck::bytes_of(&MarkerUniforms::new(p, clip))),
                Vec::new(),
            ),
            ShaderParams::Water(p) => {
                let Some(targets) = self.water_targets_group(p.reflection, p.refraction) else {
                    log::warn!("Water draw dropped: planar targets missing");
                    return;
                };
                (
                    PipelineKind::Water,
                    self.uniform_group("Water", bytemuck::bytes_of(&WaterUniforms::new(p))),
                    vec![Binding::Material, Binding::Owned(targets)],
                )
            }
        };

        if pipeline.vertex_kind() != mesh_kind {
            log::warn!(
                "Mesh {} has {:?} vertices, {:?} pipeline needs {:?}; draw dropped",
                draw.mesh.0,
                mesh_kind,
                pipeline,
                pipeline.vertex_kind()
            );
            return;
        }

        groups.insert(0, Binding::Owned(uniforms));
        if let Some(pass) = self.pass.as_mut() {
            pass.draws.push(PendingDraw {
                pipeline,
                mesh: draw.mesh,
                groups,
                indexed,
            });
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn create_target(&mut self, desc: &TargetDesc) -> Result<TargetId, RenderError> {
        let target = GpuTarget::new(&self.context.device, desc, self.context.format())?;
        let id = TargetId(self.next_target);
        self.next_target += 1;
        log::info!(
            "Created render target '{}' {}x{} ({:?})",
            desc.label,
            desc.width,
            desc.height,
            desc.kind
        );
        self.targets.insert(id, target);
        Ok(id)
    }

    fn release_target(&mut self, id: TargetId) {
        if let Some(target) = self.targets.remove(&id) {
            log::debug!("Released render target '{}'", target.desc.label);
            target.destroy();
        }
    }

    fn target_desc(&self, id: TargetId) -> Option<&TargetDesc> {
        self.targets.get(&id).map(|t| &t.desc)
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.context.config.width, self.context.config.height)
    }

    fn begin_pass(&mut self, label: &str, target: PassTarget, clear: ClearOp) {
        if self.pass.is_some() {
            log::warn!("Pass '{}' began before the previous one ended", label);
            self.end_pass();
        }
        self.pass = Some(PendingPass {
            label: label.to_string(),
            target,
            clear,
            viewport: self.viewport,
            draws: Vec::new(),
        });
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        if let Some(pass) = self.pass.as_mut() {
            pass.viewport = Some(viewport);
        }
    }

    fn set_clip_plane(&mut self, plane: Option<Vec4>) {
        self.clip_plane = plane;
    }

    fn draw_indexed(&mut self, draw: DrawCall) {
        self.record(draw, true);
    }

    fn draw_arrays(&mut self, draw: DrawCall) {
        self.record(draw, false);
    }

    fn end_pass(&mut self) {
        let Some(pass) = self.pass.take() else {
            log::warn!("end_pass without an open pass");
            return;
        };
        let Some(frame) = self.frame.as_mut() else {
            log::debug!("Pass '{}' dropped outside a frame", pass.label);
            return;
        };
        let Frame { view, encoder, .. } = frame;
        let Some(encoder) = encoder.as_mut() else {
            return;
        };

        let (color_view, depth_view, size) = match pass.target {
            PassTarget::Screen => (
                Some(&*view),
                &self.context.depth_view,
                (self.context.config.width, self.context.config.height),
            ),
            PassTarget::Offscreen(id) => {
                let Some(target) = self.targets.get(&id) else {
                    log::warn!("Pass '{}' targets unknown target {}", pass.label, id.0);
                    return;
                };
                (
                    target.color_view(),
                    target.depth_view(),
                    (target.desc.width, target.desc.height),
                )
            }
        };

        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = color_view
            .map(|view| wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: match pass.clear.color {
                        Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        None => wgpu::LoadOp::Load,
                    },
                    store: wgpu::StoreOp::Store,
                },
            })
            .into_iter()
            .map(Some)
            .collect();

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&pass.label),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: pass.clear.depth.map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let viewport = clamp_viewport(pass.viewport.unwrap_or(Viewport::full(size.0, size.1)), size);
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }
        render_pass.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
        );

        'draws: for draw in &pass.draws {
            let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
                continue;
            };
            render_pass.set_pipeline(draw.pipeline.pipeline(&self.pipelines));
            for (index, binding) in draw.groups.iter().enumerate() {
                let group = match binding {
                    Binding::Owned(group) => group,
                    Binding::Material => match &mesh.material {
                        Some(material) => material,
                        None => {
                            log::warn!("Mesh '{}' has no material bind group", mesh.label);
                            continue 'draws;
                        }
                    },
                };
                render_pass.set_bind_group(index as u32, group, &[]);
            }
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));

            match (&mesh.index_buffer, draw.indexed) {
                (Some(indices), true) => {
                    render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
                _ => render_pass.draw(0..mesh.vertex_count, 0..1),
            }
        }
    }
}

/// Keep a viewport inside an attachment of `size`
fn clamp_viewport(viewport: Viewport, size: (u32, u32)) -> Viewport {
    let x = viewport.x.min(size.0);
    let y = viewport.y.min(size.1);
    Viewport {
        x,
        y,
        width: viewport.width.min(size.0 - x),
        height: viewport.height.min(size.1 - y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_larger_than_target_is_clamped() {
        let v = clamp_viewport(Viewport::full(1920, 1080), (1024, 1024));
        assert_eq!(v, Viewport::full(1024, 1024));
    }

    #[test]
    fn viewport_offset_past_target_collapses() {
        let v = clamp_viewport(
            Viewport {
                x: 2000,
                y: 10,
                width: 100,
                height: 100,
            },
            (1024, 512),
        );
        assert_eq!(v.x, 1024);
        assert_eq!(v.width, 0);
        assert_eq!(v.height, 100);
    }

    #[test]
    fn depth_pipelines_read_matching_vertices() {
        assert_eq!(PipelineKind::DepthTerrain.vertex_kind(), VertexKind::Terrain);
        assert_eq!(PipelineKind::DepthModel.vertex_kind(), VertexKind::Model);
        assert_eq!(PipelineKind::Skybox.vertex_kind(), VertexKind::Position);
    }
}
