//! Scene render pipelines and their uniform layouts
//!
//! Every pipeline takes its per-draw uniforms at group 0, binding 0.
//! Material textures sit in group 1 and inputs produced by earlier passes
//! (shadow maps, planar reflection/refraction) in group 2.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use tidewater_core::{WallMode, MAX_CASCADES, MAX_WALL_LIGHTS};
use tidewater_geometry::{ModelVertex, PositionVertex, TangentVertex, TerrainVertex, TexturedVertex};

use crate::gpu_mesh::{position_only_desc, VertexLayout};
use crate::params::{
    DepthParams, MarkerParams, ModelParams, SkyboxParams, TerrainParams, WallParams, WaterParams,
};
use crate::textures::DEPTH_FORMAT;

/// Maps OpenGL clip depth `[-w, w]` to wgpu's `[0, w]`
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// Clip plane value that keeps every fragment
pub const NO_CLIP: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

fn clip_matrix(m: Mat4) -> [[f32; 4]; 4] {
    (OPENGL_TO_WGPU_MATRIX * m).to_cols_array_2d()
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    v.extend(w).to_array()
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SkyboxUniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl SkyboxUniforms {
    pub fn new(params: &SkyboxParams) -> Self {
        Self {
            view_proj: clip_matrix(params.view_projection),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TerrainUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_space: [[[f32; 4]; 4]; MAX_CASCADES],
    pub cascade_splits: [f32; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub clip_plane: [f32; 4],
    pub params: [f32; 4],
}

impl TerrainUniforms {
    pub fn new(params: &TerrainParams, clip_plane: Vec4) -> Self {
        let cascades = params.light_space.len().min(MAX_CASCADES);
        let mut light_space = [Mat4::IDENTITY.to_cols_array_2d(); MAX_CASCADES];
        let mut splits = [0.0; 4];
        for i in 0..cascades {
            light_space[i] = clip_matrix(params.light_space[i]);
            splits[i] = params.cascade_splits.get(i).copied().unwrap_or(f32::MAX);
        }

        Self {
            model: params.model.to_cols_array_2d(),
            view: params.view.to_cols_array_2d(),
            projection: clip_matrix(params.projection),
            light_space,
            cascade_splits: splits,
            light_dir: vec4(params.light_direction, params.ambient),
            light_color: vec4(params.light_color, 1.0),
            clip_plane: clip_plane.to_array(),
            params: [
                params.sand_threshold,
                params.grass_threshold,
                cascades as f32,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub base_color: [f32; 4],
    pub clip_plane: [f32; 4],
    pub flags: [u32; 4],
}

impl ModelUniforms {
    pub fn new(params: &ModelParams, base_color: [f32; 4], has_texture: bool, clip_plane: Vec4) -> Self {
        Self {
            model: params.model.to_cols_array_2d(),
            normal_matrix: params.model.inverse().transpose().to_cols_array_2d(),
            view: params.view.to_cols_array_2d(),
            projection: clip_matrix(params.projection),
            light_dir: vec4(params.light_direction, params.ambient),
            light_color: vec4(params.light_color, 1.0),
            base_color,
            clip_plane: clip_plane.to_array(),
            flags: [has_texture as u32, 0, 0, 0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DepthUniforms {
    pub light_space: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl DepthUniforms {
    pub fn new(params: &DepthParams) -> Self {
        Self {
            light_space: clip_matrix(params.light_space),
            model: params.model.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WallUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_dirs: [[f32; 4]; MAX_WALL_LIGHTS],
    pub params: [f32; 4],
    pub flags: [u32; 4],
}

fn wall_mode_index(mode: WallMode) -> u32 {
    match mode {
        WallMode::Plain => 0,
        WallMode::NormalBump => 1,
        WallMode::Pom => 2,
        WallMode::PomShadows => 3,
    }
}

impl WallUniforms {
    pub fn new(params: &WallParams) -> Self {
        let lights = params.light_directions.len().min(MAX_WALL_LIGHTS);
        let mut light_dirs = [[0.0; 4]; MAX_WALL_LIGHTS];
        for (slot, dir) in light_dirs.iter_mut().zip(&params.light_directions) {
            *slot = vec4(*dir, 0.0);
        }

        Self {
            model: params.model.to_cols_array_2d(),
            view: params.view.to_cols_array_2d(),
            projection: clip_matrix(params.projection),
            camera_position: vec4(params.camera_position, 1.0),
            light_dirs,
            params: [
                params.max_height,
                params.step_length,
                params.reflectivity,
                params.max_step_count as f32,
            ],
            flags: [wall_mode_index(params.mode), lights as u32, 0, 0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MarkerUniforms {
    pub model: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub clip_plane: [f32; 4],
}

impl MarkerUniforms {
    pub fn new(params: &MarkerParams, clip_plane: Vec4) -> Self {
        Self {
            model: params.model.to_cols_array_2d(),
            view_proj: clip_matrix(params.view_projection),
            color: vec4(params.color, 1.0),
            clip_plane: clip_plane.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WaterUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
}

impl WaterUniforms {
    pub fn new(params: &WaterParams) -> Self {
        Self {
            model: params.model.to_cols_array_2d(),
            view: params.view.to_cols_array_2d(),
            projection: clip_matrix(params.projection),
            camera_position: vec4(params.camera_position, params.wind_factor),
            light_dir: vec4(params.light_direction, params.wave_strength),
            light_color: vec4(params.light_color, 1.0),
        }
    }
}

/// Shared state for building the scene pipelines
struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    format: wgpu::TextureFormat,
}

impl PipelineBuilder<'_> {
    fn build(
        &self,
        label: &str,
        shader: &wgpu::ShaderModule,
        [vs_entry, fs_entry]: [&str; 2],
        layouts: &[&wgpu::BindGroupLayout],
        vertex: wgpu::VertexBufferLayout<'static>,
        color: Option<Option<wgpu::BlendState>>,
        depth_write: bool,
    ) -> wgpu::RenderPipeline {
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", label)),
                bind_group_layouts: layouts,
                push_constant_ranges: &[],
            });

        let targets = color.map(|blend| {
            [Some(wgpu::ColorTargetState {
                format: self.format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })]
        });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some(vs_entry),
                    buffers: &[vertex],
                    compilation_options: Default::default(),
                },
                fragment: targets.as_ref().map(|targets| wgpu::FragmentState {
                    module: shader,
                    entry_point: Some(fs_entry),
                    targets,
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Terrain quads wind clockwise seen from above
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: if depth_write {
                        wgpu::CompareFunction::Less
                    } else {
                        wgpu::CompareFunction::LessEqual
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: if color.is_none() {
                        wgpu::DepthBiasState {
                            constant: 2,
                            slope_scale: 2.0,
                            clamp: 0.0,
                        }
                    } else {
                        wgpu::DepthBiasState::default()
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    fn shader(&self, label: &str, source: &'static str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
    }

    fn layout(&self, label: &str, entries: &[wgpu::BindGroupLayoutEntry]) -> wgpu::BindGroupLayout {
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
    }
}

/// All scene pipelines and bind group layouts
pub struct ScenePipelines {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub skybox_texture_layout: wgpu::BindGroupLayout,
    pub terrain_material_layout: wgpu::BindGroupLayout,
    pub shadow_maps_layout: wgpu::BindGroupLayout,
    pub model_material_layout: wgpu::BindGroupLayout,
    pub wall_material_layout: wgpu::BindGroupLayout,
    pub water_material_layout: wgpu::BindGroupLayout,
    pub water_targets_layout: wgpu::BindGroupLayout,

    pub skybox: wgpu::RenderPipeline,
    pub terrain: wgpu::RenderPipeline,
    pub model: wgpu::RenderPipeline,
    pub depth_terrain: wgpu::RenderPipeline,
    pub depth_model: wgpu::RenderPipeline,
    pub wall: wgpu::RenderPipeline,
    pub marker: wgpu::RenderPipeline,
    pub water: wgpu::RenderPipeline,
}

impl ScenePipelines {
    /// Build every pipeline for colour attachments of `format`
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let b = PipelineBuilder { device, format };

        let uniform_layout = b.layout(
            "Draw Uniform Bind Group Layout",
            &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        );

        let skybox_texture_layout = b.layout(
            "Skybox Texture Bind Group Layout",
            &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                sampler_entry(1),
            ],
        );

        let terrain_material_layout = b.layout(
            "Terrain Material Bind Group Layout",
            &[texture_entry(0), texture_entry(1), texture_entry(2), sampler_entry(3)],
        );

        let mut shadow_entries: Vec<wgpu::BindGroupLayoutEntry> =
            (0..MAX_CASCADES as u32).map(depth_texture_entry).collect();
        shadow_entries.push(wgpu::BindGroupLayoutEntry {
            binding: MAX_CASCADES as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
            count: None,
        });
        let shadow_maps_layout = b.layout("Shadow Maps Bind Group Layout", &shadow_entries);

        let model_material_layout = b.layout(
            "Model Material Bind Group Layout",
            &[texture_entry(0), sampler_entry(1)],
        );

        let wall_material_layout = b.layout(
            "Wall Material Bind Group Layout",
            &[texture_entry(0), texture_entry(1), texture_entry(2), sampler_entry(3)],
        );

        let water_material_layout = b.layout(
            "Water Material Bind Group Layout",
            &[texture_entry(0), texture_entry(1), texture_entry(2), sampler_entry(3)],
        );

        let water_targets_layout = b.layout(
            "Water Targets Bind Group Layout",
            &[texture_entry(0), texture_entry(1), sampler_entry(2)],
        );

        let skybox_shader = b.shader("Skybox Shader", include_str!("skybox_shader.wgsl"));
        let terrain_shader = b.shader("Terrain Shader", include_str!("terrain_shader.wgsl"));
        let model_shader = b.shader("Model Shader", include_str!("model_shader.wgsl"));
        let depth_shader = b.shader("Depth Shader", include_str!("depth_shader.wgsl"));
        let wall_shader = b.shader("Wall Shader", include_str!("wall_shader.wgsl"));
        let marker_shader = b.shader("Marker Shader", include_str!("marker_shader.wgsl"));
        let water_shader = b.shader("Water Shader", include_str!("water_shader.wgsl"));

        let skybox = b.build(
            "Skybox Render Pipeline",
            &skybox_shader,
            ["vs_skybox", "fs_skybox"],
            &[&uniform_layout, &skybox_texture_layout],
            PositionVertex::desc(),
            Some(None),
            false,
        );
        let terrain = b.build(
            "Terrain Render Pipeline",
            &terrain_shader,
            ["vs_main", "fs_main"],
            &[&uniform_layout, &terrain_material_layout, &shadow_maps_layout],
            TerrainVertex::desc(),
            Some(None),
            true,
        );
        let model = b.build(
            "Model Render Pipeline",
            &model_shader,
            ["vs_main", "fs_main"],
            &[&uniform_layout, &model_material_layout],
            ModelVertex::desc(),
            Some(Some(wgpu::BlendState::ALPHA_BLENDING)),
            true,
        );
        let depth_terrain = b.build(
            "Terrain Shadow Depth Pipeline",
            &depth_shader,
            ["vs_depth", ""],
            &[&uniform_layout],
            position_only_desc(TerrainVertex::desc().array_stride),
            None,
            true,
        );
        let depth_model = b.build(
            "Model Shadow Depth Pipeline",
            &depth_shader,
            ["vs_depth", ""],
            &[&uniform_layout],
            position_only_desc(ModelVertex::desc().array_stride),
            None,
            true,
        );
        let wall = b.build(
            "Wall Render Pipeline",
            &wall_shader,
            ["vs_main", "fs_main"],
            &[&uniform_layout, &wall_material_layout],
            TangentVertex::desc(),
            Some(None),
            true,
        );
        let marker = b.build(
            "Marker Render Pipeline",
            &marker_shader,
            ["vs_main", "fs_main"],
            &[&uniform_layout],
            PositionVertex::desc(),
            Some(None),
            true,
        );
        let water = b.build(
            "Water Render Pipeline",
            &water_shader,
            ["vs_main", "fs_main"],
            &[&uniform_layout, &water_material_layout, &water_targets_layout],
            TexturedVertex::desc(),
            Some(Some(wgpu::BlendState::ALPHA_BLENDING)),
            true,
        );

        Self {
            uniform_layout,
            skybox_texture_layout,
            terrain_material_layout,
            shadow_maps_layout,
            model_material_layout,
            wall_material_layout,
            water_material_layout,
            water_targets_layout,
            skybox,
            terrain,
            model,
            depth_terrain,
            depth_model,
            wall,
            marker,
            water,
        }
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn depth_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TargetId;

    #[test]
    fn uniform_sizes_are_16_byte_aligned() {
        for size in [
            std::mem::size_of::<SkyboxUniforms>(),
            std::mem::size_of::<TerrainUniforms>(),
            std::mem::size_of::<ModelUniforms>(),
            std::mem::size_of::<DepthUniforms>(),
            std::mem::size_of::<WallUniforms>(),
            std::mem::size_of::<MarkerUniforms>(),
            std::mem::size_of::<WaterUniforms>(),
        ] {
            assert_eq!(size % 16, 0, "{size}");
        }
        assert_eq!(std::mem::size_of::<TerrainUniforms>(), 528);
        assert_eq!(std::mem::size_of::<WallUniforms>(), 304);
    }

    #[test]
    fn depth_correction_maps_gl_range() {
        let near = OPENGL_TO_WGPU_MATRIX * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU_MATRIX * Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z, 0.0);
        assert_eq!(far.z, 1.0);
    }

    #[test]
    fn terrain_uniforms_pad_unused_cascades() {
        let params = TerrainParams {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            light_direction: Vec3::Y,
            light_color: Vec3::ONE,
            ambient: 0.3,
            sand_threshold: 1.8,
            grass_threshold: 4.5,
            light_space: vec![Mat4::IDENTITY; 2],
            cascade_splits: vec![10.0, 40.0],
            shadow_maps: vec![TargetId(0), TargetId(1)],
        };
        let u = TerrainUniforms::new(&params, NO_CLIP);
        assert_eq!(u.params[2], 2.0);
        assert_eq!(u.cascade_splits, [10.0, 40.0, 0.0, 0.0]);
        assert_eq!(u.clip_plane, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(u.light_dir[3], 0.3);
    }
}
