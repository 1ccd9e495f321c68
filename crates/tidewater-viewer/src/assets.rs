//! Startup asset loading
//!
//! Assets are decoded on the CPU first, then uploaded to the backend in a
//! fixed order. Any missing or undecodable file aborts startup.

use anyhow::{Context, Result};
use glam::{EulerRot, Mat4, Quat, Vec3};
use tidewater_core::ViewerConfig;
use tidewater_geometry::{
    cube, import_gltf, wall_plane, water_quad, HeightField, IndexedMesh, Model, PositionVertex,
    RgbaImage, TangentVertex, Terrain, TexturedVertex,
};
use tidewater_render::{MeshId, Scene, SceneMesh, WgpuBackend};

pub struct WallAssets {
    pub mesh: IndexedMesh<TangentVertex>,
    /// Diffuse, normal and height maps
    pub textures: [RgbaImage; 3],
    pub transform: Mat4,
}

pub struct PlacedModel {
    pub model: Model,
    pub transform: Mat4,
}

/// Decoded scene content, ready to upload
pub struct SceneAssets {
    pub terrain: Terrain,
    /// Sand, grass and rock
    pub terrain_textures: [RgbaImage; 3],
    pub skybox_mesh: Vec<PositionVertex>,
    pub skybox_faces: [RgbaImage; 6],
    pub water_mesh: IndexedMesh<TexturedVertex>,
    /// Color, normal and distortion maps
    pub water_textures: [RgbaImage; 3],
    pub water_transform: Mat4,
    pub wall: Option<WallAssets>,
    pub models: Vec<PlacedModel>,
    pub marker_mesh: Vec<PositionVertex>,
}

fn load_image(config: &ViewerConfig, relative: &str) -> Result<RgbaImage> {
    let path = config.assets.resolve(relative);
    RgbaImage::load(&path).with_context(|| format!("Failed to load texture {}", path.display()))
}

fn load_images<const N: usize>(config: &ViewerConfig, paths: [&str; N]) -> Result<[RgbaImage; N]> {
    let images = paths
        .iter()
        .map(|p| load_image(config, p))
        .collect::<Result<Vec<_>>>()?;
    images
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected {} images", N))
}

/// Placement of the wall: translation, then XYZ Euler rotation in degrees
pub fn wall_transform(position: [f32; 3], rotation: [f32; 3]) -> Mat4 {
    let [rx, ry, rz] = rotation.map(f32::to_radians);
    Mat4::from_rotation_translation(
        Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
        Vec3::from_array(position),
    )
}

impl SceneAssets {
    pub fn load(config: &ViewerConfig) -> Result<Self> {
        let t = &config.terrain;
        let heightmap = config.assets.resolve(&t.heightmap);
        let field = HeightField::from_image(&heightmap)
            .with_context(|| format!("Failed to load heightmap {}", heightmap.display()))?;
        let terrain = Terrain::new(field, t.height_scale, t.texture_density, t.world_scale);
        let terrain_textures = load_images(
            config,
            [t.sand_texture.as_str(), t.grass_texture.as_str(), t.rock_texture.as_str()],
        )?;

        let faces = &config.skybox.faces;
        let skybox_faces = load_images(
            config,
            faces.each_ref().map(String::as_str),
        )?;

        let w = &config.water;
        let water_textures = load_images(
            config,
            [w.texture.as_str(), w.normal_map.as_str(), w.dudv_map.as_str()],
        )?;

        let wall = if config.wall.enabled {
            let c = &config.wall;
            Some(WallAssets {
                mesh: wall_plane(c.scale, c.density),
                textures: load_images(
                    config,
                    [c.texture.as_str(), c.normal_map.as_str(), c.height_map.as_str()],
                )?,
                transform: wall_transform(c.position, c.rotation),
            })
        } else {
            None
        };

        let mut models = Vec::with_capacity(config.models.len());
        for entry in &config.models {
            let path = config.assets.resolve(&entry.path);
            let model = import_gltf(&path)
                .with_context(|| format!("Failed to import model {}", path.display()))?;
            let mut position = Vec3::from_array(entry.position);
            if entry.on_terrain {
                position.y += terrain.height_at(position.x, position.z);
            }
            log::info!(
                "Loaded model '{}' ({} parts) at {:?}",
                model.name,
                model.parts.len(),
                position
            );
            models.push(PlacedModel {
                model,
                transform: Mat4::from_scale_rotation_translation(
                    Vec3::splat(entry.scale),
                    Quat::from_rotation_y(entry.rotation_y.to_radians()),
                    position,
                ),
            });
        }

        Ok(Self {
            terrain,
            terrain_textures,
            skybox_mesh: cube(config.skybox.scale),
            skybox_faces,
            water_mesh: water_quad(w.scale, w.density),
            water_textures,
            water_transform: Mat4::from_translation(Vec3::new(0.0, w.level, 0.0)),
            wall,
            models,
            marker_mesh: cube(config.lights.marker_scale),
        })
    }

    /// Upload every mesh and texture and return the drawable scene
    pub fn upload(&self, backend: &mut WgpuBackend) -> Result<Scene> {
        let skybox = backend
            .upload_skybox(&self.skybox_mesh, &self.skybox_faces)
            .context("Failed to upload skybox")?;
        let [sand, grass, rock] = &self.terrain_textures;
        let terrain = backend
            .upload_terrain(&self.terrain.mesh, [sand, grass, rock])
            .context("Failed to upload terrain")?;

        let mut models = Vec::new();
        for placed in &self.models {
            for (i, part) in placed.model.parts.iter().enumerate() {
                let name = format!("{} #{}", placed.model.name, i);
                let mesh = backend
                    .upload_model_part(&name, part)
                    .with_context(|| format!("Failed to upload {}", name))?;
                models.push(SceneMesh::new(mesh, placed.transform));
            }
        }

        let [color, normal, dudv] = &self.water_textures;
        let water = backend
            .upload_water(&self.water_mesh, [color, normal, dudv])
            .context("Failed to upload water")?;

        let wall = match &self.wall {
            Some(wall) => {
                let [diffuse, normal, height] = &wall.textures;
                let mesh = backend
                    .upload_wall(&wall.mesh, [diffuse, normal, height])
                    .context("Failed to upload wall")?;
                Some(SceneMesh::new(mesh, wall.transform))
            }
            None => None,
        };
        let marker = wall
            .is_some()
            .then(|| backend.upload_cube("Light Marker", &self.marker_mesh));

        Ok(Scene {
            skybox,
            terrain: SceneMesh::new(terrain, Mat4::IDENTITY),
            models,
            water: SceneMesh::new(water, self.water_transform),
            wall,
            marker,
        })
    }

    /// The scene `upload` would produce, with mesh ids assigned in upload
    /// order but nothing sent to a GPU
    pub fn placeholder_scene(&self) -> Scene {
        let mut next = 0;
        let mut id = || {
            let mesh = MeshId(next);
            next += 1;
            mesh
        };

        let skybox = id();
        let terrain = SceneMesh::new(id(), Mat4::IDENTITY);
        let models = self
            .models
            .iter()
            .flat_map(|placed| placed.model.parts.iter().map(move |_| placed.transform))
            .map(|transform| SceneMesh::new(id(), transform))
            .collect();
        let water = SceneMesh::new(id(), self.water_transform);
        let wall = self
            .wall
            .as_ref()
            .map(|wall| SceneMesh::new(id(), wall.transform));
        let marker = wall.is_some().then(&mut id);

        Scene {
            skybox,
            terrain,
            models,
            water,
            wall,
            marker,
        }
    }
}
