//! Typed per-shader draw parameters
//!
//! Every draw carries one of these by value, including its own model
//! transform. `uniforms()` flattens a parameter block into the named-uniform
//! contract the shaders are written against, which the command recorder
//! uses for tracing and which documents what reaches each stage.

use glam::{Mat4, Vec3, Vec4};
use tidewater_core::WallMode;

use crate::backend::TargetId;

/// A named uniform value
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    /// Sampled output of an earlier pass
    Target(TargetId),
}

/// Which shader a draw uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Skybox,
    Terrain,
    Model,
    Depth,
    Wall,
    Marker,
    Water,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxParams {
    /// Projection times the rotation-only view
    pub view_projection: Mat4,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainParams {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub light_direction: Vec3,
    pub light_color: Vec3,
    pub ambient: f32,
    pub sand_threshold: f32,
    pub grass_threshold: f32,
    /// Light view-projection per cascade; empty outside the composite pass
    pub light_space: Vec<Mat4>,
    /// Far split distance per cascade, in view-space depth
    pub cascade_splits: Vec<f32>,
    pub shadow_maps: Vec<TargetId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub light_direction: Vec3,
    pub light_color: Vec3,
    pub ambient: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepthParams {
    pub model: Mat4,
    pub light_space: Mat4,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallParams {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub light_directions: Vec<Vec3>,
    pub mode: WallMode,
    pub max_height: f32,
    pub max_step_count: u32,
    pub step_length: f32,
    pub reflectivity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerParams {
    pub model: Mat4,
    pub view_projection: Mat4,
    pub color: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterParams {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub light_direction: Vec3,
    pub light_color: Vec3,
    /// Wrapping animation scalar in `[0, 1)`
    pub wind_factor: f32,
    pub wave_strength: f32,
    pub reflection: TargetId,
    pub refraction: TargetId,
}

/// Parameters for one draw, tagged by shader
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderParams {
    Skybox(SkyboxParams),
    Terrain(TerrainParams),
    Model(ModelParams),
    Depth(DepthParams),
    Wall(WallParams),
    Marker(MarkerParams),
    Water(WaterParams),
}

fn push_mat(out: &mut Vec<(String, UniformValue)>, name: &str, m: Mat4) {
    out.push((name.to_string(), UniformValue::Mat4(m)));
}

impl ShaderParams {
    pub fn kind(&self) -> ShaderKind {
        match self {
            ShaderParams::Skybox(_) => ShaderKind::Skybox,
            ShaderParams::Terrain(_) => ShaderKind::Terrain,
            ShaderParams::Model(_) => ShaderKind::Model,
            ShaderParams::Depth(_) => ShaderKind::Depth,
            ShaderParams::Wall(_) => ShaderKind::Wall,
            ShaderParams::Marker(_) => ShaderKind::Marker,
            ShaderParams::Water(_) => ShaderKind::Water,
        }
    }

    /// Model transform of the draw, if the shader takes one
    pub fn model(&self) -> Option<Mat4> {
        match self {
            ShaderParams::Skybox(_) => None,
            ShaderParams::Terrain(p) => Some(p.model),
            ShaderParams::Model(p) => Some(p.model),
            ShaderParams::Depth(p) => Some(p.model),
            ShaderParams::Wall(p) => Some(p.model),
            ShaderParams::Marker(p) => Some(p.model),
            ShaderParams::Water(p) => Some(p.model),
        }
    }

    /// Flatten into the named-uniform contract
    pub fn uniforms(&self) -> Vec<(String, UniformValue)> {
        use UniformValue as U;
        let mut out = Vec::new();
        match self {
            ShaderParams::Skybox(p) => push_mat(&mut out, "VP", p.view_projection),
            ShaderParams::Terrain(p) => {
                push_mat(&mut out, "model", p.model);
                push_mat(&mut out, "view", p.view);
                push_mat(&mut out, "projection", p.projection);
                out.push(("lightDir".into(), U::Vec3(p.light_direction)));
                out.push(("lightColor".into(), U::Vec3(p.light_color)));
                out.push(("ambient".into(), U::Float(p.ambient)));
                out.push(("sand_threshold".into(), U::Float(p.sand_threshold)));
                out.push(("grass_threshold".into(), U::Float(p.grass_threshold)));
                out.push(("cascadeCount".into(), U::Int(p.light_space.len() as i32)));
                for (i, m) in p.light_space.iter().enumerate() {
                    push_mat(&mut out, &format!("lightSpaceMatrices[{i}]"), *m);
                }
                for (i, d) in p.cascade_splits.iter().enumerate() {
                    out.push((format!("cascadePlaneDistances[{i}]"), U::Float(*d)));
                }
                for (i, t) in p.shadow_maps.iter().enumerate() {
                    out.push((format!("shadowMap{i}"), U::Target(*t)));
                }
            }
            ShaderParams::Model(p) => {
                push_mat(&mut out, "model", p.model);
                push_mat(&mut out, "view", p.view);
                push_mat(&mut out, "projection", p.projection);
                out.push(("lightDir".into(), U::Vec3(p.light_direction)));
                out.push(("lightColor".into(), U::Vec3(p.light_color)));
                out.push(("ambient".into(), U::Float(p.ambient)));
            }
            ShaderParams::Depth(p) => {
                push_mat(&mut out, "model", p.model);
                push_mat(&mut out, "lightSpaceMatrix", p.light_space);
            }
            ShaderParams::Wall(p) => {
                push_mat(&mut out, "model", p.model);
                push_mat(&mut out, "view", p.view);
                push_mat(&mut out, "projection", p.projection);
                out.push(("cameraPosition".into(), U::Vec3(p.camera_position)));
                for (i, d) in p.light_directions.iter().enumerate() {
                    out.push((format!("worldLightDir{}", i + 1), U::Vec3(*d)));
                }
                out.push(("MAX_STEP_COUNT".into(), U::Int(p.max_step_count as i32)));
                out.push(("MAX_HEIGHT".into(), U::Float(p.max_height)));
                out.push(("STEP_LENGTH".into(), U::Float(p.step_length)));
                out.push(("reflectivity".into(), U::Float(p.reflectivity)));
                out.push((
                    "normalBump".into(),
                    U::Bool(p.mode == WallMode::NormalBump),
                ));
                out.push(("pom".into(), U::Bool(p.mode == WallMode::Pom)));
                out.push((
                    "pomAndShadows".into(),
                    U::Bool(p.mode == WallMode::PomShadows),
                ));
            }
            ShaderParams::Marker(p) => {
                push_mat(&mut out, "model", p.model);
                push_mat(&mut out, "VP", p.view_projection);
                out.push(("color".into(), U::Vec3(p.color)));
            }
            ShaderParams::Water(p) => {
                push_mat(&mut out, "model", p.model);
                push_mat(&mut out, "view", p.view);
                push_mat(&mut out, "projection", p.projection);
                out.push(("cameraPosition".into(), U::Vec3(p.camera_position)));
                out.push(("lightDir".into(), U::Vec3(p.light_direction)));
                out.push(("lightColor".into(), U::Vec3(p.light_color)));
                out.push(("windFactor".into(), U::Float(p.wind_factor)));
                out.push(("waveStrength".into(), U::Float(p.wave_strength)));
                out.push(("reflection_texture".into(), U::Target(p.reflection)));
                out.push(("refraction_texture".into(), U::Target(p.refraction)));
            }
        }
        out
    }

    /// Look up a single named uniform
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_uniforms_list_every_cascade() {
        let params = ShaderParams::Terrain(TerrainParams {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            light_direction: Vec3::Y,
            light_color: Vec3::ONE,
            ambient: 0.3,
            sand_threshold: 1.0,
            grass_threshold: 2.0,
            light_space: vec![Mat4::IDENTITY; 3],
            cascade_splits: vec![10.0, 40.0, 200.0],
            shadow_maps: vec![TargetId(2), TargetId(3), TargetId(4)],
        });
        assert_eq!(params.kind(), ShaderKind::Terrain);
        assert_eq!(params.uniform("cascadeCount"), Some(UniformValue::Int(3)));
        assert_eq!(
            params.uniform("cascadePlaneDistances[2]"),
            Some(UniformValue::Float(200.0))
        );
        assert_eq!(
            params.uniform("shadowMap1"),
            Some(UniformValue::Target(TargetId(3)))
        );
        assert!(params.uniform("lightSpaceMatrices[3]").is_none());
    }

    #[test]
    fn wall_mode_maps_to_flags() {
        let params = ShaderParams::Wall(WallParams {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            light_directions: vec![Vec3::X, Vec3::Y],
            mode: WallMode::Pom,
            max_height: 0.006,
            max_step_count: 90,
            step_length: 10.0,
            reflectivity: 200.0,
        });
        assert_eq!(params.uniform("pom"), Some(UniformValue::Bool(true)));
        assert_eq!(params.uniform("pomAndShadows"), Some(UniformValue::Bool(false)));
        assert_eq!(
            params.uniform("worldLightDir2"),
            Some(UniformValue::Vec3(Vec3::Y))
        );
        assert_eq!(params.uniform("MAX_STEP_COUNT"), Some(UniformValue::Int(90)));
    }

    #[test]
    fn skybox_has_no_model_transform() {
        let params = ShaderParams::Skybox(SkyboxParams {
            view_projection: Mat4::IDENTITY,
        });
        assert!(params.model().is_none());
        assert_eq!(params.uniforms().len(), 1);
    }
}
