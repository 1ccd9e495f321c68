//! Viewer configuration loaded from `tidewater.toml`
//!
//! Every section carries serde defaults that reproduce the stock scene, so an
//! empty file yields a usable configuration. Only the default path may be
//! absent; a file named explicitly must exist. Values are
//! read once at startup and validated before any GPU resource is created.

use crate::error::{Result, TidewaterError};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "tidewater.toml";

/// Upper bound on shadow cascades the GPU backend can bind at once
pub const MAX_CASCADES: usize = 4;

/// Number of directional lights the wall shader evaluates
pub const MAX_WALL_LIGHTS: usize = 4;

/// Top-level viewer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub terrain: TerrainConfig,
    pub water: WaterConfig,
    pub wall: WallConfig,
    pub shadows: ShadowConfig,
    pub targets: TargetConfig,
    pub skybox: SkyboxConfig,
    pub lights: LightConfig,
    #[serde(rename = "model")]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tidewater".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Root directory that relative asset paths are resolved against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

impl AssetConfig {
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub direction: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Distance moved per frame while a movement key is held
    pub velocity: f32,
    /// Pitch step per frame while Up/Down is held
    pub pitch_velocity: f32,
    /// Velocity change per scroll line
    pub scroll_step: f32,
    pub min_velocity: f32,
    pub max_velocity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 3.0, 0.0],
            direction: [0.2, -1.0, 0.2],
            fov: 45.0,
            near: 0.1,
            far: 200.0,
            velocity: 0.02,
            pitch_velocity: 0.04,
            scroll_step: 0.005,
            min_velocity: 0.005,
            max_velocity: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub heightmap: String,
    pub sand_texture: String,
    pub grass_texture: String,
    pub rock_texture: String,
    /// World-space height of a full-intensity sample
    pub height_scale: f32,
    /// Grid cells per texture repeat
    pub texture_density: u32,
    /// Half-extent of the terrain on X and Z
    pub world_scale: f32,
    pub sand_threshold: f32,
    pub grass_threshold: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: "terrain/heightmap.png".to_string(),
            sand_texture: "terrain/sand.jpg".to_string(),
            grass_texture: "terrain/grass.jpg".to_string(),
            rock_texture: "terrain/rock.jpg".to_string(),
            height_scale: 8.0,
            texture_density: 8,
            world_scale: 50.0,
            sand_threshold: 1.8,
            grass_threshold: 4.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub level: f32,
    /// Half-extent of the water quad
    pub scale: f32,
    /// Texture repeats across the quad
    pub density: f32,
    pub texture: String,
    pub normal_map: String,
    pub dudv_map: String,
    /// Wind factor increment per frame
    pub wind_step: f32,
    pub wave_strength: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            level: 1.5,
            scale: 50.0,
            density: 20.0,
            texture: "water/water.jpg".to_string(),
            normal_map: "water/normal.png".to_string(),
            dudv_map: "water/dudv.png".to_string(),
            wind_step: 0.0005,
            wave_strength: 0.02,
        }
    }
}

/// Shading technique used for the wall surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallMode {
    Plain,
    NormalBump,
    Pom,
    #[default]
    PomShadows,
}

impl WallMode {
    pub const ALL: [WallMode; 4] = [
        WallMode::Plain,
        WallMode::NormalBump,
        WallMode::Pom,
        WallMode::PomShadows,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WallMode::Plain => "PLAIN",
            WallMode::NormalBump => "NORMAL BUMP",
            WallMode::Pom => "POM",
            WallMode::PomShadows => "POM & SHADOWS",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub enabled: bool,
    pub position: [f32; 3],
    /// Euler rotation in degrees, applied X then Y then Z
    pub rotation: [f32; 3],
    pub scale: f32,
    pub density: f32,
    pub texture: String,
    pub normal_map: String,
    pub height_map: String,
    pub mode: WallMode,
    pub max_height: f32,
    pub max_step_count: u32,
    pub step_length: f32,
    pub reflectivity: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: [0.0, 4.0, -12.0],
            rotation: [90.0, 0.0, 0.0],
            scale: 3.0,
            density: 1.0,
            texture: "wall/wall_texture.jpg".to_string(),
            normal_map: "wall/wall_normal.jpg".to_string(),
            height_map: "wall/wall_height.png".to_string(),
            mode: WallMode::default(),
            max_height: 0.006,
            max_step_count: 90,
            step_length: 10.0,
            reflectivity: 200.0,
        }
    }
}

/// Which culling the refraction pass applies against the water plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefractionCulling {
    /// Draw the whole scene into the refraction target
    None,
    /// Discard geometry above the water plane
    #[default]
    ClipPlane,
    /// Clip test plus an oblique near plane on the water surface
    ClipPlaneOblique,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Ascending split distances, N+1 entries for N cascades
    pub cascade_planes: Vec<f32>,
    /// Square depth-map resolution per cascade
    pub resolutions: Vec<u32>,
    /// Distance from the light target to the light eye
    pub light_distance: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            cascade_planes: vec![0.1, 10.0, 40.0, 200.0],
            resolutions: vec![2048, 2048, 1024],
            light_distance: 100.0,
        }
    }
}

impl ShadowConfig {
    pub fn cascade_count(&self) -> usize {
        self.cascade_planes.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub reflection_size: [u32; 2],
    pub refraction_size: [u32; 2],
    pub refraction_culling: RefractionCulling,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            reflection_size: [640, 360],
            refraction_size: [640, 360],
            refraction_culling: RefractionCulling::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxConfig {
    /// Cube faces in +X, -X, +Y, -Y, +Z, -Z order
    pub faces: [String; 6],
    pub scale: f32,
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            faces: [
                "skybox/right.jpg".to_string(),
                "skybox/left.jpg".to_string(),
                "skybox/top.jpg".to_string(),
                "skybox/bottom.jpg".to_string(),
                "skybox/front.jpg".to_string(),
                "skybox/back.jpg".to_string(),
            ],
            scale: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Direction pointing from the scene towards the sun
    pub sun_direction: [f32; 3],
    pub sun_color: [f32; 3],
    pub ambient: f32,
    /// Directional lights illuminating the wall, in the wall's local frame
    /// where +Y is the surface normal
    pub wall_lights: Vec<[f32; 3]>,
    /// Distance from the wall centre, in wall space, at which light markers
    /// are drawn
    pub marker_distance: f32,
    pub marker_scale: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            sun_direction: [-1.0, 1.5, -0.5],
            sun_color: [1.0, 0.95, 0.85],
            ambient: 0.3,
            wall_lights: vec![
                [-1.0, 0.3, -1.0],
                [0.0, 0.4, 1.0],
                [-1.0, 0.1, 0.0],
                [-1.0, 0.4, 1.0],
            ],
            marker_distance: 4.0,
            marker_scale: 0.05,
        }
    }
}

impl LightConfig {
    pub fn sun(&self) -> Vec3 {
        Vec3::from_array(self.sun_direction)
    }
}

/// A static glTF model placed in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    /// World position; Y is replaced by the terrain height when `on_terrain` is set
    pub position: [f32; 3],
    #[serde(default = "default_model_scale")]
    pub scale: f32,
    /// Rotation about world Y in degrees
    #[serde(default)]
    pub rotation_y: f32,
    #[serde(default)]
    pub on_terrain: bool,
}

fn default_model_scale() -> f32 {
    1.0
}

impl ViewerConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use the built-in defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        log::info!("No config at {}, using built-in defaults", path.display());
        let config = ViewerConfig::default();
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the renderer cannot work with
    pub fn validate(&self) -> Result<()> {
        let planes = &self.shadows.cascade_planes;
        if planes.len() < 2 {
            return Err(TidewaterError::InvalidConfig(format!(
                "shadows.cascade_planes needs at least 2 entries, got {}",
                planes.len()
            )));
        }
        if planes[0] <= 0.0 {
            return Err(TidewaterError::InvalidConfig(
                "shadows.cascade_planes must start above zero".to_string(),
            ));
        }
        if planes.windows(2).any(|w| w[1] < w[0]) {
            return Err(TidewaterError::InvalidConfig(format!(
                "shadows.cascade_planes must be ascending, got {:?}",
                planes
            )));
        }
        let cascades = self.shadows.cascade_count();
        if cascades > MAX_CASCADES {
            return Err(TidewaterError::ValueOutOfRange {
                field: "shadows.cascade_planes (cascade count)".to_string(),
                min: 1.0,
                max: MAX_CASCADES as f64,
                value: cascades as f64,
            });
        }
        if self.shadows.resolutions.len() != cascades {
            return Err(TidewaterError::InvalidConfig(format!(
                "shadows.resolutions has {} entries but there are {} cascades",
                self.shadows.resolutions.len(),
                cascades
            )));
        }
        if self.shadows.resolutions.contains(&0) {
            return Err(TidewaterError::InvalidConfig(
                "shadows.resolutions must be non-zero".to_string(),
            ));
        }
        for (name, size) in [
            ("targets.reflection_size", self.targets.reflection_size),
            ("targets.refraction_size", self.targets.refraction_size),
        ] {
            if size[0] == 0 || size[1] == 0 {
                return Err(TidewaterError::InvalidConfig(format!(
                    "{name} must be non-zero, got {:?}",
                    size
                )));
            }
        }
        if self.terrain.texture_density == 0 {
            return Err(TidewaterError::InvalidConfig(
                "terrain.texture_density must be at least 1".to_string(),
            ));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(TidewaterError::InvalidConfig(format!(
                "camera near/far must satisfy 0 < near < far, got {} / {}",
                self.camera.near, self.camera.far
            )));
        }
        if !(1.0..179.0).contains(&self.camera.fov) {
            return Err(TidewaterError::ValueOutOfRange {
                field: "camera.fov".to_string(),
                min: 1.0,
                max: 179.0,
                value: self.camera.fov as f64,
            });
        }
        if Vec3::from_array(self.lights.sun_direction).length_squared() == 0.0 {
            return Err(TidewaterError::InvalidConfig(
                "lights.sun_direction must be non-zero".to_string(),
            ));
        }
        if self.lights.wall_lights.len() > MAX_WALL_LIGHTS {
            return Err(TidewaterError::ValueOutOfRange {
                field: "lights.wall_lights (count)".to_string(),
                min: 0.0,
                max: MAX_WALL_LIGHTS as f64,
                value: self.lights.wall_lights.len() as f64,
            });
        }
        if !(2..=128).contains(&self.wall.max_step_count) {
            return Err(TidewaterError::ValueOutOfRange {
                field: "wall.max_step_count".to_string(),
                min: 2.0,
                max: 128.0,
                value: self.wall.max_step_count as f64,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ViewerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.shadows.cascade_count(), 3);
        assert_eq!(config.targets.refraction_culling, RefractionCulling::ClipPlane);
        assert_eq!(config.wall.mode, WallMode::PomShadows);
        assert_eq!(config.lights.wall_lights.len(), 4);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.camera.position, [0.0, 3.0, 0.0]);
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_partial_override() {
        let config = ViewerConfig::from_toml_str(
            r#"
[water]
level = 2.5

[targets]
refraction_culling = "clip_plane_oblique"

[[model]]
path = "models/boat.glb"
position = [4.0, 0.0, -3.0]
on_terrain = true
"#,
        )
        .unwrap();
        assert_eq!(config.water.level, 2.5);
        assert_eq!(config.water.scale, 50.0);
        assert_eq!(
            config.targets.refraction_culling,
            RefractionCulling::ClipPlaneOblique
        );
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].scale, 1.0);
        assert!(config.models[0].on_terrain);
    }

    #[test]
    fn test_descending_planes_rejected() {
        let result = ViewerConfig::from_toml_str(
            r#"
[shadows]
cascade_planes = [0.1, 40.0, 10.0]
resolutions = [1024, 1024]
"#,
        );
        assert!(matches!(result, Err(TidewaterError::InvalidConfig(_))));
    }

    #[test]
    fn test_degenerate_planes_accepted() {
        let config = ViewerConfig::from_toml_str(
            r#"
[shadows]
cascade_planes = [0.1, 0.1]
resolutions = [512]
"#,
        )
        .unwrap();
        assert_eq!(config.shadows.cascade_count(), 1);
    }

    #[test]
    fn test_resolution_count_mismatch_rejected() {
        let mut config = ViewerConfig::default();
        config.shadows.resolutions.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_too_many_cascades_rejected() {
        let mut config = ViewerConfig::default();
        config.shadows.cascade_planes = vec![0.1, 1.0, 2.0, 3.0, 4.0, 5.0];
        config.shadows.resolutions = vec![512; 5];
        assert!(matches!(
            config.validate(),
            Err(TidewaterError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_density_rejected() {
        let mut config = ViewerConfig::default();
        config.terrain.texture_density = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = ViewerConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = ViewerConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.shadows.cascade_planes, config.shadows.cascade_planes);
        assert_eq!(parsed.skybox.faces, config.skybox.faces);
    }

    #[test]
    fn test_missing_default_file_falls_back() {
        let config =
            ViewerConfig::load_or_default(Path::new("does/not/exist/tidewater.toml")).unwrap();
        assert_eq!(config.window.title, "Tidewater");
    }

    #[test]
    fn test_missing_named_file_is_an_error() {
        let result = ViewerConfig::load(Path::new("does/not/exist/typo.toml"));
        assert!(matches!(result, Err(TidewaterError::IoError(_))));
    }
}
