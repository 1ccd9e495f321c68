//! Per-frame multi-pass rendering
//!
//! The orchestrator owns the off-screen targets and walks the frame plan
//! every frame: cascade fitting, the mirrored reflection pass, the
//! refraction pass, one depth pass per shadow cascade, then the composite
//! pass that samples all of them. Everything goes through a
//! [`RenderBackend`], so the same sequence can be executed on the GPU or
//! recorded for inspection.
//!
//! All matrices handed to the backend follow the OpenGL clip convention.

use glam::{Mat4, Vec3, Vec4};
use tidewater_core::{RefractionCulling, ViewerConfig, WallMode};

use crate::backend::{
    ClearOp, DrawCall, MeshId, PassTarget, RenderBackend, TargetDesc, TargetId, Viewport,
};
use crate::camera::{rotation_only, Camera, Projection};
use crate::cascade::{self, CascadeFit};
use crate::context::RenderError;
use crate::light::{light_view, DirectionalLight};
use crate::oblique::{make_oblique, transform_plane};
use crate::params::{
    DepthParams, MarkerParams, ModelParams, ShaderParams, SkyboxParams, TerrainParams,
    WallParams, WaterParams,
};
use crate::passes::{FramePlan, PassKind};

const MARKER_COLOR: Vec3 = Vec3::new(1.0, 0.9, 0.4);

/// Startup-fixed rendering parameters
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// N+1 ascending split distances
    pub cascade_planes: Vec<f32>,
    /// One square depth-map resolution per cascade
    pub shadow_resolutions: Vec<u32>,
    pub reflection_size: [u32; 2],
    pub refraction_size: [u32; 2],
    pub refraction_culling: RefractionCulling,
    /// Distance from the camera to the light eye used for cascade fitting
    pub light_distance: f32,
    pub wind_step: f32,
    pub wave_strength: f32,
    pub sand_threshold: f32,
    pub grass_threshold: f32,
    pub marker_distance: f32,
}

impl OrchestratorSettings {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            cascade_planes: config.shadows.cascade_planes.clone(),
            shadow_resolutions: config.shadows.resolutions.clone(),
            reflection_size: config.targets.reflection_size,
            refraction_size: config.targets.refraction_size,
            refraction_culling: config.targets.refraction_culling,
            light_distance: config.shadows.light_distance,
            wind_step: config.water.wind_step,
            wave_strength: config.water.wave_strength,
            sand_threshold: config.terrain.sand_threshold,
            grass_threshold: config.terrain.grass_threshold,
            marker_distance: config.lights.marker_distance,
        }
    }

    pub fn cascade_count(&self) -> usize {
        self.cascade_planes.len().saturating_sub(1)
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

/// An off-screen target and the viewport covering it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffscreenTarget {
    pub id: TargetId,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargets {
    pub reflection: OffscreenTarget,
    pub refraction: OffscreenTarget,
    pub shadows: Vec<OffscreenTarget>,
}

impl RenderTargets {
    fn all(&self) -> impl Iterator<Item = &OffscreenTarget> {
        [&self.reflection, &self.refraction]
            .into_iter()
            .chain(self.shadows.iter())
    }
}

/// A mesh placed in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMesh {
    pub mesh: MeshId,
    pub transform: Mat4,
}

impl SceneMesh {
    pub fn new(mesh: MeshId, transform: Mat4) -> Self {
        Self { mesh, transform }
    }
}

/// Everything drawn each frame, uploaded before the first frame
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Cube drawn around the camera without translation
    pub skybox: MeshId,
    pub terrain: SceneMesh,
    /// One entry per model part
    pub models: Vec<SceneMesh>,
    pub water: SceneMesh,
    pub wall: Option<SceneMesh>,
    /// Small cube drawn at each wall light
    pub marker: Option<MeshId>,
}

/// Parallax wall shading parameters, editable at runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSettings {
    pub mode: WallMode,
    pub max_height: f32,
    pub max_step_count: u32,
    pub step_length: f32,
    pub reflectivity: f32,
}

impl WallSettings {
    pub fn from_config(config: &tidewater_core::config::WallConfig) -> Self {
        Self {
            mode: config.mode,
            max_height: config.max_height,
            max_step_count: config.max_step_count,
            step_length: config.step_length,
            reflectivity: config.reflectivity,
        }
    }
}

/// Input-driven state for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub camera: Camera,
    pub projection: Projection,
    pub sun: DirectionalLight,
    pub ambient: f32,
    pub water_level: f32,
    pub wall: WallSettings,
    /// Wall light directions in the wall's local frame
    pub wall_lights: Vec<Vec3>,
}

impl FrameState {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            camera: Camera::new(
                Vec3::from_array(config.camera.position),
                Vec3::from_array(config.camera.direction),
            ),
            projection: Projection {
                fov_y: config.camera.fov.to_radians(),
                near: config.camera.near,
                far: config.camera.far,
            },
            sun: DirectionalLight::new(
                config.lights.sun(),
                Vec3::from_array(config.lights.sun_color),
            ),
            ambient: config.lights.ambient,
            water_level: config.water.level,
            wall: WallSettings::from_config(&config.wall),
            wall_lights: config
                .lights
                .wall_lights
                .iter()
                .map(|l| Vec3::from_array(*l))
                .collect(),
        }
    }
}

/// Wrapping animation scalar in `[0, 1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindFactor {
    value: f32,
    step: f32,
}

impl WindFactor {
    pub fn new(step: f32) -> Self {
        Self { value: 0.0, step }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Step once and return the new value
    pub fn advance(&mut self) -> f32 {
        let next = (self.value + self.step).rem_euclid(1.0);
        // rem_euclid rounds up to 1.0 for tiny negative inputs
        self.value = if next >= 1.0 { 0.0 } else { next };
        self.value
    }
}

/// What the orchestrator computed for a frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub light_view: Mat4,
    pub cascades: Vec<CascadeFit>,
    /// Fitted projection times light view, per cascade
    pub light_space: Vec<Mat4>,
    pub wind_factor: f32,
    /// Whether the reflection pass used an oblique near plane
    pub reflection_oblique: bool,
}

/// View and projection used by one color pass
struct Eye {
    view: Mat4,
    projection: Mat4,
    /// Projection for the skybox, never oblique
    sky_projection: Mat4,
    position: Vec3,
}

pub struct Orchestrator {
    plan: FramePlan,
    settings: OrchestratorSettings,
    targets: RenderTargets,
    wind: WindFactor,
}

impl Orchestrator {
    /// Validate the frame plan and allocate every off-screen target
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        settings: OrchestratorSettings,
    ) -> Result<Self, RenderError> {
        let cascades = settings.cascade_count();
        if settings.shadow_resolutions.len() != cascades {
            return Err(RenderError::InvalidFramePlan(format!(
                "{} shadow resolutions for {} cascades",
                settings.shadow_resolutions.len(),
                cascades
            )));
        }

        let plan = FramePlan::standard(cascades);
        plan.validate()?;

        let reflection = create_target(
            backend,
            TargetDesc::color("Reflection Target", settings.reflection_size),
        )?;
        let refraction = create_target(
            backend,
            TargetDesc::color("Refraction Target", settings.refraction_size),
        )?;
        let shadows = settings
            .shadow_resolutions
            .iter()
            .enumerate()
            .map(|(i, res)| {
                create_target(backend, TargetDesc::depth(format!("Shadow Cascade {i}"), *res))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Render targets: reflection {:?}, refraction {:?}, {} shadow cascades",
            settings.reflection_size,
            settings.refraction_size,
            plan.cascades()
        );

        Ok(Self {
            plan,
            wind: WindFactor::new(settings.wind_step),
            settings,
            targets: RenderTargets {
                reflection,
                refraction,
                shadows,
            },
        })
    }

    pub fn wind_factor(&self) -> f32 {
        self.wind.value()
    }

    pub fn set_refraction_culling(&mut self, culling: RefractionCulling) {
        self.settings.refraction_culling = culling;
    }

    /// Release every target this orchestrator created
    pub fn release<B: RenderBackend>(self, backend: &mut B) {
        for target in self.targets.all() {
            backend.release_target(target.id);
        }
    }

    /// Run every pass of one frame
    pub fn render_frame<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        scene: &Scene,
        frame: &FrameState,
    ) -> FrameReport {
        let wind_factor = self.wind.advance();

        let (width, height) = backend.screen_size();
        let screen = Viewport::full(width, height);
        let aspect = screen.aspect();
        let view = frame.camera.view_matrix();
        let projection = frame.projection.matrix(aspect);

        let mut report = FrameReport {
            light_view: Mat4::IDENTITY,
            cascades: Vec::new(),
            light_space: Vec::new(),
            wind_factor,
            reflection_oblique: false,
        };

        for pass in self.plan.passes() {
            log::debug!("{} pass", pass.kind);
            match pass.kind {
                PassKind::CascadeSetup => {
                    let light = light_view(
                        frame.sun.towards_light(),
                        frame.camera.position,
                        self.settings.light_distance,
                    );
                    let cascades = cascade::fit(
                        &self.settings.cascade_planes,
                        view,
                        light,
                        aspect,
                        frame.projection.fov_y,
                    );
                    report.light_space = cascades.iter().map(|c| c.projection * light).collect();
                    report.light_view = light;
                    report.cascades = cascades;
                }
                PassKind::Reflection => {
                    report.reflection_oblique =
                        self.reflection_pass(backend, scene, frame, projection, screen);
                }
                PassKind::Refraction => {
                    self.refraction_pass(backend, scene, frame, view, projection, screen);
                }
                PassKind::Shadow(i) => {
                    if let (Some(target), Some(light_space)) =
                        (self.targets.shadows.get(i), report.light_space.get(i))
                    {
                        shadow_pass(backend, scene, i, *target, *light_space, screen);
                    }
                }
                PassKind::Composite => {
                    self.composite_pass(backend, scene, frame, view, projection, screen, &report);
                }
            }
        }

        report
    }

    /// Returns whether the oblique projection was applied
    fn reflection_pass<B: RenderBackend>(
        &self,
        backend: &mut B,
        scene: &Scene,
        frame: &FrameState,
        projection: Mat4,
        screen: Viewport,
    ) -> bool {
        let mirrored = frame.camera.mirrored(frame.water_level);
        let view = mirrored.view_matrix();
        let world_plane = Vec4::new(0.0, 1.0, 0.0, -frame.water_level);
        let eye_plane = transform_plane(world_plane, view);

        let oblique = eye_plane.w < 0.0;
        let eye = Eye {
            view,
            projection: if oblique {
                make_oblique(projection, eye_plane)
            } else {
                projection
            },
            sky_projection: projection,
            position: mirrored.position,
        };

        let target = self.targets.reflection;
        backend.set_clip_plane(Some(world_plane));
        backend.begin_pass(
            "Reflection Pass",
            PassTarget::Offscreen(target.id),
            ClearOp::color_and_depth(ClearOp::SKY),
        );
        backend.set_viewport(target.viewport);
        self.draw_surroundings(backend, scene, frame, &eye);
        self.draw_markers(backend, scene, frame, &eye);
        backend.end_pass();
        backend.set_viewport(screen);

        oblique
    }

    fn refraction_pass<B: RenderBackend>(
        &self,
        backend: &mut B,
        scene: &Scene,
        frame: &FrameState,
        view: Mat4,
        projection: Mat4,
        screen: Viewport,
    ) {
        let world_plane = Vec4::new(0.0, -1.0, 0.0, frame.water_level);
        let (clip, projection) = match self.settings.refraction_culling {
            RefractionCulling::None => (None, projection),
            RefractionCulling::ClipPlane => (Some(world_plane), projection),
            RefractionCulling::ClipPlaneOblique => {
                let eye_plane = transform_plane(world_plane, view);
                let projection = if eye_plane.w < 0.0 {
                    make_oblique(projection, eye_plane)
                } else {
                    projection
                };
                (Some(world_plane), projection)
            }
        };
        let eye = Eye {
            view,
            projection,
            sky_projection: frame.projection.matrix(screen.aspect()),
            position: frame.camera.position,
        };

        let target = self.targets.refraction;
        backend.set_clip_plane(clip);
        backend.begin_pass(
            "Refraction Pass",
            PassTarget::Offscreen(target.id),
            ClearOp::color_and_depth(ClearOp::SKY),
        );
        backend.set_viewport(target.viewport);
        self.draw_surroundings(backend, scene, frame, &eye);
        backend.end_pass();
        backend.set_clip_plane(None);
        backend.set_viewport(screen);
    }

    #[allow(clippy::too_many_arguments)]
    fn composite_pass<B: RenderBackend>(
        &self,
        backend: &mut B,
        scene: &Scene,
        frame: &FrameState,
        view: Mat4,
        projection: Mat4,
        screen: Viewport,
        report: &FrameReport,
    ) {
        let eye = Eye {
            view,
            projection,
            sky_projection: projection,
            position: frame.camera.position,
        };

        backend.set_clip_plane(None);
        backend.begin_pass(
            "Composite Pass",
            PassTarget::Screen,
            ClearOp::color_and_depth(ClearOp::SKY),
        );
        backend.set_viewport(screen);

        draw_skybox(backend, scene, &eye);
        backend.draw_indexed(DrawCall::new(
            scene.terrain.mesh,
            ShaderParams::Terrain(TerrainParams {
                light_space: report.light_space.clone(),
                cascade_splits: self.settings.cascade_planes.iter().skip(1).copied().collect(),
                shadow_maps: self.targets.shadows.iter().map(|t| t.id).collect(),
                ..self.terrain_params(scene, frame, &eye)
            }),
        ));
        draw_models(backend, scene, frame, &eye);

        if let Some(wall) = scene.wall {
            backend.draw_indexed(DrawCall::new(
                wall.mesh,
                ShaderParams::Wall(WallParams {
                    model: wall.transform,
                    view: eye.view,
                    projection: eye.projection,
                    camera_position: eye.position,
                    light_directions: frame
                        .wall_lights
                        .iter()
                        .map(|l| wall.transform.transform_vector3(*l))
                        .collect(),
                    mode: frame.wall.mode,
                    max_height: frame.wall.max_height,
                    max_step_count: frame.wall.max_step_count,
                    step_length: frame.wall.step_length,
                    reflectivity: frame.wall.reflectivity,
                }),
            ));
        }
        self.draw_markers(backend, scene, frame, &eye);

        // Water samples both planar targets, so it goes last
        backend.draw_indexed(DrawCall::new(
            scene.water.mesh,
            ShaderParams::Water(WaterParams {
                model: scene.water.transform,
                view: eye.view,
                projection: eye.projection,
                camera_position: eye.position,
                light_direction: frame.sun.towards_light(),
                light_color: frame.sun.color,
                wind_factor: report.wind_factor,
                wave_strength: self.settings.wave_strength,
                reflection: self.targets.reflection.id,
                refraction: self.targets.refraction.id,
            }),
        ));

        backend.end_pass();
    }

    /// Skybox, terrain and models, as seen in the planar passes
    fn draw_surroundings<B: RenderBackend>(
        &self,
        backend: &mut B,
        scene: &Scene,
        frame: &FrameState,
        eye: &Eye,
    ) {
        draw_skybox(backend, scene, eye);
        backend.draw_indexed(DrawCall::new(
            scene.terrain.mesh,
            ShaderParams::Terrain(self.terrain_params(scene, frame, eye)),
        ));
        draw_models(backend, scene, frame, eye);
    }

    /// Unshadowed terrain parameters
    fn terrain_params(&self, scene: &Scene, frame: &FrameState, eye: &Eye) -> TerrainParams {
        TerrainParams {
            model: scene.terrain.transform,
            view: eye.view,
            projection: eye.projection,
            light_direction: frame.sun.towards_light(),
            light_color: frame.sun.color,
            ambient: frame.ambient,
            sand_threshold: self.settings.sand_threshold,
            grass_threshold: self.settings.grass_threshold,
            light_space: Vec::new(),
            cascade_splits: Vec::new(),
            shadow_maps: Vec::new(),
        }
    }

    fn draw_markers<B: RenderBackend>(
        &self,
        backend: &mut B,
        scene: &Scene,
        frame: &FrameState,
        eye: &Eye,
    ) {
        let (Some(marker), Some(wall)) = (scene.marker, scene.wall) else {
            return;
        };
        let view_projection = eye.projection * eye.view;
        for light in &frame.wall_lights {
            let position = wall
                .transform
                .transform_point3(*light * self.settings.marker_distance);
            backend.draw_arrays(DrawCall::new(
                marker,
                ShaderParams::Marker(MarkerParams {
                    model: Mat4::from_translation(position),
                    view_projection,
                    color: MARKER_COLOR,
                }),
            ));
        }
    }
}

fn create_target<B: RenderBackend>(
    backend: &mut B,
    desc: TargetDesc,
) -> Result<OffscreenTarget, RenderError> {
    let viewport = desc.viewport();
    let id = backend.create_target(&desc)?;
    Ok(OffscreenTarget { id, viewport })
}

fn shadow_pass<B: RenderBackend>(
    backend: &mut B,
    scene: &Scene,
    cascade: usize,
    target: OffscreenTarget,
    light_space: Mat4,
    screen: Viewport,
) {
    backend.begin_pass(
        &format!("Shadow Pass {cascade}"),
        PassTarget::Offscreen(target.id),
        ClearOp::depth_only(),
    );
    backend.set_viewport(target.viewport);
    for mesh in std::iter::once(&scene.terrain).chain(scene.models.iter()) {
        backend.draw_indexed(DrawCall::new(
            mesh.mesh,
            ShaderParams::Depth(DepthParams {
                model: mesh.transform,
                light_space,
            }),
        ));
    }
    backend.end_pass();
    backend.set_viewport(screen);
}

fn draw_skybox<B: RenderBackend>(backend: &mut B, scene: &Scene, eye: &Eye) {
    backend.draw_arrays(DrawCall::new(
        scene.skybox,
        ShaderParams::Skybox(SkyboxParams {
            view_projection: eye.sky_projection * rotation_only(eye.view),
        }),
    ));
}

fn draw_models<B: RenderBackend>(backend: &mut B, scene: &Scene, frame: &FrameState, eye: &Eye) {
    for model in &scene.models {
        backend.draw_indexed(DrawCall::new(
            model.mesh,
            ShaderParams::Model(ModelParams {
                model: model.transform,
                view: eye.view,
                projection: eye.projection,
                light_direction: frame.sun.towards_light(),
                light_color: frame.sun.color,
                ambient: frame.ambient,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ShaderKind, UniformValue};
    use crate::recorder::{Command, CommandRecorder, RecordedPass};

    const WIDTH: u32 = 1280;
    const HEIGHT: u32 = 720;

    fn scene() -> Scene {
        Scene {
            skybox: MeshId(0),
            terrain: SceneMesh::new(MeshId(1), Mat4::IDENTITY),
            models: vec![
                SceneMesh::new(MeshId(2), Mat4::from_translation(Vec3::new(3.0, 1.0, -4.0))),
                SceneMesh::new(MeshId(3), Mat4::from_scale(Vec3::splat(2.0))),
            ],
            water: SceneMesh::new(MeshId(4), Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0))),
            wall: Some(SceneMesh::new(
                MeshId(5),
                Mat4::from_translation(Vec3::new(0.0, 4.0, -12.0)),
            )),
            marker: Some(MeshId(6)),
        }
    }

    fn frame() -> FrameState {
        FrameState::from_config(&ViewerConfig::default())
    }

    fn setup(settings: OrchestratorSettings) -> (CommandRecorder, Orchestrator) {
        let mut rec = CommandRecorder::new(WIDTH, HEIGHT);
        let orchestrator = Orchestrator::new(&mut rec, settings).unwrap();
        rec.clear();
        (rec, orchestrator)
    }

    fn render_once(settings: OrchestratorSettings) -> (CommandRecorder, FrameReport) {
        let (mut rec, mut orchestrator) = setup(settings);
        let report = orchestrator.render_frame(&mut rec, &scene(), &frame());
        (rec, report)
    }

    #[test]
    fn passes_run_in_fixed_order() {
        let (rec, _) = render_once(OrchestratorSettings::default());
        let labels: Vec<String> = rec.passes().into_iter().map(|p| p.label).collect();
        assert_eq!(
            labels,
            vec![
                "Reflection Pass",
                "Refraction Pass",
                "Shadow Pass 0",
                "Shadow Pass 1",
                "Shadow Pass 2",
                "Composite Pass",
            ]
        );
    }

    #[test]
    fn clip_plane_only_in_planar_passes() {
        let (rec, _) = render_once(OrchestratorSettings::default());
        let passes = rec.passes();
        let level = ViewerConfig::default().water.level;
        assert_eq!(passes[0].clip_plane, Some(Vec4::new(0.0, 1.0, 0.0, -level)));
        assert_eq!(passes[1].clip_plane, Some(Vec4::new(0.0, -1.0, 0.0, level)));
        for pass in &passes[2..] {
            assert_eq!(pass.clip_plane, None, "{}", pass.label);
        }
        // Explicitly disabled right before the composite pass begins
        let begin = rec
            .commands()
            .iter()
            .position(|c| matches!(c, Command::BeginPass { label, .. } if label == "Composite Pass"))
            .unwrap();
        assert_eq!(rec.commands()[begin - 1], Command::SetClipPlane(None));
    }

    #[test]
    fn refraction_without_culling_has_no_clip_plane() {
        let settings = OrchestratorSettings {
            refraction_culling: RefractionCulling::None,
            ..Default::default()
        };
        let (rec, _) = render_once(settings);
        assert_eq!(rec.passes()[1].clip_plane, None);
    }

    #[test]
    fn viewport_reset_after_offscreen_passes() {
        let (rec, _) = render_once(OrchestratorSettings::default());
        let screen = Viewport::full(WIDTH, HEIGHT);
        let commands = rec.commands();
        let mut offscreen = false;
        let mut checked = 0;
        for (i, command) in commands.iter().enumerate() {
            match command {
                Command::BeginPass { target, .. } => {
                    offscreen = matches!(target, PassTarget::Offscreen(_));
                }
                Command::EndPass if offscreen => {
                    let reset = commands[i + 1..]
                        .iter()
                        .take_while(|c| !matches!(c, Command::BeginPass { .. }))
                        .any(|c| *c == Command::SetViewport(screen));
                    assert!(reset, "no viewport reset after command {i}");
                    checked += 1;
                }
                _ => {}
            }
        }
        assert_eq!(checked, 5);
    }

    #[test]
    fn offscreen_viewports_ignore_window_size() {
        let (mut rec, mut orchestrator) = setup(OrchestratorSettings::default());
        rec.set_screen_size(1920, 1080);
        orchestrator.render_frame(&mut rec, &scene(), &frame());
        let passes = rec.passes();
        assert_eq!(passes[0].viewport, Some(Viewport::full(640, 360)));
        assert_eq!(passes[2].viewport, Some(Viewport::full(2048, 2048)));
        assert_eq!(passes[4].viewport, Some(Viewport::full(1024, 1024)));
        assert_eq!(passes[5].viewport, Some(Viewport::full(1920, 1080)));
    }

    #[test]
    fn shadow_passes_draw_only_opaque_depth() {
        let (rec, _) = render_once(OrchestratorSettings::default());
        for pass in rec.passes().iter().filter(|p| p.label.starts_with("Shadow")) {
            // Terrain plus two model parts
            assert_eq!(pass.draws.len(), 3);
            assert!(pass.shader_kinds().iter().all(|k| *k == ShaderKind::Depth));
            assert!(pass.draws.iter().all(|d| d.mesh != MeshId(0) && d.mesh != MeshId(4)));
        }
    }

    #[test]
    fn water_is_drawn_last() {
        let (rec, _) = render_once(OrchestratorSettings::default());
        let composite = rec.passes().pop().unwrap();
        assert_eq!(composite.shader_kinds().first(), Some(&ShaderKind::Skybox));
        assert_eq!(composite.shader_kinds().last(), Some(&ShaderKind::Water));
        assert_eq!(composite.draws_of(ShaderKind::Water).count(), 1);
        assert_eq!(composite.draws_of(ShaderKind::Wall).count(), 1);
        assert_eq!(composite.draws_of(ShaderKind::Marker).count(), 4);
    }

    #[test]
    fn composite_terrain_carries_every_cascade() {
        let settings = OrchestratorSettings::default();
        let splits = settings.cascade_planes[1..].to_vec();
        let (rec, report) = render_once(settings);
        let composite = rec.passes().pop().unwrap();
        let terrain = composite.draws_of(ShaderKind::Terrain).next().unwrap();
        let ShaderParams::Terrain(params) = &terrain.params else {
            panic!("terrain draw without terrain params");
        };
        assert_eq!(params.light_space.len(), 3);
        assert_eq!(params.light_space, report.light_space);
        assert_eq!(params.cascade_splits, splits);
        assert_eq!(params.shadow_maps.len(), 3);
        assert_eq!(
            terrain.params.uniform("cascadeCount"),
            Some(UniformValue::Int(3))
        );
    }

    #[test]
    fn light_space_is_projection_times_light_view() {
        let (_, report) = render_once(OrchestratorSettings::default());
        assert_eq!(report.cascades.len(), 3);
        for (fit, light_space) in report.cascades.iter().zip(&report.light_space) {
            assert_eq!(*light_space, fit.projection * report.light_view);
        }
    }

    #[test]
    fn reflection_uses_mirrored_camera() {
        let (rec, report) = render_once(OrchestratorSettings::default());
        // Default camera sits above the water, so its mirror is below it
        assert!(report.reflection_oblique);
        let reflection = &rec.passes()[0];
        let terrain = reflection.draws_of(ShaderKind::Terrain).next().unwrap();
        let f = frame();
        let mirrored = f.camera.mirrored(f.water_level);
        assert_eq!(
            terrain.params.uniform("view"),
            Some(UniformValue::Mat4(mirrored.view_matrix()))
        );
        assert_eq!(reflection.draws_of(ShaderKind::Water).count(), 0);
        assert_eq!(reflection.draws_of(ShaderKind::Marker).count(), 4);
    }

    /// Camera five units up, looking almost straight down at the water
    fn overhead_frame() -> FrameState {
        let mut state = frame();
        state.camera = Camera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.1));
        state
    }

    fn render_with(settings: OrchestratorSettings, state: &FrameState) -> Vec<RecordedPass> {
        let (mut rec, mut orchestrator) = setup(settings);
        orchestrator.render_frame(&mut rec, &scene(), state);
        rec.passes()
    }

    fn terrain_matrices(pass: &RecordedPass) -> (Mat4, Mat4) {
        let terrain = pass.draws_of(ShaderKind::Terrain).next().unwrap();
        let matrix = |name: &str| match terrain.params.uniform(name) {
            Some(UniformValue::Mat4(m)) => m,
            other => panic!("{name}: {other:?}"),
        };
        (matrix("view"), matrix("projection"))
    }

    /// Whether the point at height `y` on the camera's view ray lies past the near plane
    fn kept_at_height(camera: &Camera, y: f32, view: Mat4, projection: Mat4) -> bool {
        let forward = camera.forward();
        let point = camera.position + forward * ((y - camera.position.y) / forward.y);
        let clip = projection * view * point.extend(1.0);
        clip.z >= -clip.w && clip.z <= clip.w
    }

    #[test]
    fn reflection_projection_culls_below_water() {
        let state = overhead_frame();
        let passes = render_with(OrchestratorSettings::default(), &state);
        let (view, projection) = terrain_matrices(&passes[0]);
        let mirrored = state.camera.mirrored(state.water_level);
        assert_eq!(view, mirrored.view_matrix());
        assert!(kept_at_height(&mirrored, 2.0, view, projection));
        assert!(!kept_at_height(&mirrored, 1.0, view, projection));
    }

    #[test]
    fn oblique_refraction_culls_above_water() {
        let settings = OrchestratorSettings {
            refraction_culling: RefractionCulling::ClipPlaneOblique,
            ..Default::default()
        };
        let state = overhead_frame();
        let passes = render_with(settings, &state);
        let (view, projection) = terrain_matrices(&passes[1]);
        let aspect = Viewport::full(WIDTH, HEIGHT).aspect();
        assert_eq!(view, state.camera.view_matrix());
        assert_ne!(projection, state.projection.matrix(aspect));
        assert!(!kept_at_height(&state.camera, 2.0, view, projection));
        assert!(kept_at_height(&state.camera, 1.0, view, projection));
    }

    #[test]
    fn plain_clip_refraction_keeps_camera_projection() {
        let settings = OrchestratorSettings {
            refraction_culling: RefractionCulling::ClipPlane,
            ..Default::default()
        };
        let state = overhead_frame();
        let passes = render_with(settings, &state);
        let (view, projection) = terrain_matrices(&passes[1]);
        let aspect = Viewport::full(WIDTH, HEIGHT).aspect();
        assert_eq!(projection, state.projection.matrix(aspect));
        // Only the fragment clip test removes the geometry above the water
        assert!(kept_at_height(&state.camera, 2.0, view, projection));
        assert!(kept_at_height(&state.camera, 1.0, view, projection));
    }

    #[test]
    fn camera_below_water_skips_oblique_reflection() {
        let (mut rec, mut orchestrator) = setup(OrchestratorSettings::default());
        let mut state = frame();
        state.camera.position.y = state.water_level - 1.0;
        let report = orchestrator.render_frame(&mut rec, &scene(), &state);
        assert!(!report.reflection_oblique);
    }

    #[test]
    fn wind_advances_once_per_frame() {
        let settings = OrchestratorSettings {
            wind_step: 0.3,
            ..Default::default()
        };
        let (mut rec, mut orchestrator) = setup(settings);
        let mut values = Vec::new();
        for _ in 0..4 {
            values.push(orchestrator.render_frame(&mut rec, &scene(), &frame()).wind_factor);
        }
        let expected = [0.3, 0.6, 0.9, 0.2];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-5, "{values:?}");
        }
    }

    #[test]
    fn wind_factor_stays_in_unit_range() {
        for step in [0.0005, 0.37, 0.999, 1.0, 2.5, -0.2] {
            let mut wind = WindFactor::new(step);
            for _ in 0..5000 {
                let v = wind.advance();
                assert!((0.0..1.0).contains(&v), "step {step} gave {v}");
            }
        }
    }

    #[test]
    fn mismatched_resolutions_rejected() {
        let mut rec = CommandRecorder::new(WIDTH, HEIGHT);
        let settings = OrchestratorSettings {
            shadow_resolutions: vec![1024],
            ..Default::default()
        };
        assert!(Orchestrator::new(&mut rec, settings).is_err());
    }

    #[test]
    fn release_frees_all_targets() {
        let (mut rec, orchestrator) = setup(OrchestratorSettings::default());
        assert_eq!(rec.live_targets(), 5);
        orchestrator.release(&mut rec);
        assert_eq!(rec.live_targets(), 0);
    }
}
