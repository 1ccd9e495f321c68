//! A backend that records commands instead of drawing
//!
//! Used by the orchestrator tests and by `--trace-frame` to dump the exact
//! pass and draw sequence of one frame.

use std::collections::BTreeMap;

use glam::Vec4;

use crate::backend::{
    ClearOp, DrawCall, PassTarget, RenderBackend, TargetDesc, TargetId, Viewport,
};
use crate::context::RenderError;
use crate::params::ShaderKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTarget(TargetId, TargetDesc),
    ReleaseTarget(TargetId),
    BeginPass {
        label: String,
        target: PassTarget,
        clear: ClearOp,
    },
    SetViewport(Viewport),
    SetClipPlane(Option<Vec4>),
    DrawIndexed(DrawCall),
    DrawArrays(DrawCall),
    EndPass,
}

/// State observed at the start of a pass plus the draws it issued
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPass {
    pub label: String,
    pub target: PassTarget,
    pub clip_plane: Option<Vec4>,
    pub viewport: Option<Viewport>,
    pub draws: Vec<DrawCall>,
}

impl RecordedPass {
    pub fn shader_kinds(&self) -> Vec<ShaderKind> {
        self.draws.iter().map(|d| d.params.kind()).collect()
    }

    pub fn draws_of(&self, kind: ShaderKind) -> impl Iterator<Item = &DrawCall> {
        self.draws.iter().filter(move |d| d.params.kind() == kind)
    }
}

pub struct CommandRecorder {
    commands: Vec<Command>,
    targets: BTreeMap<TargetId, TargetDesc>,
    next_target: u32,
    screen: (u32, u32),
}

impl CommandRecorder {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            commands: Vec::new(),
            targets: BTreeMap::new(),
            next_target: 0,
            screen: (screen_width, screen_height),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Forget recorded commands, keeping live targets
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen = (width, height);
    }

    /// Group draws by the pass they were issued in
    pub fn passes(&self) -> Vec<RecordedPass> {
        let mut passes = Vec::new();
        let mut clip = None;
        let mut viewport = None;
        let mut current: Option<RecordedPass> = None;

        for command in &self.commands {
            match command {
                Command::SetClipPlane(plane) => clip = *plane,
                Command::SetViewport(v) => {
                    viewport = Some(*v);
                    if let Some(pass) = current.as_mut() {
                        pass.viewport = Some(*v);
                    }
                }
                Command::BeginPass { label, target, .. } => {
                    current = Some(RecordedPass {
                        label: label.clone(),
                        target: *target,
                        clip_plane: clip,
                        viewport,
                        draws: Vec::new(),
                    });
                }
                Command::DrawIndexed(draw) | Command::DrawArrays(draw) => {
                    if let Some(pass) = current.as_mut() {
                        pass.draws.push(draw.clone());
                    }
                }
                Command::EndPass => {
                    if let Some(pass) = current.take() {
                        passes.push(pass);
                    }
                }
                Command::CreateTarget(..) | Command::ReleaseTarget(_) => {}
            }
        }
        passes
    }

    /// One human-readable line per command
    pub fn trace(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| match command {
                Command::CreateTarget(id, desc) => format!(
                    "create target {} '{}' {}x{} {:?}",
                    id.0, desc.label, desc.width, desc.height, desc.kind
                ),
                Command::ReleaseTarget(id) => format!("release target {}", id.0),
                Command::BeginPass { label, target, .. } => {
                    format!("begin pass '{label}' -> {target:?}")
                }
                Command::SetViewport(v) => {
                    format!("  viewport {}x{} at ({}, {})", v.width, v.height, v.x, v.y)
                }
                Command::SetClipPlane(Some(p)) => {
                    format!("  clip plane ({}, {}, {}, {})", p.x, p.y, p.z, p.w)
                }
                Command::SetClipPlane(None) => "  clip plane off".to_string(),
                Command::DrawIndexed(draw) => {
                    format!("  draw indexed mesh {} {:?}", draw.mesh.0, draw.params.kind())
                }
                Command::DrawArrays(draw) => {
                    format!("  draw arrays mesh {} {:?}", draw.mesh.0, draw.params.kind())
                }
                Command::EndPass => "end pass".to_string(),
            })
            .collect()
    }
}

impl RenderBackend for CommandRecorder {
    fn create_target(&mut self, desc: &TargetDesc) -> Result<TargetId, RenderError> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RenderError::TargetCreation {
                label: desc.label.clone(),
                reason: "zero-sized target".into(),
            });
        }
        let id = TargetId(self.next_target);
        self.next_target += 1;
        self.targets.insert(id, desc.clone());
        self.commands.push(Command::CreateTarget(id, desc.clone()));
        Ok(id)
    }

    fn release_target(&mut self, id: TargetId) {
        self.targets.remove(&id);
        self.commands.push(Command::ReleaseTarget(id));
    }

    fn target_desc(&self, id: TargetId) -> Option<&TargetDesc> {
        self.targets.get(&id)
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn begin_pass(&mut self, label: &str, target: PassTarget, clear: ClearOp) {
        self.commands.push(Command::BeginPass {
            label: label.to_string(),
            target,
            clear,
        });
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(Command::SetViewport(viewport));
    }

    fn set_clip_plane(&mut self, plane: Option<Vec4>) {
        self.commands.push(Command::SetClipPlane(plane));
    }

    fn draw_indexed(&mut self, draw: DrawCall) {
        self.commands.push(Command::DrawIndexed(draw));
    }

    fn draw_arrays(&mut self, draw: DrawCall) {
        self.commands.push(Command::DrawArrays(draw));
    }

    fn end_pass(&mut self) {
        self.commands.push(Command::EndPass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MeshId;
    use crate::params::{ShaderParams, SkyboxParams};
    use glam::Mat4;

    #[test]
    fn draws_group_into_passes() {
        let mut rec = CommandRecorder::new(800, 600);
        let target = rec
            .create_target(&TargetDesc::color("Reflection", [320, 180]))
            .unwrap();
        rec.set_clip_plane(Some(Vec4::new(0.0, 1.0, 0.0, -1.0)));
        rec.begin_pass("reflection", PassTarget::Offscreen(target), ClearOp::depth_only());
        rec.set_viewport(Viewport::full(320, 180));
        rec.draw_arrays(DrawCall::new(
            MeshId(0),
            ShaderParams::Skybox(SkyboxParams {
                view_projection: Mat4::IDENTITY,
            }),
        ));
        rec.end_pass();
        rec.set_clip_plane(None);
        rec.begin_pass("composite", PassTarget::Screen, ClearOp::depth_only());
        rec.end_pass();

        let passes = rec.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].draws.len(), 1);
        assert!(passes[0].clip_plane.is_some());
        assert_eq!(passes[0].viewport, Some(Viewport::full(320, 180)));
        assert_eq!(passes[1].clip_plane, None);
        assert_eq!(passes[1].target, PassTarget::Screen);
    }

    #[test]
    fn zero_sized_target_is_an_error() {
        let mut rec = CommandRecorder::new(800, 600);
        assert!(rec.create_target(&TargetDesc::depth("Shadow", 0)).is_err());
        assert_eq!(rec.live_targets(), 0);
    }

    #[test]
    fn release_forgets_target() {
        let mut rec = CommandRecorder::new(800, 600);
        let id = rec.create_target(&TargetDesc::depth("Shadow", 512)).unwrap();
        assert!(rec.target_desc(id).is_some());
        rec.release_target(id);
        assert!(rec.target_desc(id).is_none());
        assert_eq!(rec.trace().last().map(String::as_str), Some("release target 0"));
    }
}
