//! Draw-call sink used by the frame orchestrator
//!
//! The orchestrator only talks to the GPU through this trait. The wgpu
//! implementation lives in `wgpu_backend`; `recorder` provides one that
//! logs commands instead of executing them.

use glam::Vec4;

use crate::context::RenderError;
use crate::params::ShaderParams;

/// Handle to an off-screen render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

/// Handle to a mesh uploaded before the first frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Sampled colour texture plus its own depth buffer
    ColorWithDepth,
    /// Sampled depth texture only
    DepthOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub kind: TargetKind,
}

impl TargetDesc {
    pub fn color(label: impl Into<String>, size: [u32; 2]) -> Self {
        Self {
            label: label.into(),
            width: size[0],
            height: size[1],
            kind: TargetKind::ColorWithDepth,
        }
    }

    pub fn depth(label: impl Into<String>, resolution: u32) -> Self {
        Self {
            label: label.into(),
            width: resolution,
            height: resolution,
            kind: TargetKind::DepthOnly,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::full(self.width, self.height)
    }
}

/// Where a pass renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTarget {
    Offscreen(TargetId),
    /// The window surface
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Clear values applied when a pass begins; `None` loads existing contents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearOp {
    pub color: Option<[f32; 4]>,
    pub depth: Option<f32>,
}

impl ClearOp {
    pub const SKY: [f32; 4] = [0.53, 0.72, 0.88, 1.0];

    pub fn color_and_depth(color: [f32; 4]) -> Self {
        Self {
            color: Some(color),
            depth: Some(1.0),
        }
    }

    pub fn depth_only() -> Self {
        Self {
            color: None,
            depth: Some(1.0),
        }
    }
}

/// One draw: which mesh, and the parameters of the shader that draws it
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshId,
    pub params: ShaderParams,
}

impl DrawCall {
    pub fn new(mesh: MeshId, params: ShaderParams) -> Self {
        Self { mesh, params }
    }
}

/// GPU binding collaborator
///
/// Pass and draw methods are infallible from the caller's point of view;
/// implementations log and drop commands they cannot execute.
pub trait RenderBackend {
    fn create_target(&mut self, desc: &TargetDesc) -> Result<TargetId, RenderError>;

    fn release_target(&mut self, id: TargetId);

    /// Description a target was created with
    fn target_desc(&self, id: TargetId) -> Option<&TargetDesc>;

    /// Size of the window surface
    fn screen_size(&self) -> (u32, u32);

    /// Bind `target` and apply `clear`
    fn begin_pass(&mut self, label: &str, target: PassTarget, clear: ClearOp);

    fn set_viewport(&mut self, viewport: Viewport);

    /// World-space plane; fragments with `dot(plane, p) < 0` are discarded.
    /// `None` disables the test.
    fn set_clip_plane(&mut self, plane: Option<Vec4>);

    fn draw_indexed(&mut self, draw: DrawCall);

    /// Non-indexed draw over the mesh's vertex list
    fn draw_arrays(&mut self, draw: DrawCall);

    fn end_pass(&mut self);
}
