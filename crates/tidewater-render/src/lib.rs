//! Tidewater Render - multi-pass wgpu renderer for the terrain and water scene
//!
//! A frame is a fixed sequence of passes: planar reflection and refraction
//! of the water plane, one depth pass per shadow cascade, then the
//! composite pass to the window. The [`Orchestrator`] walks that sequence
//! against any [`RenderBackend`]; [`WgpuBackend`] executes it on the GPU
//! and [`CommandRecorder`] records it for tests and frame traces.

pub mod backend;
mod camera;
pub mod cascade;
mod context;
mod gpu_mesh;
mod light;
pub mod oblique;
mod orchestrator;
pub mod params;
pub mod passes;
pub mod pipelines;
mod recorder;
mod textures;
mod wgpu_backend;

pub use backend::{
    ClearOp, DrawCall, MeshId, PassTarget, RenderBackend, TargetDesc, TargetId, TargetKind,
    Viewport,
};
pub use camera::{pitch_allowed, projection_matrix, rotation_only, Camera, Projection};
pub use cascade::{CascadeBounds, CascadeFit};
pub use context::{RenderContext, RenderError};
pub use gpu_mesh::{GpuMesh, VertexKind, VertexLayout};
pub use light::{light_view, DirectionalLight};
pub use orchestrator::{
    FrameReport, FrameState, Orchestrator, OrchestratorSettings, Scene, SceneMesh, WallSettings,
    WindFactor,
};
pub use params::{ShaderKind, ShaderParams, UniformValue};
pub use passes::{FramePlan, PassKind};
pub use recorder::{Command, CommandRecorder, RecordedPass};
pub use wgpu_backend::WgpuBackend;

#[cfg(test)]
mod tests {
    #[test]
    fn skybox_shader_wgsl_parses() {
        let source = include_str!("skybox_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("skybox_shader.wgsl failed to parse");
    }

    #[test]
    fn terrain_shader_wgsl_parses() {
        let source = include_str!("terrain_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("terrain_shader.wgsl failed to parse");
    }

    #[test]
    fn model_shader_wgsl_parses() {
        let source = include_str!("model_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("model_shader.wgsl failed to parse");
    }

    #[test]
    fn depth_shader_wgsl_parses() {
        let source = include_str!("depth_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("depth_shader.wgsl failed to parse");
    }

    #[test]
    fn wall_shader_wgsl_parses() {
        let source = include_str!("wall_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("wall_shader.wgsl failed to parse");
    }

    #[test]
    fn marker_shader_wgsl_parses() {
        let source = include_str!("marker_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("marker_shader.wgsl failed to parse");
    }

    #[test]
    fn water_shader_wgsl_parses() {
        let source = include_str!("water_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("water_shader.wgsl failed to parse");
    }
}
