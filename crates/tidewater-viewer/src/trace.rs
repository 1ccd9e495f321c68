//! `--trace-frame`: run one frame through the command recorder

use anyhow::Result;
use tidewater_core::ViewerConfig;
use tidewater_render::{
    CommandRecorder, FrameReport, FrameState, Orchestrator, OrchestratorSettings, Scene,
};

/// Render one frame of `scene` into a recorder and return its trace lines
pub fn record_frame(config: &ViewerConfig, scene: &Scene) -> Result<(Vec<String>, FrameReport)> {
    let mut recorder = CommandRecorder::new(config.window.width, config.window.height);
    let mut orchestrator =
        Orchestrator::new(&mut recorder, OrchestratorSettings::from_config(config))?;
    let frame = FrameState::from_config(config);

    let report = orchestrator.render_frame(&mut recorder, scene, &frame);
    orchestrator.release(&mut recorder);
    Ok((recorder.trace(), report))
}
