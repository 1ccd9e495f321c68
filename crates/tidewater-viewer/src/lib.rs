//! Tidewater Viewer - window, input, GUI and asset loading
//!
//! Wires the renderer to winit and egui: `ViewerApp` is the winit
//! application handler, `SceneAssets` decodes and uploads the scene.

mod app;
pub mod assets;
pub mod controls;
mod gui;
pub mod input;
pub mod stats;
pub mod trace;

pub use app::ViewerApp;
pub use assets::SceneAssets;
