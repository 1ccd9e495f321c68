//! Tidewater - interactive terrain and water scene viewer
//!
//! Usage:
//!   tidewater [--config <tidewater.toml>] [--assets <dir>] [--trace-frame]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tidewater_core::config::DEFAULT_CONFIG_PATH;
use tidewater_core::ViewerConfig;
use tidewater_viewer::{trace, SceneAssets, ViewerApp};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "tidewater")]
#[command(about = "Terrain, water and parallax wall viewer with cascaded shadows")]
struct Args {
    /// Path to the configuration file. Without it, `tidewater.toml` is read
    /// if present and built-in defaults are used otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset directory, overriding `assets.root` from the config
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Record one frame without a window, log its passes and draws, and exit
    #[arg(long)]
    trace_frame: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ViewerConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH))
            .with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG_PATH))?,
    };
    if let Some(root) = args.assets {
        config.assets.root = root;
    }

    let assets = SceneAssets::load(&config)?;

    if args.trace_frame {
        let scene = assets.placeholder_scene();
        let (lines, report) = trace::record_frame(&config, &scene)?;
        for line in &lines {
            log::info!("{}", line);
        }
        log::info!(
            "{} cascades, wind factor {:.4}, oblique reflection {}",
            report.cascades.len(),
            report.wind_factor,
            report.reflection_oblique
        );
        return Ok(());
    }

    log::info!("Controls:");
    log::info!("  W/S         - Move forward/back");
    log::info!("  A/D         - Strafe");
    log::info!("  Arrow keys  - Turn and look up/down");
    log::info!("  Scroll      - Change speed");
    log::info!("  Escape      - Exit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, assets);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
