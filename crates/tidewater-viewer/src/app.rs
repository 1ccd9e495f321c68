//! Viewer application implementing winit ApplicationHandler
//!
//! Owns the window, the wgpu backend and the egui overlay. Each redraw
//! applies held keys to the camera, runs the frame through the
//! orchestrator, then draws the settings window on top.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tidewater_core::{RefractionCulling, ViewerConfig};
use tidewater_render::{
    FrameState, Orchestrator, OrchestratorSettings, RenderBackend, RenderContext, Scene,
    WgpuBackend,
};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::assets::SceneAssets;
use crate::controls::FlyController;
use crate::gui;
use crate::input::InputState;
use crate::stats::FrameStats;

/// Pixels of touchpad scroll counted as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

struct GpuState {
    backend: WgpuBackend,
    orchestrator: Orchestrator,
    scene: Scene,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

pub struct ViewerApp {
    config: ViewerConfig,
    /// Decoded assets, consumed by the upload at startup
    assets: Option<SceneAssets>,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_ctx: egui::Context,

    frame: FrameState,
    controller: FlyController,
    culling: RefractionCulling,
    input: InputState,
    stats: FrameStats,

    /// Startup failure reported back to `main`
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig, assets: SceneAssets) -> Self {
        Self {
            frame: FrameState::from_config(&config),
            controller: FlyController::from_config(&config.camera),
            culling: config.targets.refraction_culling,
            config,
            assets: Some(assets),
            window: None,
            gpu: None,
            egui_ctx: egui::Context::default(),
            input: InputState::new(),
            stats: FrameStats::default(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create window")?,
        );
        self.window = Some(window.clone());

        let context = pollster::block_on(RenderContext::new(
            window.clone(),
            self.config.window.vsync,
        ))
        .context("Failed to initialize wgpu")?;
        let mut backend = WgpuBackend::new(context);

        let assets = self
            .assets
            .take()
            .context("Scene assets were already uploaded")?;
        let scene = assets.upload(&mut backend)?;
        log::info!(
            "Scene uploaded: {} model parts, wall {}",
            scene.models.len(),
            if scene.wall.is_some() { "on" } else { "off" }
        );

        let orchestrator = Orchestrator::new(
            &mut backend,
            OrchestratorSettings::from_config(&self.config),
        )
        .context("Failed to create render targets")?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(backend.device(), backend.format(), None, 1, false);

        self.gpu = Some(GpuState {
            backend,
            orchestrator,
            scene,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn redraw(&mut self) {
        let scroll = self.input.take_scroll();
        if scroll != 0.0 {
            self.controller.scroll(scroll);
        }
        self.controller.update(&self.input, &mut self.frame.camera);

        let (Some(window), Some(gpu)) = (&self.window, self.gpu.as_mut()) else {
            return;
        };

        match gpu.backend.begin_frame() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                log::error!("Render error: {}", e);
                return;
            }
        }

        gpu.orchestrator.set_refraction_culling(self.culling);
        let report = gpu
            .orchestrator
            .render_frame(&mut gpu.backend, &gpu.scene, &self.frame);
        log::trace!(
            "wind {:.4}, oblique reflection {}",
            report.wind_factor,
            report.reflection_oblique
        );

        let raw_input = gpu.egui_winit.take_egui_input(window);
        let frame = &mut self.frame;
        let culling = &mut self.culling;
        let stats = &self.stats;
        let speed = self.controller.velocity();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            gui::settings_window(ctx, frame, culling, stats, speed);
        });
        gpu.egui_winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = gpu.backend.screen_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let egui_renderer = &mut gpu.egui_renderer;
        let textures_delta = &full_output.textures_delta;
        gpu.backend.end_frame(|device, queue, encoder, view| {
            for (id, image_delta) in &textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            egui_renderer.update_buffers(device, queue, encoder, &paint_jobs, &screen_descriptor);

            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        });

        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        self.stats.record_frame(Instant::now());
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            log::error!("Startup failed: {:#}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(gpu)) = (&self.window, self.gpu.as_mut()) {
            if gpu.egui_winit.on_window_event(window, &event).consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.backend.resize(new_size);
                }
            }

            WindowEvent::Focused(false) => {
                self.input.clear();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if key_code == KeyCode::Escape {
                                event_loop.exit();
                                return;
                            }
                            self.input.process_key_down(key_code);
                        }
                        ElementState::Released => {
                            self.input.process_key_up(key_code);
                        }
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.input.process_scroll(lines);
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = self.gpu.take() {
            let GpuState {
                mut backend,
                orchestrator,
                ..
            } = gpu;
            orchestrator.release(&mut backend);
            log::info!("Render targets released");
        }
    }
}
