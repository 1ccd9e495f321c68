//! The settings window: frame timing, wall shading and light controls

use tidewater_core::{RefractionCulling, WallMode};
use tidewater_render::FrameState;

use crate::stats::FrameStats;

const MAX_HEIGHT_RANGE: std::ops::RangeInclusive<f32> = 0.0001..=0.01;
const STEP_COUNT_RANGE: std::ops::RangeInclusive<u32> = 2..=128;

fn culling_label(culling: RefractionCulling) -> &'static str {
    match culling {
        RefractionCulling::None => "None",
        RefractionCulling::ClipPlane => "Clip plane",
        RefractionCulling::ClipPlaneOblique => "Clip plane + oblique",
    }
}

/// Draw the settings window, editing `frame` and `culling` in place
pub fn settings_window(
    ctx: &egui::Context,
    frame: &mut FrameState,
    culling: &mut RefractionCulling,
    stats: &FrameStats,
    speed: f32,
) {
    egui::Window::new("Tidewater")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            stats.ui(ui);
            ui.monospace(format!("speed {:.3}", speed));
            ui.separator();

            let wall = &mut frame.wall;
            egui::ComboBox::from_label("Wall shading")
                .selected_text(wall.mode.label())
                .show_ui(ui, |ui| {
                    for mode in WallMode::ALL {
                        ui.selectable_value(&mut wall.mode, mode, mode.label());
                    }
                });
            ui.add(
                egui::Slider::new(&mut wall.max_height, MAX_HEIGHT_RANGE)
                    .logarithmic(true)
                    .text("Max height"),
            );
            ui.add(egui::Slider::new(&mut wall.max_step_count, STEP_COUNT_RANGE).text("Max steps"));
            ui.add(egui::Slider::new(&mut wall.step_length, 1.0..=50.0).text("Step length"));
            ui.add(egui::Slider::new(&mut wall.reflectivity, 1.0..=512.0).text("Reflectivity"));

            egui::CollapsingHeader::new("Wall lights")
                .default_open(true)
                .show(ui, |ui| {
                    for (i, light) in frame.wall_lights.iter_mut().enumerate() {
                        ui.label(format!("Light {}", i + 1));
                        ui.add(egui::Slider::new(&mut light.x, -4.0..=4.0).text("x"));
                        ui.add(egui::Slider::new(&mut light.y, 0.0..=2.0).text("y"));
                        ui.add(egui::Slider::new(&mut light.z, -4.0..=4.0).text("z"));
                    }
                });

            ui.separator();
            egui::ComboBox::from_label("Refraction culling")
                .selected_text(culling_label(*culling))
                .show_ui(ui, |ui| {
                    for option in [
                        RefractionCulling::None,
                        RefractionCulling::ClipPlane,
                        RefractionCulling::ClipPlaneOblique,
                    ] {
                        ui.selectable_value(culling, option, culling_label(option));
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_core::ViewerConfig;

    #[test]
    fn window_without_input_changes_nothing() {
        let ctx = egui::Context::default();
        let mut frame = FrameState::from_config(&ViewerConfig::default());
        let before = frame.clone();
        let mut culling = RefractionCulling::ClipPlane;
        let stats = FrameStats::default();

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            settings_window(ctx, &mut frame, &mut culling, &stats, 0.02);
        });

        assert_eq!(frame, before);
        assert_eq!(culling, RefractionCulling::ClipPlane);
    }

    #[test]
    fn default_wall_settings_sit_inside_slider_ranges() {
        let frame = FrameState::from_config(&ViewerConfig::default());
        assert!(MAX_HEIGHT_RANGE.contains(&frame.wall.max_height));
        assert!(STEP_COUNT_RANGE.contains(&frame.wall.max_step_count));
    }
}
