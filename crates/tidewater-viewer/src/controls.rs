//! Free-fly keyboard controls
//!
//! W/S move along the view direction, A/D strafe horizontally, the arrow
//! keys yaw and pitch. Yaw turns by the movement speed, so scrolling
//! changes both.

use tidewater_core::config::CameraConfig;
use tidewater_render::Camera;
use winit::keyboard::KeyCode;

use crate::input::InputState;

#[derive(Debug, Clone, PartialEq)]
pub struct FlyController {
    velocity: f32,
    pitch_velocity: f32,
    scroll_step: f32,
    min_velocity: f32,
    max_velocity: f32,
}

impl FlyController {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            velocity: config
                .velocity
                .clamp(config.min_velocity, config.max_velocity),
            pitch_velocity: config.pitch_velocity,
            scroll_step: config.scroll_step,
            min_velocity: config.min_velocity,
            max_velocity: config.max_velocity,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Scale the movement speed by a scroll delta
    pub fn scroll(&mut self, lines: f32) {
        self.velocity =
            (self.velocity + lines * self.scroll_step).clamp(self.min_velocity, self.max_velocity);
    }

    /// Apply one frame of held keys to the camera
    pub fn update(&self, input: &InputState, camera: &mut Camera) {
        if input.is_key_down(KeyCode::KeyW) {
            camera.move_forward(self.velocity);
        }
        if input.is_key_down(KeyCode::KeyS) {
            camera.move_forward(-self.velocity);
        }
        if input.is_key_down(KeyCode::KeyD) {
            camera.strafe(self.velocity);
        }
        if input.is_key_down(KeyCode::KeyA) {
            camera.strafe(-self.velocity);
        }
        if input.is_key_down(KeyCode::ArrowLeft) {
            camera.yaw(self.velocity);
        }
        if input.is_key_down(KeyCode::ArrowRight) {
            camera.yaw(-self.velocity);
        }
        // Rejected pitch steps leave the camera where it was
        if input.is_key_down(KeyCode::ArrowUp) {
            camera.pitch(self.pitch_velocity);
        }
        if input.is_key_down(KeyCode::ArrowDown) {
            camera.pitch(-self.pitch_velocity);
        }
    }
}
