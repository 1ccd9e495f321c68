//! Directional lights

use glam::{Mat4, Vec3};

/// A directional light. `direction` points from the scene towards the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self { direction, color }
    }

    /// Unit vector towards the light
    pub fn towards_light(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Vec3::Y)
    }
}

/// View matrix looking at `target` from `distance` units along the light
/// direction. Uses +Z as up when the light is close to vertical.
pub fn light_view(direction: Vec3, target: Vec3, distance: f32) -> Mat4 {
    let dir = direction.try_normalize().unwrap_or(Vec3::Y);
    let eye = target + dir * distance;
    let up = if dir.dot(Vec3::Y).abs() > 0.999 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Mat4::look_at_rh(eye, target, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_lies_in_front_of_light() {
        let view = light_view(Vec3::new(-1.0, 1.5, -0.5), Vec3::ZERO, 50.0);
        let target = view.transform_point3(Vec3::ZERO);
        assert!(target.x.abs() < 1e-4);
        assert!(target.y.abs() < 1e-4);
        assert!((target.z + 50.0).abs() < 1e-3);
    }

    #[test]
    fn vertical_light_is_well_formed() {
        let view = light_view(Vec3::Y, Vec3::ZERO, 10.0);
        assert!(view.is_finite());
        let target = view.transform_point3(Vec3::ZERO);
        assert!((target.z + 10.0).abs() < 1e-4);
    }
}
