//! Free-fly camera and projection helpers
//!
//! All matrices here follow the OpenGL clip convention (z in `[-w, w]`).
//! The GPU backend converts to wgpu's depth range at upload time.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Minimum angle in radians kept between the view direction and world up/down
pub const PITCH_EPSILON: f32 = 0.1;

/// A free-fly camera: position plus an unnormalized forward direction.
/// Up is always world +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 0.0),
            direction: Vec3::new(0.2, -1.0, 0.2),
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Normalized view direction
    pub fn forward(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    /// Horizontal right vector, perpendicular to forward and world up
    pub fn right(&self) -> Vec3 {
        let f = self.forward();
        Vec3::new(-f.z, 0.0, f.x).try_normalize().unwrap_or(Vec3::X)
    }

    /// Right-handed look-at view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// The camera reflected across the horizontal plane `y = level`
    pub fn mirrored(&self, level: f32) -> Camera {
        Camera {
            position: Vec3::new(self.position.x, 2.0 * level - self.position.y, self.position.z),
            direction: Vec3::new(self.direction.x, -self.direction.y, self.direction.z),
        }
    }

    pub fn move_forward(&mut self, amount: f32) {
        self.position += self.forward() * amount;
    }

    /// Move sideways along the horizontal right vector
    pub fn strafe(&mut self, amount: f32) {
        self.position += self.right() * amount;
    }

    /// Rotate about world Y
    pub fn yaw(&mut self, angle: f32) {
        self.direction = Quat::from_rotation_y(angle) * self.direction;
    }

    /// Rotate about the camera's horizontal axis. The update is rejected
    /// (and `false` returned) when the new direction would come within
    /// `PITCH_EPSILON` of straight up or straight down.
    pub fn pitch(&mut self, angle: f32) -> bool {
        let axis = match self.forward().cross(Vec3::Y).try_normalize() {
            Some(axis) => axis,
            None => return false,
        };
        let candidate = Quat::from_axis_angle(axis, angle) * self.direction;
        if !pitch_allowed(candidate) {
            return false;
        }
        self.direction = candidate;
        true
    }
}

/// Whether a direction keeps its angle to world up within `(ε, π − ε)`
pub fn pitch_allowed(direction: Vec3) -> bool {
    let Some(dir) = direction.try_normalize() else {
        return false;
    };
    let angle = dir.dot(Vec3::Y).clamp(-1.0, 1.0).acos();
    angle > PITCH_EPSILON && angle < std::f32::consts::PI - PITCH_EPSILON
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 200.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        projection_matrix(self.fov_y, aspect, self.near, self.far)
    }
}

/// Right-handed perspective projection with OpenGL depth range
pub fn projection_matrix(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y, aspect, near, far)
}

/// View matrix with the translation removed, for drawing the skybox
pub fn rotation_only(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirroring_reflects_height_and_pitch() {
        let camera = Camera::new(Vec3::new(1.0, 5.0, -3.0), Vec3::new(0.5, -0.75, 0.25));
        let mirrored = camera.mirrored(2.0);
        assert_eq!(mirrored.position, Vec3::new(1.0, -1.0, -3.0));
        assert_eq!(mirrored.direction, Vec3::new(0.5, 0.75, 0.25));
        assert_eq!(mirrored.mirrored(2.0), camera);
    }

    #[test]
    fn mirroring_leaves_original_untouched() {
        let camera = Camera::default();
        let _ = camera.mirrored(1.5);
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let camera = Camera::new(Vec3::new(3.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -2.0));
        let view = camera.view_matrix();
        let eye = view.transform_point3(camera.position);
        assert!(eye.length() < 1e-5);
        let ahead = view.transform_point3(camera.position + Vec3::new(0.0, 0.0, -1.0));
        assert!((ahead - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn pitch_rejected_near_vertical() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        // Pitch up in steps until the guard stops it
        let mut applied = 0;
        while camera.pitch(0.04) {
            applied += 1;
            assert!(applied < 1000);
        }
        let angle = camera.forward().dot(Vec3::Y).acos();
        assert!(angle > PITCH_EPSILON);
        assert!(angle < PITCH_EPSILON + 0.04 + 1e-4);
        // Direction is unchanged by a rejected update
        let before = camera.direction;
        assert!(!camera.pitch(0.04));
        assert_eq!(camera.direction, before);
        // Pitching back down is still allowed
        assert!(camera.pitch(-0.04));
    }

    #[test]
    fn pitch_allowed_bounds() {
        assert!(pitch_allowed(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!pitch_allowed(Vec3::Y));
        assert!(!pitch_allowed(Vec3::NEG_Y));
        assert!(!pitch_allowed(Vec3::ZERO));
        let just_inside = Vec3::new((PITCH_EPSILON + 0.01).sin(), (PITCH_EPSILON + 0.01).cos(), 0.0);
        assert!(pitch_allowed(just_inside));
        let just_outside = Vec3::new((PITCH_EPSILON - 0.01).sin(), (PITCH_EPSILON - 0.01).cos(), 0.0);
        assert!(!pitch_allowed(just_outside));
    }

    #[test]
    fn yaw_keeps_height_component() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::new(1.0, -0.5, 0.0));
        camera.yaw(std::f32::consts::FRAC_PI_2);
        assert!((camera.direction.y + 0.5).abs() < 1e-6);
        assert!((camera.direction - Vec3::new(0.0, -0.5, -1.0)).length() < 1e-5);
    }

    #[test]
    fn strafe_is_horizontal() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0));
        camera.strafe(2.0);
        assert!((camera.position - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_only_drops_translation() {
        let camera = Camera::new(Vec3::new(10.0, 20.0, 30.0), Vec3::new(1.0, 0.0, 0.0));
        let sky = rotation_only(camera.view_matrix());
        assert_eq!(sky.w_axis, glam::Vec4::W);
        assert!(sky.transform_point3(Vec3::ZERO).length() < 1e-6);
    }
}
