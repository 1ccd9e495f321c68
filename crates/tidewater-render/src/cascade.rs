//! Cascaded shadow frustum fitting
//!
//! Each cascade covers one slice of the camera frustum between two
//! consecutive split distances. The slice corners are taken to light space
//! and enclosed by an axis-aligned orthographic projection padded by one
//! unit on every side.

use glam::{Mat4, Vec3};

/// Padding added around the fitted bounds on every axis
const BOUNDS_PADDING: f32 = 1.0;

/// Light-space bounds of one cascade, after clamping z to at most 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl CascadeBounds {
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    fn enclosing(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Orthographic projection over the padded bounds. The light looks down
    /// -Z, so near/far are the negated z extents.
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh_gl(
            self.min.x - BOUNDS_PADDING,
            self.max.x + BOUNDS_PADDING,
            self.min.y - BOUNDS_PADDING,
            self.max.y + BOUNDS_PADDING,
            -self.max.z - BOUNDS_PADDING,
            -self.min.z + BOUNDS_PADDING,
        )
    }
}

/// A fitted cascade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeFit {
    pub near: f32,
    pub far: f32,
    pub bounds: CascadeBounds,
    pub projection: Mat4,
}

/// The eight camera-space corners of the frustum slice between `near` and
/// `far`, near plane first
pub fn frustum_corners(near: f32, far: f32, aspect: f32, fov_y: f32) -> [Vec3; 8] {
    let fov_x = 2.0 * ((fov_y * 0.5).tan() * aspect).atan();
    let tan_x = (fov_x * 0.5).tan();
    let tan_y = (fov_y * 0.5).tan();

    let mut corners = [Vec3::ZERO; 8];
    for (slice, distance) in [near, far].into_iter().enumerate() {
        let x = distance * tan_x;
        let y = distance * tan_y;
        let quad = [
            Vec3::new(x, y, -distance),
            Vec3::new(-x, y, -distance),
            Vec3::new(x, -y, -distance),
            Vec3::new(-x, -y, -distance),
        ];
        corners[slice * 4..slice * 4 + 4].copy_from_slice(&quad);
    }
    corners
}

/// Fit one orthographic projection per cascade.
///
/// `planes` holds N+1 ascending split distances; the result has N entries.
/// Fewer than two planes yields no cascades.
pub fn fit(
    planes: &[f32],
    camera_view: Mat4,
    light_view: Mat4,
    aspect: f32,
    fov_y: f32,
) -> Vec<CascadeFit> {
    let camera_to_light = light_view * camera_view.inverse();

    planes
        .windows(2)
        .map(|split| {
            let (near, far) = (split[0], split[1]);
            let corners = frustum_corners(near, far, aspect, fov_y)
                .map(|c| camera_to_light.transform_point3(c));

            let mut bounds = CascadeBounds::enclosing(&corners);
            bounds.min.z = bounds.min.z.min(0.0);
            bounds.max.z = bounds.max.z.min(0.0);

            CascadeFit {
                near,
                far,
                bounds,
                projection: bounds.projection(),
            }
        })
        .collect()
}

/// Projection matrices only, one per cascade
pub fn fit_projections(
    planes: &[f32],
    camera_view: Mat4,
    light_view: Mat4,
    aspect: f32,
    fov_y: f32,
) -> Vec<Mat4> {
    fit(planes, camera_view, light_view, aspect, fov_y)
        .into_iter()
        .map(|c| c.projection)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::light::light_view;

    fn scene() -> (Mat4, Mat4) {
        let camera = Camera::default();
        let light = light_view(Vec3::new(-1.0, 1.5, -0.5), Vec3::ZERO, 100.0);
        (camera.view_matrix(), light)
    }

    #[test]
    fn one_cascade_per_slice() {
        let (view, light) = scene();
        let fits = fit(&[0.1, 10.0, 40.0, 200.0], view, light, 16.0 / 9.0, 0.785);
        assert_eq!(fits.len(), 3);
        assert_eq!(fits[1].near, 10.0);
        assert_eq!(fits[1].far, 40.0);
        assert!(fit(&[1.0], view, light, 1.0, 0.785).is_empty());
    }

    #[test]
    fn projections_follow_fitted_cascades() {
        let (view, light) = scene();
        let planes = [0.1, 10.0, 40.0, 200.0];
        let projections = fit_projections(&planes, view, light, 16.0 / 9.0, 0.785);
        let fits = fit(&planes, view, light, 16.0 / 9.0, 0.785);
        assert_eq!(projections.len(), 3);
        for (projection, fit) in projections.iter().zip(&fits) {
            assert_eq!(*projection, fit.projection);
        }
    }

    #[test]
    fn bounds_are_ordered_and_non_positive() {
        let (view, light) = scene();
        for fit in fit(&[0.1, 5.0, 25.0, 120.0, 200.0], view, light, 1.5, 0.9) {
            let b = fit.bounds;
            assert!(b.min.x <= b.max.x);
            assert!(b.min.y <= b.max.y);
            assert!(b.min.z <= b.max.z);
            assert!(b.max.z <= 0.0);
            assert!(fit.projection.is_finite());
        }
    }

    #[test]
    fn bounds_clamped_when_slice_behind_light() {
        // Light placed inside the frustum so part of the slice has z > 0
        let view = Camera::new(Vec3::ZERO, Vec3::NEG_Z).view_matrix();
        let light = light_view(Vec3::Z, Vec3::new(0.0, 0.0, -5.0), 1.0);
        let fits = fit(&[0.1, 20.0], view, light, 1.0, 1.0);
        assert_eq!(fits[0].bounds.max.z, 0.0);
        assert!(fits[0].bounds.min.z < 0.0);
    }

    #[test]
    fn degenerate_slice_stays_finite() {
        let (view, light) = scene();
        let fits = fit(&[0.1, 0.1], view, light, 16.0 / 9.0, 0.785);
        assert_eq!(fits.len(), 1);
        assert!(fits[0].bounds.is_finite());
        assert!(fits[0].projection.is_finite());
        assert!(fits[0].projection.determinant().abs() > 0.0);
    }

    #[test]
    fn corners_lie_on_slice_planes() {
        let corners = frustum_corners(2.0, 8.0, 2.0, std::f32::consts::FRAC_PI_2);
        for c in &corners[..4] {
            assert_eq!(c.z, -2.0);
            assert!((c.y.abs() - 2.0).abs() < 1e-5);
            // tan(fovH/2) = tan(fovV/2) * aspect = 2
            assert!((c.x.abs() - 4.0).abs() < 1e-4);
        }
        for c in &corners[4..] {
            assert_eq!(c.z, -8.0);
        }
    }

    #[test]
    fn fitted_projection_contains_corners() {
        let (view, light) = scene();
        let aspect = 1.6;
        let fov = 0.8;
        let camera_to_light = light * view.inverse();
        for fit in fit(&[0.5, 30.0], view, light, aspect, fov) {
            for corner in frustum_corners(fit.near, fit.far, aspect, fov) {
                let light_space = camera_to_light.transform_point3(corner);
                if light_space.z > 0.0 {
                    continue;
                }
                let ndc = fit.projection.project_point3(light_space);
                assert!(ndc.abs().max_element() <= 1.0 + 1e-4, "{:?}", ndc);
            }
        }
    }
}
