//! Oblique near-plane projection
//!
//! Replaces the near clipping plane of a perspective projection with an
//! arbitrary camera-space plane (Lengyel's technique), so geometry on the
//! wrong side of the water surface is clipped by the rasterizer itself.

use glam::{Mat4, Vec4};

fn sgn(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Matrix element at (row, col)
fn at(m: &Mat4, row: usize, col: usize) -> f32 {
    m.col(col)[row]
}

/// Rewrite `projection` so its near plane coincides with `plane`, given in
/// the projection's eye space. Points with `dot(plane, p) >= 0` are kept.
///
/// The plane must not pass through the eye; `dot(plane, q) == 0` for the
/// far frustum corner `q` yields a non-finite matrix.
pub fn make_oblique(projection: Mat4, plane: Vec4) -> Mat4 {
    let m = projection;
    let q = Vec4::new(
        (sgn(plane.x) + at(&m, 0, 2)) / at(&m, 0, 0),
        (sgn(plane.y) + at(&m, 1, 2)) / at(&m, 1, 1),
        -1.0,
        (1.0 + at(&m, 2, 2)) / at(&m, 2, 3),
    );
    let c = plane * (2.0 / plane.dot(q));

    // Third row becomes c + (0, 0, 1, 0)
    let mut out = m;
    out.x_axis.z = c.x;
    out.y_axis.z = c.y;
    out.z_axis.z = c.z + 1.0;
    out.w_axis.z = c.w;
    out
}

/// Transform a world-space plane into the space of `view`
pub fn transform_plane(plane: Vec4, view: Mat4) -> Vec4 {
    view.inverse().transpose() * plane
}

/// The camera's own near plane in eye space, keeping `z <= -near`
pub fn near_plane(near: f32) -> Vec4 {
    Vec4::new(0.0, 0.0, -1.0, -near)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{projection_matrix, Camera};
    use glam::Vec3;

    fn assert_mat_close(a: Mat4, b: Mat4, eps: f32) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() <= eps, "{a:?}\n!=\n{b:?}");
        }
    }

    #[test]
    fn near_plane_leaves_projection_unchanged() {
        for (fov, aspect, near, far) in [
            (0.785, 16.0 / 9.0, 0.1, 200.0),
            (1.2, 1.0, 0.5, 50.0),
            (0.4, 2.4, 2.0, 1000.0),
        ] {
            let p = projection_matrix(fov, aspect, near, far);
            assert_mat_close(make_oblique(p, near_plane(near)), p, 1e-4);
        }
    }

    #[test]
    fn only_third_row_changes() {
        let p = projection_matrix(0.9, 1.5, 0.1, 100.0);
        let o = make_oblique(p, Vec4::new(0.0, 0.7, -0.7, -3.0));
        for col in 0..4 {
            for row in [0, 1, 3] {
                assert_eq!(at(&o, row, col), at(&p, row, col));
            }
        }
    }

    #[test]
    fn points_on_plane_land_on_near_clip() {
        let p = projection_matrix(0.9, 1.5, 0.1, 100.0);
        let plane = Vec4::new(0.0, 0.6, -0.8, -4.0);
        let o = make_oblique(p, plane);
        // A point on the plane, inside the frustum
        let on_plane = Vec3::new(0.0, 0.0, -5.0);
        assert!(plane.dot(on_plane.extend(1.0)).abs() < 1e-5);
        let clip = o * on_plane.extend(1.0);
        assert!((clip.z / clip.w + 1.0).abs() < 1e-4);
    }

    #[test]
    fn water_plane_in_mirrored_view() {
        let camera = Camera::new(Vec3::new(0.0, 6.0, 0.0), Vec3::new(0.0, -0.3, -1.0));
        let level = 2.0;
        let mirrored = camera.mirrored(level);
        let view = mirrored.view_matrix();
        let plane = transform_plane(Vec4::new(0.0, 1.0, 0.0, -level), view);
        // The mirrored eye is below the water, on the culled side
        assert!(plane.w < 0.0);

        let p = projection_matrix(0.785, 1.0, 0.1, 200.0);
        let o = make_oblique(p, plane);
        assert!(o.is_finite());
        // A world point above the water in front of the camera survives near clipping
        let above = view.transform_point3(Vec3::new(0.0, 3.0, -10.0));
        let clip = o * above.extend(1.0);
        assert!(clip.z >= -clip.w);
    }

    #[test]
    fn transform_plane_preserves_incidence() {
        let view = Camera::new(Vec3::new(1.0, 4.0, 2.0), Vec3::new(0.3, -0.2, -1.0)).view_matrix();
        let world_plane = Vec4::new(0.0, 1.0, 0.0, -1.5);
        let world_point = Vec3::new(7.0, 1.5, -3.0);
        let eye_plane = transform_plane(world_plane, view);
        let eye_point = view.transform_point3(world_point);
        assert!(eye_plane.dot(eye_point.extend(1.0)).abs() < 1e-4);
    }
}
