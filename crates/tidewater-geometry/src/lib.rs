//! Tidewater Geometry - procedural meshes for the scene
//!
//! Builds the terrain mesh from a height field and answers nearest-sample
//! height queries for placing objects on the terrain. Also generates the
//! static wall, water and cube meshes and imports glTF models. Does not
//! depend on the renderer; outputs plain `Pod` vertex data for it to upload.

pub mod heightfield;
pub mod model;
pub mod primitives;
pub mod terrain;

pub use heightfield::HeightField;
pub use model::{import_gltf, Model, ModelPart, ModelVertex, RgbaImage};
pub use primitives::{
    cube, wall_plane, water_quad, IndexedMesh, PositionVertex, TangentVertex, TexturedVertex,
};
pub use terrain::{build, wrap_uv, Terrain, TerrainMesh, TerrainVertex, TERRAIN_VERTEX_FLOATS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_count_matches_floor_formula() {
        for rows in 0..12 {
            for cols in 0..12 {
                let field = HeightField::flat(rows, cols, 0.25);
                let mesh = build(&field, 4.0, 3, 10.0);
                let expected = if rows < 3 || cols < 3 {
                    0
                } else {
                    ((rows - 2) / 2) * ((cols - 2) / 2)
                };
                assert_eq!(mesh.quad_count(), expected, "{}x{}", rows, cols);
                assert_eq!(mesh.indices.len(), 6 * expected);
                assert_eq!(mesh.vertices.len() * TERRAIN_VERTEX_FLOATS, 20 * expected);
            }
        }
    }

    #[test]
    fn small_grids_produce_empty_mesh() {
        for (rows, cols) in [(0, 0), (2, 9), (9, 2), (1, 1), (3, 3)] {
            let mesh = build(&HeightField::flat(rows, cols, 1.0), 1.0, 2, 1.0);
            assert!(mesh.is_empty());
            assert!(mesh.vertices.is_empty());
        }
    }

    #[test]
    fn five_by_five_scenario() {
        let field = HeightField::flat(5, 5, 0.0);
        let mesh = build(&field, 1.0, 2, 1.0);
        assert_eq!(mesh.quad_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3]);
        for v in &mesh.vertices {
            for uv in v.uv {
                assert!(uv == 0.0 || uv == 0.5, "unexpected uv {}", uv);
            }
            assert_eq!(v.position[1], 0.0);
        }
    }

    #[test]
    fn uv_wraps_by_density() {
        let density = 3;
        let field = HeightField::flat(11, 9, 0.0);
        let mesh = build(&field, 1.0, density, 5.0);
        // Each quad starts at an odd anchor and spans two samples.
        let mut r = 1;
        let mut quad = 0;
        while r + 2 < field.rows {
            let mut c = 1;
            while c + 2 < field.cols {
                let v = &mesh.vertices[quad * 4..quad * 4 + 4];
                assert_eq!(v[0].uv, [wrap_uv(r, density), wrap_uv(c, density)]);
                assert_eq!(v[1].uv, [wrap_uv(r + 2, density), wrap_uv(c, density)]);
                assert_eq!(v[2].uv, [wrap_uv(r, density), wrap_uv(c + 2, density)]);
                assert_eq!(v[3].uv, [wrap_uv(r + 2, density), wrap_uv(c + 2, density)]);
                c += 2;
                quad += 1;
            }
            r += 2;
        }
        assert_eq!(quad, mesh.quad_count());
        assert!(mesh
            .vertices
            .iter()
            .flat_map(|v| v.uv)
            .all(|u| (0.0..1.0).contains(&u)));
        assert_eq!(wrap_uv(7, 3), 1.0 / 3.0);
        assert_eq!(wrap_uv(6, 3), 0.0);
    }

    #[test]
    fn positions_map_to_world_extent() {
        let mut samples = vec![0.0; 25];
        samples[5 + 1] = 0.5; // row 1, col 1
        let field = HeightField::from_raw(samples, 5, 5).unwrap();
        let mesh = build(&field, 10.0, 4, 2.0);
        let first = mesh.vertices[0];
        // row 1 of 5 → 1/4 * 4 - 2 = -1
        assert_eq!(first.position, [-1.0, 5.0, -1.0]);
        let last = mesh.vertices[3];
        assert_eq!(last.position, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn quads_share_no_vertices() {
        let mesh = build(&HeightField::flat(9, 9, 0.0), 1.0, 2, 1.0);
        for (q, chunk) in mesh.indices.chunks(6).enumerate() {
            let base = q as u32 * 4;
            assert!(chunk.iter().all(|&i| i >= base && i < base + 4));
        }
    }

    #[test]
    fn height_at_uses_nearest_sample() {
        let mut samples = vec![0.0; 9];
        samples[4] = 1.0; // centre
        samples[8] = 0.5; // row 2, col 2
        let field = HeightField::from_raw(samples, 3, 3).unwrap();
        let terrain = Terrain::new(field, 6.0, 1, 10.0);

        assert_eq!(terrain.height_at(0.0, 0.0), 6.0);
        assert_eq!(terrain.height_at(1.0, -2.0), 6.0);
        assert_eq!(terrain.height_at(10.0, 10.0), 3.0);
        assert_eq!(terrain.height_at(-10.0, -10.0), 0.0);
        // Outside the extent clamps to the border sample
        assert_eq!(terrain.height_at(500.0, 500.0), 3.0);
    }

    #[test]
    fn height_at_on_empty_field_is_zero() {
        let terrain = Terrain::new(HeightField::flat(0, 0, 0.0), 1.0, 1, 1.0);
        assert_eq!(terrain.height_at(0.0, 0.0), 0.0);
        assert!(terrain.mesh.is_empty());
    }

    #[test]
    fn wall_plane_has_tangent_frame() {
        let plane = wall_plane(1.0, 1.0);
        assert_eq!(plane.vertices.len(), 6);
        assert_eq!(plane.indices, vec![0, 1, 2, 3, 4, 5]);
        for v in &plane.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
            let t = glam::Vec3::from_array(v.tangent);
            let b = glam::Vec3::from_array(v.bitangent);
            assert!((t.length() - 1.0).abs() < 1e-5);
            assert!((b.length() - 1.0).abs() < 1e-5);
            assert!(t.dot(glam::Vec3::Y).abs() < 1e-5);
        }
        // U grows along +X, V along +Z
        let t = glam::Vec3::from_array(plane.vertices[0].tangent);
        assert!((t - glam::Vec3::X).length() < 1e-5);
        let b = glam::Vec3::from_array(plane.vertices[0].bitangent);
        assert!((b - glam::Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn water_quad_layout() {
        let quad = water_quad(5.0, 2.0);
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.indices, vec![0, 1, 3, 1, 2, 3]);
        assert!(quad.vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn cube_has_36_vertices() {
        let cube = cube(2.0);
        assert_eq!(cube.len(), 36);
        assert!(cube
            .iter()
            .flat_map(|v| v.position)
            .all(|c| c == 2.0 || c == -2.0));
    }
}
