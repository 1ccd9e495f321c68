//! Static procedural meshes: wall plane, water quad and cube

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Position + texture coordinate, used by the water quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Vertex carrying a full tangent frame for normal and parallax mapping
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TangentVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

/// Position-only vertex for the skybox and light markers
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

/// A simple indexed mesh
#[derive(Debug, Clone)]
pub struct IndexedMesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

/// Tangent and bitangent of a triangle from its positions and UVs
pub fn triangle_tangents(p: [Vec3; 3], uv: [Vec2; 3]) -> (Vec3, Vec3) {
    let edge1 = p[1] - p[0];
    let edge2 = p[2] - p[0];
    let d1 = uv[1] - uv[0];
    let d2 = uv[2] - uv[0];

    let det = d1.x * d2.y - d2.x * d1.y;
    if det.abs() < f32::EPSILON {
        return (Vec3::X, Vec3::Z);
    }
    let r = 1.0 / det;

    let tangent = (edge1 * d2.y - edge2 * d1.y) * r;
    let bitangent = (edge2 * d1.x - edge1 * d2.x) * r;
    (tangent.normalize(), bitangent.normalize())
}

/// A square on the XZ plane spanning `[-scale, scale]`, facing +Y, with
/// per-triangle tangent frames. Two triangles, six unshared vertices.
pub fn wall_plane(scale: f32, density: f32) -> IndexedMesh<TangentVertex> {
    let pos = [
        Vec3::new(-scale, 0.0, scale),
        Vec3::new(-scale, 0.0, -scale),
        Vec3::new(scale, 0.0, -scale),
        Vec3::new(scale, 0.0, scale),
    ];
    let uv = [
        Vec2::new(0.0, density),
        Vec2::new(0.0, 0.0),
        Vec2::new(density, 0.0),
        Vec2::new(density, density),
    ];
    let normal = Vec3::Y;

    let mut vertices = Vec::with_capacity(6);
    for tri in [[0usize, 1, 2], [0, 2, 3]] {
        let (tangent, bitangent) = triangle_tangents(
            [pos[tri[0]], pos[tri[1]], pos[tri[2]]],
            [uv[tri[0]], uv[tri[1]], uv[tri[2]]],
        );
        for &i in &tri {
            vertices.push(TangentVertex {
                position: pos[i].to_array(),
                normal: normal.to_array(),
                uv: uv[i].to_array(),
                tangent: tangent.to_array(),
                bitangent: bitangent.to_array(),
            });
        }
    }

    IndexedMesh {
        vertices,
        indices: (0..6).collect(),
    }
}

/// The water surface: a quad at y = 0 spanning `[-scale, scale]`
pub fn water_quad(scale: f32, density: f32) -> IndexedMesh<TexturedVertex> {
    let vertices = vec![
        TexturedVertex {
            position: [scale, 0.0, scale],
            uv: [0.0, density],
        },
        TexturedVertex {
            position: [scale, 0.0, -scale],
            uv: [0.0, 0.0],
        },
        TexturedVertex {
            position: [-scale, 0.0, -scale],
            uv: [density, 0.0],
        },
        TexturedVertex {
            position: [-scale, 0.0, scale],
            uv: [density, density],
        },
    ];
    IndexedMesh {
        vertices,
        indices: vec![0, 1, 3, 1, 2, 3],
    }
}

/// A non-indexed cube of half-size `scale`, 36 vertices. Drawn without
/// face culling, so winding is not significant.
pub fn cube(scale: f32) -> Vec<PositionVertex> {
    const FACES: [[[f32; 3]; 6]; 6] = [
        // -Z
        [
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
        ],
        // -X
        [
            [-1.0, -1.0, 1.0],
            [-1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [-1.0, -1.0, 1.0],
        ],
        // +X
        [
            [1.0, -1.0, -1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
        ],
        // +Z
        [
            [-1.0, -1.0, 1.0],
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, -1.0, 1.0],
            [-1.0, -1.0, 1.0],
        ],
        // +Y
        [
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
            [-1.0, 1.0, -1.0],
        ],
        // -Y
        [
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
        ],
    ];

    FACES
        .iter()
        .flatten()
        .map(|p| PositionVertex {
            position: [p[0] * scale, p[1] * scale, p[2] * scale],
        })
        .collect()
}
