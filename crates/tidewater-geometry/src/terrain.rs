//! Terrain mesh generation from a height field
//!
//! The grid is walked with stride 2 starting at index 1. Each anchor `(r, c)`
//! emits one quad spanning `r..=r+2` by `c..=c+2`, whose centre `(r+1, c+1)`
//! always has valid neighbours on every side. Quads never share vertices, so
//! texture coordinates can wrap per vertex without seams bleeding across the
//! whole mesh.

use bytemuck::{Pod, Zeroable};

use crate::heightfield::HeightField;

/// Local triangle pattern shared by every quad
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

/// A terrain vertex: world position plus wrapped texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Floats per vertex (position + uv)
pub const TERRAIN_VERTEX_FLOATS: usize = 5;

/// Triangulated terrain ready for upload
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn quad_count(&self) -> usize {
        self.indices.len() / QUAD_INDICES.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of quads a grid of the given size produces
    pub fn expected_quads(rows: usize, cols: usize) -> usize {
        if rows < 3 || cols < 3 {
            return 0;
        }
        ((rows - 2) / 2) * ((cols - 2) / 2)
    }
}

/// Maps grid indices to world coordinates on `[-scale, scale]` and back
#[derive(Debug, Clone, Copy)]
struct GridMapping {
    rows: usize,
    cols: usize,
    scale: f32,
}

impl GridMapping {
    fn axis_to_world(index: usize, count: usize, scale: f32) -> f32 {
        if count < 2 {
            return -scale;
        }
        index as f32 / (count - 1) as f32 * 2.0 * scale - scale
    }

    fn world_to_axis(world: f32, count: usize, scale: f32) -> usize {
        if count < 2 || scale == 0.0 {
            return 0;
        }
        let t = (world + scale) / (2.0 * scale) * (count - 1) as f32;
        (t.round().max(0.0) as usize).min(count - 1)
    }

    fn x(&self, row: usize) -> f32 {
        Self::axis_to_world(row, self.rows, self.scale)
    }

    fn z(&self, col: usize) -> f32 {
        Self::axis_to_world(col, self.cols, self.scale)
    }

    fn row(&self, x: f32) -> usize {
        Self::world_to_axis(x, self.rows, self.scale)
    }

    fn col(&self, z: f32) -> usize {
        Self::world_to_axis(z, self.cols, self.scale)
    }
}

/// Texture coordinate for a grid index, wrapped to `[0, 1)`
pub fn wrap_uv(index: usize, density: u32) -> f32 {
    let d = density.max(1) as usize;
    (index % d) as f32 / d as f32
}

/// Build a terrain mesh.
///
/// World X comes from the row index and world Z from the column index, both
/// mapped to `[-world_scale, world_scale]`. Y is `sample * height_scale`.
/// Grids smaller than 3 in either dimension produce an empty mesh.
pub fn build(
    field: &HeightField,
    height_scale: f32,
    texture_density: u32,
    world_scale: f32,
) -> TerrainMesh {
    let quads = TerrainMesh::expected_quads(field.rows, field.cols);
    let mut mesh = TerrainMesh {
        vertices: Vec::with_capacity(quads * 4),
        indices: Vec::with_capacity(quads * QUAD_INDICES.len()),
    };
    if quads == 0 {
        return mesh;
    }

    let mapping = GridMapping {
        rows: field.rows,
        cols: field.cols,
        scale: world_scale,
    };

    let vertex = |row: usize, col: usize| TerrainVertex {
        position: [
            mapping.x(row),
            field.get(row, col) * height_scale,
            mapping.z(col),
        ],
        uv: [wrap_uv(row, texture_density), wrap_uv(col, texture_density)],
    };

    let mut r = 1;
    while r + 2 < field.rows {
        let mut c = 1;
        while c + 2 < field.cols {
            let base = mesh.vertices.len() as u32;
            mesh.vertices.push(vertex(r, c));
            mesh.vertices.push(vertex(r + 2, c));
            mesh.vertices.push(vertex(r, c + 2));
            mesh.vertices.push(vertex(r + 2, c + 2));
            mesh.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
            c += 2;
        }
        r += 2;
    }

    mesh
}

/// A built terrain that keeps its samples for height queries
pub struct Terrain {
    pub mesh: TerrainMesh,
    field: HeightField,
    mapping: GridMapping,
    height_scale: f32,
}

impl Terrain {
    pub fn new(
        field: HeightField,
        height_scale: f32,
        texture_density: u32,
        world_scale: f32,
    ) -> Self {
        let mesh = build(&field, height_scale, texture_density, world_scale);
        log::info!(
            "Terrain built: {}x{} samples, {} quads",
            field.rows,
            field.cols,
            mesh.quad_count()
        );
        let mapping = GridMapping {
            rows: field.rows,
            cols: field.cols,
            scale: world_scale,
        };
        Self {
            mesh,
            field,
            mapping,
            height_scale,
        }
    }

    /// Terrain height at a world position using the nearest sample.
    /// Positions outside the terrain clamp to the border.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        if self.field.is_empty() {
            return 0.0;
        }
        let row = self.mapping.row(world_x);
        let col = self.mapping.col(world_z);
        self.field.get(row, col) * self.height_scale
    }
}
