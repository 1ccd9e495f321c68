//! GPU-resident meshes and their vertex layouts

use tidewater_geometry::{ModelVertex, PositionVertex, TangentVertex, TerrainVertex, TexturedVertex};
use wgpu::util::DeviceExt;

/// Vertex layout of an uploaded mesh; decides which pipelines can draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    Terrain,
    Model,
    Water,
    Wall,
    Position,
}

/// `desc()` for each geometry vertex type
pub trait VertexLayout: bytemuck::Pod {
    const KIND: VertexKind;

    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

macro_rules! vertex_layout {
    ($ty:ty, $kind:expr, [$($loc:expr => $fmt:ident),* $(,)?]) => {
        impl VertexLayout for $ty {
            const KIND: VertexKind = $kind;

            fn desc() -> wgpu::VertexBufferLayout<'static> {
                const ATTRIBS: &[wgpu::VertexAttribute] =
                    &wgpu::vertex_attr_array![$($loc => $fmt),*];
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<$ty>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: ATTRIBS,
                }
            }
        }
    };
}

vertex_layout!(TerrainVertex, VertexKind::Terrain, [
    0 => Float32x3, // position
    1 => Float32x2, // uv
]);

vertex_layout!(ModelVertex, VertexKind::Model, [
    0 => Float32x3, // position
    1 => Float32x3, // normal
    2 => Float32x2, // uv
]);

vertex_layout!(TexturedVertex, VertexKind::Water, [
    0 => Float32x3, // position
    1 => Float32x2, // uv
]);

vertex_layout!(TangentVertex, VertexKind::Wall, [
    0 => Float32x3, // position
    1 => Float32x3, // normal
    2 => Float32x2, // uv
    3 => Float32x3, // tangent
    4 => Float32x3, // bitangent
]);

vertex_layout!(PositionVertex, VertexKind::Position, [
    0 => Float32x3, // position
]);

/// Layout that reads only the position of a vertex, for depth-only passes
pub fn position_only_desc(array_stride: wgpu::BufferAddress) -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBS: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![0 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: ATTRIBS,
    }
}

/// A mesh uploaded to the GPU with its material bindings
pub struct GpuMesh {
    pub label: String,
    pub kind: VertexKind,
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub index_buffer: Option<wgpu::Buffer>,
    pub index_count: u32,
    /// Texture bind group built at upload time
    pub material: Option<wgpu::BindGroup>,
    pub base_color: [f32; 4],
    pub has_texture: bool,
}

impl GpuMesh {
    pub fn new<V: VertexLayout>(
        device: &wgpu::Device,
        label: &str,
        vertices: &[V],
        indices: Option<&[u32]>,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = indices.map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", label)),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Self {
            label: label.to_string(),
            kind: V::KIND,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            index_buffer,
            index_count: indices.map_or(0, |i| i.len() as u32),
            material: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            has_texture: false,
        }
    }

    pub fn with_material(mut self, material: wgpu::BindGroup) -> Self {
        self.material = Some(material);
        self
    }

    pub fn vertex_stride(&self) -> wgpu::BufferAddress {
        match self.kind {
            VertexKind::Terrain => TerrainVertex::desc().array_stride,
            VertexKind::Model => ModelVertex::desc().array_stride,
            VertexKind::Water => TexturedVertex::desc().array_stride,
            VertexKind::Wall => TangentVertex::desc().array_stride,
            VertexKind::Position => PositionVertex::desc().array_stride,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_vertex_sizes() {
        assert_eq!(TerrainVertex::desc().array_stride, 20);
        assert_eq!(ModelVertex::desc().array_stride, 32);
        assert_eq!(TexturedVertex::desc().array_stride, 20);
        assert_eq!(TangentVertex::desc().array_stride, 56);
        assert_eq!(PositionVertex::desc().array_stride, 12);
    }

    #[test]
    fn attribute_offsets_are_packed() {
        let wall = TangentVertex::desc();
        let offsets: Vec<u64> = wall.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32, 44]);
        let model = ModelVertex::desc();
        assert_eq!(model.attributes.last().map(|a| a.offset), Some(24));
    }
}
