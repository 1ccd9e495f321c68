//! glTF/GLB static model import

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use tidewater_core::{Result, TidewaterError};

/// A lit, textured model vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Load and decode an image file, converting to RGBA8
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            TidewaterError::AssetError(format!(
                "Failed to open image '{}': {}",
                path.display(),
                e
            ))
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// One primitive of an imported model with its base color texture
#[derive(Debug, Clone)]
pub struct ModelPart {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
    pub base_color_texture: Option<RgbaImage>,
}

/// An imported static model
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub parts: Vec<ModelPart>,
}

/// Import a glTF or GLB file. Primitives without positions are skipped;
/// missing normals default to +Y and missing UVs to zero.
pub fn import_gltf<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    let (document, buffers, images) = gltf::import(path).map_err(|e| {
        TidewaterError::ImportError(format!(
            "Failed to import glTF '{}': {}",
            path.display(),
            e
        ))
    })?;

    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let mut parts = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(iter) => iter.collect(),
                None => continue,
            };
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| iter.collect())
                .unwrap_or_default();
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().collect())
                .unwrap_or_default();
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, p)| ModelVertex {
                    position: *p,
                    normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();

            let pbr = primitive.material().pbr_metallic_roughness();
            let base_color_texture = pbr
                .base_color_texture()
                .and_then(|info| images.get(info.texture().source().index()))
                .and_then(convert_image);

            parts.push(ModelPart {
                vertices,
                indices,
                base_color: pbr.base_color_factor(),
                base_color_texture,
            });
        }
    }

    if parts.is_empty() {
        return Err(TidewaterError::ImportError(format!(
            "'{}' contains no drawable primitives",
            path.display()
        )));
    }

    log::info!("Imported model '{}' ({} parts)", name, parts.len());
    Ok(Model { name, parts })
}

/// Convert glTF image data to RGBA8. 16-bit and float formats are not supported.
fn convert_image(data: &gltf::image::Data) -> Option<RgbaImage> {
    let pixels = match data.format {
        gltf::image::Format::R8G8B8A8 => data.pixels.clone(),
        gltf::image::Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect(),
        gltf::image::Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[1], 0, 255])
            .collect(),
        gltf::image::Format::R8 => data.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            log::warn!("Unsupported glTF texture format {:?}, using base color", other);
            return None;
        }
    };
    Some(RgbaImage {
        width: data.width,
        height: data.height,
        pixels,
    })
}
