//! Texture uploads: material images, the skybox cubemap and render targets

use tidewater_geometry::RgbaImage;
use wgpu::util::DeviceExt;

use crate::backend::{TargetDesc, TargetKind};
use crate::context::RenderError;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A sampled texture. The view keeps the texture alive.
pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Upload a decoded image. Normal, height and distortion maps should pass
/// `srgb = false`.
pub fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &RgbaImage,
    srgb: bool,
) -> Result<GpuTexture, RenderError> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
        return Err(RenderError::TextureUpload(
            label.to_string(),
            format!(
                "{}x{} image with {} bytes",
                image.width,
                image.height,
                image.pixels.len()
            ),
        ));
    }

    let format = if srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{} Sampler", label)),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        ..Default::default()
    });

    Ok(GpuTexture {
        view,
        sampler,
    })
}

/// 1x1 texture of a single color
pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, color: [u8; 4]) -> GpuTexture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &color,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{} Sampler", label)),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    GpuTexture {
        view,
        sampler,
    }
}

/// Six equally sized faces in +X, -X, +Y, -Y, +Z, -Z order
pub fn upload_cubemap(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    faces: &[RgbaImage; 6],
) -> Result<GpuTexture, RenderError> {
    let (width, height) = (faces[0].width, faces[0].height);
    if width == 0 || width != height {
        return Err(RenderError::TextureUpload(
            "Skybox".into(),
            format!("faces must be square, got {}x{}", width, height),
        ));
    }
    let mut data = Vec::with_capacity(width as usize * height as usize * 4 * 6);
    for (i, face) in faces.iter().enumerate() {
        if face.width != width || face.height != height {
            return Err(RenderError::TextureUpload(
                "Skybox".into(),
                format!(
                    "face {} is {}x{}, expected {}x{}",
                    i, face.width, face.height, width, height
                ),
            ));
        }
        data.extend_from_slice(&face.pixels);
    }

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("Skybox Cubemap"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &data,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Skybox Cubemap View"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Skybox Sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        ..Default::default()
    });

    Ok(GpuTexture {
        view,
        sampler,
    })
}

/// An off-screen render target
pub struct GpuTarget {
    pub desc: TargetDesc,
    /// Sampled colour attachment, absent for depth-only targets
    pub color: Option<(wgpu::Texture, wgpu::TextureView)>,
    pub depth: (wgpu::Texture, wgpu::TextureView),
}

impl GpuTarget {
    /// Allocate textures for `desc`. Colour attachments use `color_format`
    /// so the scene pipelines can render into them unchanged.
    pub fn new(
        device: &wgpu::Device,
        desc: &TargetDesc,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        let limit = device.limits().max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > limit || desc.height > limit {
            return Err(RenderError::TargetCreation {
                label: desc.label.clone(),
                reason: format!(
                    "size {}x{} outside 1..={}",
                    desc.width, desc.height, limit
                ),
            });
        }

        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        let color = match desc.kind {
            TargetKind::ColorWithDepth => {
                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(&format!("{} Color", desc.label)),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: color_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                Some((texture, view))
            }
            TargetKind::DepthOnly => None,
        };

        let depth = depth_attachment(
            device,
            &format!("{} Depth", desc.label),
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );

        Ok(Self {
            desc: desc.clone(),
            color,
            depth,
        })
    }

    pub fn color_view(&self) -> Option<&wgpu::TextureView> {
        self.color.as_ref().map(|(_, view)| view)
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.1
    }

    pub fn destroy(self) {
        if let Some((texture, _)) = self.color {
            texture.destroy();
        }
        self.depth.0.destroy();
    }
}

/// `Depth32Float` texture and its default view
pub fn depth_attachment(
    device: &wgpu::Device,
    label: &str,
    size: wgpu::Extent3d,
    usage: wgpu::TextureUsages,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// 1x1 depth texture bound in place of unused shadow cascades
pub fn placeholder_depth(device: &wgpu::Device) -> (wgpu::Texture, wgpu::TextureView) {
    depth_attachment(
        device,
        "Placeholder Shadow Map",
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        wgpu::TextureUsages::TEXTURE_BINDING,
    )
}

/// Comparison sampler for shadow lookups
pub fn shadow_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Shadow Comparison Sampler"),
        compare: Some(wgpu::CompareFunction::LessEqual),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        ..Default::default()
    })
}

/// Clamped linear sampler for the planar reflection and refraction targets
pub fn target_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Render Target Sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        ..Default::default()
    })
}
