//! Owned GPU images: decoded LDR/HDR files and empty render targets.

use std::path::Path;

use half::f16;

use crate::error::SetupError;
use crate::gpu::GpuContext;

/// How a decoded LDR image should be interpreted.
///
/// `Color` images are stored sRGB so sampling decodes to linear light;
/// `Data` images (masks, lookup tables) are stored linear as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    Color,
    Data,
}

/// A GPU texture plus the metadata needed to re-bind it later.
#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl Texture {
    /// Decodes an image file into an 8-bit RGBA texture.
    ///
    /// `kind` selects whether sRGB decoding applies when the texture is
    /// sampled. Failure to open or decode the file is fatal and names the
    /// path.
    pub fn from_file(
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        kind: TextureKind,
    ) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| SetupError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();

        let format = match kind {
            TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Data => wgpu::TextureFormat::Rgba8Unorm,
        };

        Ok(Self::upload(
            gpu,
            &img,
            width,
            height,
            format,
            &path.to_string_lossy(),
        ))
    }

    /// Decodes a high-dynamic-range image file into a float RGBA texture.
    ///
    /// The image is flipped vertically during this load only, matching the
    /// orientation the trace kernel expects for environment maps. Pixels are
    /// stored as 16-bit floats so the texture stays filterable everywhere.
    pub fn from_hdr(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| SetupError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .flipv()
            .to_rgba32f();
        let (width, height) = img.dimensions();

        let halves: Vec<f16> = img.as_raw().iter().map(|&v| f16::from_f32(v)).collect();

        Ok(Self::upload(
            gpu,
            bytemuck::cast_slice(&halves),
            width,
            height,
            wgpu::TextureFormat::Rgba16Float,
            &path.to_string_lossy(),
        ))
    }

    /// Allocates an empty float RGBA image usable both as a sampled texture
    /// and as a write-only storage image for compute output.
    pub fn render_target(gpu: &GpuContext, width: u32, height: u32, label: &str) -> Self {
        let format = wgpu::TextureFormat::Rgba32Float;
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Self::default_sampler(gpu, label);

        Self {
            texture,
            view,
            sampler,
            width,
            height,
            format,
        }
    }

    fn upload(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
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
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Self::default_sampler(gpu, label);

        Self {
            texture,
            view,
            sampler,
            width,
            height,
            format,
        }
    }

    fn default_sampler(gpu: &GpuContext, label: &str) -> wgpu::Sampler {
        gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }
}
