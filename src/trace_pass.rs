//! The scene-evaluation compute pass.
//!
//! Owns the compute pipeline that ray-marches the bounded volume against the
//! environment map, the uniform buffers feeding it, and the accumulation
//! images it writes. The fixed shader interface is:
//!
//! ```wgsl
//! struct FrameUniforms {
//!     camera_pos: vec3f,    time: f32,
//!     camera_x_axis: vec3f, sample_num: f32,
//!     camera_y_axis: vec3f, focal_length: f32,
//!     camera_z_axis: vec3f,
//! }
//! struct VolumeUniforms {
//!     corner_min: vec3f,
//!     corner_max: vec3f,
//!     center: vec3f,
//! }
//! @group(0) @binding(0) var output_image: texture_storage_2d<rgba32float, write>;
//! @group(0) @binding(1) var environment_map: texture_2d<f32>;
//! @group(0) @binding(2) var environment_sampler: sampler;
//! @group(0) @binding(3) var history: texture_2d<f32>;
//! @group(0) @binding(4) var<uniform> frame: FrameUniforms;
//! @group(0) @binding(5) var<uniform> volume: VolumeUniforms;
//! ```
//!
//! Frame uniforms are rewritten in full every frame; volume uniforms are
//! written once at setup since the box never moves.
//!
//! Storage textures cannot be read-write for rgba formats, so the single
//! accumulation image becomes a ping-pong pair: each dispatch reads the
//! previous frame's image as `history` and writes the other. A
//! `sample_num` of 1 tells the kernel to overwrite instead of blend, which
//! is how a reset "clears" the buffer without any explicit clear.

use crate::camera::Camera;
use crate::error::SetupError;
use crate::gpu::GpuContext;
use crate::shader::ShaderSource;
use crate::texture::Texture;
use crate::volume::Volume;

/// Per-axis workgroup extent of the trace kernel; must match the WGSL
/// `@workgroup_size` attribute.
pub const WORKGROUP_SIZE: (u32, u32) = (8, 4);

/// Per-frame parameters, laid out to match the WGSL uniform struct.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub camera_pos: [f32; 3],
    pub time: f32,
    pub camera_x_axis: [f32; 3],
    pub sample_num: f32,
    pub camera_y_axis: [f32; 3],
    pub focal_length: f32,
    pub camera_z_axis: [f32; 3],
    pub _pad: f32,
}

/// The bounded region the kernel evaluates; written once at setup.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VolumeUniforms {
    pub corner_min: [f32; 3],
    pub _pad0: f32,
    pub corner_max: [f32; 3],
    pub _pad1: f32,
    pub center: [f32; 3],
    pub _pad2: f32,
}

impl From<&Volume> for VolumeUniforms {
    fn from(volume: &Volume) -> Self {
        Self {
            corner_min: volume.corner_min.to_array(),
            _pad0: 0.0,
            corner_max: volume.corner_max.to_array(),
            _pad1: 0.0,
            center: volume.center().to_array(),
            _pad2: 0.0,
        }
    }
}

/// Compute pass that renders the scene into the accumulation image.
pub struct TracePass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    frame_uniforms: wgpu::Buffer,
    volume_uniforms: wgpu::Buffer,
    environment: Texture,
    accum: [Texture; 2],
    bind_groups: [wgpu::BindGroup; 2],
    /// Index of the image written by the most recent dispatch.
    ping: usize,
}

impl TracePass {
    /// Builds the pipeline and allocates the accumulation pair at the given
    /// pixel dimensions. The environment map and the volume are bound here,
    /// once; only the frame uniforms change afterwards.
    pub fn new(
        gpu: &GpuContext,
        shader: &ShaderSource,
        environment: Texture,
        volume: &Volume,
        width: u32,
        height: u32,
    ) -> Result<Self, SetupError> {
        let module = shader.compile(gpu, "Trace Shader")?;
        let device = &gpu.device;

        let frame_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Trace Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let volume_uniforms = {
            use wgpu::util::DeviceExt;
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Trace Volume Uniforms"),
                contents: bytemuck::bytes_of(&VolumeUniforms::from(volume)),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Trace Bind Group Layout"),
            entries: &[
                // Output image
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba32Float,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                // Environment map
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Previous accumulation image
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Trace Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Trace Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let accum = [
            Texture::render_target(gpu, width, height, "Accumulation A"),
            Texture::render_target(gpu, width, height, "Accumulation B"),
        ];
        let bind_groups = Self::build_bind_groups(
            gpu,
            &bind_group_layout,
            &accum,
            &environment,
            &frame_uniforms,
            &volume_uniforms,
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            frame_uniforms,
            volume_uniforms,
            environment,
            accum,
            bind_groups,
            ping: 0,
        })
    }

    fn build_bind_groups(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        accum: &[Texture; 2],
        environment: &Texture,
        frame_uniforms: &wgpu::Buffer,
        volume_uniforms: &wgpu::Buffer,
    ) -> [wgpu::BindGroup; 2] {
        let make = |write: &Texture, history: &Texture, label| {
            gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&write.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&environment.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&environment.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(&history.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: frame_uniforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: volume_uniforms.as_entire_binding(),
                    },
                ],
            })
        };

        [
            make(&accum[0], &accum[1], "Trace Bind Group A"),
            make(&accum[1], &accum[0], "Trace Bind Group B"),
        ]
    }

    /// Uploads this frame's parameters: elapsed time, the sample number, and
    /// the camera's position, basis axes, and focal length. Rewritten in
    /// full every frame.
    pub fn write_frame_uniforms(
        &self,
        gpu: &GpuContext,
        time: f32,
        sample_num: u32,
        camera: &Camera,
    ) {
        let t = camera.transform();
        let uniforms = FrameUniforms {
            camera_pos: t.position().to_array(),
            time,
            camera_x_axis: t.x_axis().to_array(),
            sample_num: sample_num as f32,
            camera_y_axis: t.y_axis().to_array(),
            focal_length: camera.focal_length(),
            camera_z_axis: t.z_axis().to_array(),
            _pad: 0.0,
        };
        gpu.queue
            .write_buffer(&self.frame_uniforms, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Records a compute pass covering every pixel of the target.
    ///
    /// The grid rounds up so dimensions that are not multiples of the
    /// workgroup size are still fully covered; the kernel bounds-checks the
    /// overhang. Flips the ping-pong pair, so after this call
    /// [`TracePass::output_view`] names the freshly written image.
    pub fn dispatch(&mut self, encoder: &mut wgpu::CommandEncoder, width: u32, height: u32) {
        self.ping = 1 - self.ping;

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Trace Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[self.ping], &[]);
        pass.dispatch_workgroups(
            width.div_ceil(WORKGROUP_SIZE.0),
            height.div_ceil(WORKGROUP_SIZE.1),
            1,
        );
    }

    /// View of the image written by the most recent dispatch.
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.accum[self.ping].view
    }

    /// Reallocates the accumulation pair for new window dimensions.
    /// The caller is responsible for resetting the sample counter.
    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        self.accum = [
            Texture::render_target(gpu, width, height, "Accumulation A"),
            Texture::render_target(gpu, width, height, "Accumulation B"),
        ];
        self.bind_groups = Self::build_bind_groups(
            gpu,
            &self.bind_group_layout,
            &self.accum,
            &self.environment,
            &self.frame_uniforms,
            &self.volume_uniforms,
        );
        self.ping = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn workgroup_grid_covers_odd_dimensions() {
        // 1920x1080 at 8x4 is exact; 1921x1081 needs one extra group each.
        assert_eq!(1920u32.div_ceil(WORKGROUP_SIZE.0), 240);
        assert_eq!(1080u32.div_ceil(WORKGROUP_SIZE.1), 270);
        assert_eq!(1921u32.div_ceil(WORKGROUP_SIZE.0), 241);
        assert_eq!(1081u32.div_ceil(WORKGROUP_SIZE.1), 271);
    }

    #[test]
    fn volume_uniforms_carry_center() {
        let volume = Volume::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 4.0, 2.0));
        let u = VolumeUniforms::from(&volume);
        assert_eq!(u.corner_min, [-2.0, 0.0, -2.0]);
        assert_eq!(u.corner_max, [2.0, 4.0, 2.0]);
        assert_eq!(u.center, [0.0, 2.0, 0.0]);
    }
}
