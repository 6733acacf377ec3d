//! Indexed triangle geometry with GPU-resident buffers.
//!
//! The only mesh this renderer draws is the full-screen quad the composite
//! pass rasterizes, so vertices carry positions only. Meshes are immutable
//! after construction.

use crate::gpu::GpuContext;

/// A position-only vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    pub const fn new(position: [f32; 3]) -> Self {
        Self { position }
    }
}

/// Corners of the full-screen quad in normalized device coordinates.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex::new([-1.0, -1.0, 0.0]),
    Vertex::new([-1.0, 1.0, 0.0]),
    Vertex::new([1.0, 1.0, 0.0]),
    Vertex::new([1.0, -1.0, 0.0]),
];

/// Two counter-clockwise triangles covering the quad.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// GPU-resident geometry with vertex and index buffers.
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    /// Uploads vertex and index data to GPU buffers.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// The full-screen quad used by the composite pass.
    pub fn quad(gpu: &GpuContext) -> Self {
        Self::new(gpu, &QUAD_VERTICES, &QUAD_INDICES)
    }

    /// Issues one indexed triangle-list draw.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        for v in QUAD_VERTICES {
            assert_eq!(v.position[0].abs(), 1.0);
            assert_eq!(v.position[1].abs(), 1.0);
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn quad_indices_reference_all_corners() {
        assert_eq!(QUAD_INDICES.len(), 6);
        for corner in 0..4u32 {
            assert!(QUAD_INDICES.contains(&corner));
        }
    }
}
