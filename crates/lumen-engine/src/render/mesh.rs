use wgpu::util::DeviceExt;

use super::{RenderCtx, Vertex};

/// Vertex buffer plus optional index buffer, uploaded once.
///
/// Buffers are released when the mesh is dropped.
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    /// Uploads `vertices` for non-indexed drawing.
    pub fn new<V: Vertex>(ctx: &RenderCtx<'_>, label: &str, vertices: &[V]) -> Self {
        Self {
            vertex_buffer: vertex_buffer(ctx, label, vertices),
            index_buffer: None,
            vertex_count: vertices.len() as u32,
            index_count: 0,
        }
    }

    /// Uploads `vertices` and the triangle order in `indices`.
    pub fn indexed<V: Vertex>(
        ctx: &RenderCtx<'_>,
        label: &str,
        vertices: &[V],
        indices: &[u32],
    ) -> Self {
        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer: vertex_buffer(ctx, label, vertices),
            index_buffer: Some(index_buffer),
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of indices; zero for non-indexed meshes.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the buffers to slot 0 and issues one draw.
    ///
    /// The program must already be active on `pass`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        match &self.index_buffer {
            Some(ibo) => {
                pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
            None => pass.draw(0..self.vertex_count, 0..1),
        }
    }
}

fn vertex_buffer<V: Vertex>(ctx: &RenderCtx<'_>, label: &str, vertices: &[V]) -> wgpu::Buffer {
    ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} vbo")),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    })
}
