use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two counter-clockwise triangles covering clip space. Tex coordinate
/// `(0, 0)` sits on the top-left corner, matching image row order.
#[rustfmt::skip]
pub const FULL_SCREEN_QUAD: &[Vertex; 6] = &[
    Vertex { position: [-1.0,  1.0], tex_coord: [0.0, 0.0] },
    Vertex { position: [-1.0, -1.0], tex_coord: [0.0, 1.0] },
    Vertex { position: [ 1.0, -1.0], tex_coord: [1.0, 1.0] },
    Vertex { position: [-1.0,  1.0], tex_coord: [0.0, 0.0] },
    Vertex { position: [ 1.0, -1.0], tex_coord: [1.0, 1.0] },
    Vertex { position: [ 1.0,  1.0], tex_coord: [1.0, 0.0] },
];

pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl VertexBuffer {
    pub fn init_immediate<'label>(
        device: &wgpu::Device,
        vertices: &[Vertex],
        label: Option<&'label str>,
    ) -> Self {
        let init_descriptor = wgpu::util::BufferInitDescriptor {
            label,
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        };
        let buffer = device.create_buffer_init(&init_descriptor);
        Self {
            buffer,
            count: vertices.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

pub struct UniformBuffer<T> {
    buffer: wgpu::Buffer,
    _marker: std::marker::PhantomData<T>,
}

impl<T: bytemuck::Pod> UniformBuffer<T> {
    pub fn init_immediate<'label>(
        device: &wgpu::Device,
        content: &T,
        label: Option<&'label str>,
    ) -> Self {
        let init_descriptor = wgpu::util::BufferInitDescriptor {
            label,
            contents: bytemuck::bytes_of(content),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        };
        let buffer = device.create_buffer_init(&init_descriptor);
        Self {
            buffer,
            _marker: std::marker::PhantomData,
        }
    }

    /// Queue a write; it lands before the next submitted frame.
    pub fn write(&self, queue: &wgpu::Queue, content: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(content));
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        for corner in [[-1.0, -1.0], [-1.0, 1.0], [1.0, -1.0], [1.0, 1.0]] {
            assert!(FULL_SCREEN_QUAD.iter().any(|v| v.position == corner));
        }
    }

    #[test]
    fn quad_tex_coords_follow_positions() {
        for vertex in FULL_SCREEN_QUAD {
            let [x, y] = vertex.position;
            assert_eq!(vertex.tex_coord, [x * 0.5 + 0.5, 0.5 - y * 0.5]);
        }
    }

    #[test]
    fn quad_triangles_are_counter_clockwise() {
        for triangle in FULL_SCREEN_QUAD.chunks(3) {
            let [a, b, c] = [triangle[0].position, triangle[1].position, triangle[2].position];
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0);
        }
    }

    #[test]
    fn vertex_layout_stride() {
        assert_eq!(Vertex::layout().array_stride, 16);
        assert_eq!(Vertex::layout().attributes.len(), 2);
    }
}
