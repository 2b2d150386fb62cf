use wgpu::util::DeviceExt;

/// Segments of the tile plane. The vertex ripple needs a dense grid.
pub const TILE_SEGMENTS: (u32, u32) = (100, 50);
pub const LABEL_SEGMENTS: (u32, u32) = (1, 1);

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    /// `v` grows downwards, so `(0, 0)` is the top-left texel.
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Unit plane centred on the origin in the XY plane, split into a grid of quads.
pub fn plane_geometry(width_segments: u32, height_segments: u32) -> (Vec<Vertex>, Vec<u32>) {
    let columns = width_segments.max(1);
    let rows = height_segments.max(1);

    let mut vertices = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
    for row in 0..=rows {
        let v = row as f32 / rows as f32;
        for column in 0..=columns {
            let u = column as f32 / columns as f32;
            vertices.push(Vertex {
                position: [u - 0.5, 0.5 - v, 0.0],
                uv: [u, v],
            });
        }
    }

    let stride = columns + 1;
    let mut indices = Vec::with_capacity((columns * rows * 6) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let top_left = row * stride + column;
            let top_right = top_left + 1;
            let bottom_left = top_left + stride;
            let bottom_right = bottom_left + 1;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }

    (vertices, indices)
}

/// A plane uploaded to the GPU.
pub(crate) struct PlaneMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl PlaneMesh {
    pub(crate) fn new(device: &wgpu::Device, label: &str, segments: (u32, u32)) -> Self {
        let (vertices, indices) = plane_geometry(segments.0, segments.1);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_grid_has_expected_counts() {
        let (vertices, indices) = plane_geometry(TILE_SEGMENTS.0, TILE_SEGMENTS.1);
        assert_eq!(vertices.len(), 101 * 51);
        assert_eq!(indices.len(), 100 * 50 * 6);
        assert!(indices.iter().all(|&index| (index as usize) < vertices.len()));
    }

    #[test]
    fn corners_map_to_texture_corners() {
        let (vertices, _) = plane_geometry(1, 1);
        assert_eq!(vertices[0].position, [-0.5, 0.5, 0.0]);
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
        assert_eq!(vertices[3].position, [0.5, -0.5, 0.0]);
        assert_eq!(vertices[3].uv, [1.0, 1.0]);
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        let (vertices, indices) = plane_geometry(1, 1);
        let [a, b, c] = [indices[0], indices[1], indices[2]].map(|i| vertices[i as usize].position);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(cross > 0.0);
    }
}
