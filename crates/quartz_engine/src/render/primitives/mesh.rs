//! Mesh and vertex types with procedural generators

use bytemuck::{Pod, Zeroable};

/// Standard vertex layout shared by every pipeline stage
///
/// Matches the input layout the graphics programs expect: position,
/// normal, texture coordinate, tangent. Kept `Pod` so vertex buffers
/// upload as one byte slice.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinate, v grows downward
    pub tex_coord: [f32; 2],
    /// Object-space tangent along +u
    pub tangent: [f32; 3],
    /// Keeps the struct a multiple of 16 bytes
    pub _padding: f32,
}

impl Vertex {
    /// Create a vertex from position, normal, texture coordinate, and tangent
    #[must_use]
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2], tangent: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            tangent,
            _padding: 0.0,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a mesh from raw vertex and index data
    #[must_use]
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles in the mesh
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat plane on the xz axes, centered at the origin, facing +y
    ///
    /// `uv_repeat` tiles the texture across the plane.
    #[must_use]
    pub fn plane(width: f32, depth: f32, uv_repeat: f32) -> Self {
        let hw = width * 0.5;
        let hd = depth * 0.5;
        let normal = [0.0, 1.0, 0.0];
        let tangent = [1.0, 0.0, 0.0];

        let vertices = vec![
            Vertex::new([-hw, 0.0, -hd], normal, [0.0, 0.0], tangent),
            Vertex::new([hw, 0.0, -hd], normal, [uv_repeat, 0.0], tangent),
            Vertex::new([hw, 0.0, hd], normal, [uv_repeat, uv_repeat], tangent),
            Vertex::new([-hw, 0.0, hd], normal, [0.0, uv_repeat], tangent),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];

        Self::new(vertices, indices)
    }

    /// Axis-aligned box centered at the origin
    #[must_use]
    pub fn cube(width: f32, height: f32, depth: f32) -> Self {
        let hw = width * 0.5;
        let hh = height * 0.5;
        let hd = depth * 0.5;

        // Per face: normal, tangent, and the four corners in fan order
        let faces: [([f32; 3], [f32; 3], [[f32; 3]; 4]); 6] = [
            // +z
            (
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0],
                [[-hw, -hh, hd], [hw, -hh, hd], [hw, hh, hd], [-hw, hh, hd]],
            ),
            // -z
            (
                [0.0, 0.0, -1.0],
                [-1.0, 0.0, 0.0],
                [[hw, -hh, -hd], [-hw, -hh, -hd], [-hw, hh, -hd], [hw, hh, -hd]],
            ),
            // +x
            (
                [1.0, 0.0, 0.0],
                [0.0, 0.0, -1.0],
                [[hw, -hh, hd], [hw, -hh, -hd], [hw, hh, -hd], [hw, hh, hd]],
            ),
            // -x
            (
                [-1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [[-hw, -hh, -hd], [-hw, -hh, hd], [-hw, hh, hd], [-hw, hh, -hd]],
            ),
            // +y
            (
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [[-hw, hh, hd], [hw, hh, hd], [hw, hh, -hd], [-hw, hh, -hd]],
            ),
            // -y
            (
                [0.0, -1.0, 0.0],
                [1.0, 0.0, 0.0],
                [[-hw, -hh, -hd], [hw, -hh, -hd], [hw, -hh, hd], [-hw, -hh, hd]],
            ),
        ];

        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, tangent, corners) in &faces {
            let base = vertices.len() as u32;
            for (corner, uv) in corners.iter().zip(uvs.iter()) {
                vertices.push(Vertex::new(*corner, *normal, *uv, *tangent));
            }
            indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }

        Self::new(vertices, indices)
    }

    /// UV sphere centered at the origin
    #[must_use]
    pub fn sphere(radius: f32, slices: u32, stacks: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for stack in 0..=stacks {
            let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            for slice in 0..=slices {
                let theta = 2.0 * std::f32::consts::PI * slice as f32 / slices as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();

                let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
                let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
                let tex_coord = [
                    slice as f32 / slices as f32,
                    stack as f32 / stacks as f32,
                ];
                let tangent = [-sin_theta, 0.0, cos_theta];

                vertices.push(Vertex::new(position, normal, tex_coord, tangent));
            }
        }

        let ring = slices + 1;
        for stack in 0..stacks {
            for slice in 0..slices {
                let a = stack * ring + slice;
                let b = a + ring;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::new(vertices, indices)
    }

    /// Full-screen quad in normalized device coordinates
    ///
    /// Covers [-1, 1]² with uv (0, 0) at the top-left, for the composite
    /// pass that samples the offscreen buffer.
    #[must_use]
    pub fn screen_quad() -> Self {
        let normal = [0.0, 0.0, -1.0];
        let tangent = [1.0, 0.0, 0.0];

        let vertices = vec![
            Vertex::new([-1.0, -1.0, 0.0], normal, [0.0, 1.0], tangent),
            Vertex::new([-1.0, 1.0, 0.0], normal, [0.0, 0.0], tangent),
            Vertex::new([1.0, 1.0, 0.0], normal, [1.0, 0.0], tangent),
            Vertex::new([1.0, -1.0, 0.0], normal, [1.0, 1.0], tangent),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];

        Self::new(vertices, indices)
    }
}
