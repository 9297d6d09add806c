//! Mesh representation for 3D models
//!
//! Meshes are shared, immutable geometry referenced by source nodes and render
//! proxies through `Arc<Mesh>`. Proxies never copy vertex data; they only hold
//! another reference to the same mesh.
//!
//! A mesh may be split into submeshes (contiguous index ranges). Submesh `i` is
//! shaded with material slot `i` of the drawable that references the mesh.

use crate::scene::Bounds;
use crate::foundation::math::Vec3;

/// 3D vertex with position, normal, and texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Position as a vector
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Normal as a vector
    pub fn normal_vec(&self) -> Vec3 {
        Vec3::from(self.normal)
    }
}

/// Contiguous range of the index buffer drawn with one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    /// First index of the range
    pub index_start: usize,
    /// Number of indices in the range (a multiple of three)
    pub index_count: usize,
}

/// 3D mesh containing vertices and indices for rendering
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,

    /// Submesh ranges; a single range covering every index when empty
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    /// Create a new single-submesh mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            submeshes: Vec::new(),
        }
    }

    /// Builder pattern: split the index buffer into submeshes
    pub fn with_submeshes(mut self, submeshes: Vec<SubMesh>) -> Self {
        self.submeshes = submeshes;
        self
    }

    /// Submesh ranges, with the implicit whole-mesh range when none are set
    pub fn submesh_ranges(&self) -> Vec<SubMesh> {
        if self.submeshes.is_empty() {
            vec![SubMesh { index_start: 0, index_count: self.indices.len() }]
        } else {
            self.submeshes.clone()
        }
    }

    /// Bounds of the vertex positions in mesh space, `None` for an empty mesh
    pub fn local_bounds(&self) -> Option<Bounds> {
        let points: Vec<Vec3> = self.vertices.iter().map(Vertex::position_vec).collect();
        Bounds::from_points(&points)
    }

    /// Axis-aligned box centered at the origin with per-face normals
    ///
    /// 24 vertices (4 per face so every face gets a flat normal) and 36 indices.
    /// Faces wind counter-clockwise when seen from outside.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let (x, y, z) = (half_extents.x, half_extents.y, half_extents.z);

        // (normal, four corners counter-clockwise seen from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]]),
            ([0.0, 0.0, -1.0], [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]]),
            ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]]),
            ([1.0, 0.0, 0.0], [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]]),
            ([0.0, 1.0, 0.0], [[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]]),
            ([0.0, -1.0, 0.0], [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]]),
        ];
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            for (corner, uv) in corners.iter().zip(uvs) {
                vertices.push(Vertex::new(*corner, normal, uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::new(vertices, indices)
    }

    /// Unit cube spanning ±1.0 on every axis
    pub fn cube() -> Self {
        Self::cuboid(Vec3::new(1.0, 1.0, 1.0))
    }

}
