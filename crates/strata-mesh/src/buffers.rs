use glam::{Vec2, Vec3};

use crate::MeshError;

/// Interleaved vertex handed to the renderer.
///
/// Layout (20 bytes):
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..20]` uv `[f32; 2]`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 20]);

impl TerrainVertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// An indexed triangle list with one UV per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append one vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3, uv: Vec2) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.uvs.push(uv);
        index
    }

    /// Check that indices form whole triangles over existing vertices and
    /// that every vertex has a UV.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        if self.uvs.len() != self.vertices.len() {
            return Err(MeshError::UvCount {
                vertices: self.vertices.len(),
                uvs: self.uvs.len(),
            });
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }

    /// Vertices in upload layout.
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.vertices
            .iter()
            .zip(&self.uvs)
            .map(|(&position, &uv)| TerrainVertex::new(position, uv))
            .collect()
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshBuffers {
        let mut mesh = MeshBuffers::default();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Z] {
            mesh.push_vertex(p, Vec2::new(p.x, p.z));
        }
        mesh.indices.extend([0, 2, 1]);
        mesh
    }

    #[test]
    fn test_valid_triangle() {
        let mesh = triangle();
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_validate_reports_each_violation() {
        let mut mesh = triangle();
        mesh.indices.push(0);
        assert_eq!(mesh.validate(), Err(MeshError::PartialTriangle(4)));

        let mut mesh = triangle();
        mesh.indices[1] = 3;
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange { index: 3, vertex_count: 3 })
        );

        let mut mesh = triangle();
        mesh.uvs.pop();
        assert_eq!(mesh.validate(), Err(MeshError::UvCount { vertices: 3, uvs: 2 }));
    }

    #[test]
    fn test_interleaved_layout() {
        let mesh = triangle();
        let vertices = mesh.interleaved();
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].uv, [0.0, 1.0]);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&vertices).len(), 60);
        assert_eq!(mesh.index_bytes().len(), 12);
    }
}
