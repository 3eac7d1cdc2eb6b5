//! Regular-grid triangulation of height fields.

use glam::{Vec2, Vec3};
use strata_dispatch::{ComputeBackend, DispatchScope};
use strata_field::{FieldTile, Rank};

use crate::{HeightCurve, MeshBuffers, MeshError, TerrainVertex};

/// Marks the index slots of vertices on the last row or column.
const SKIP: u32 = u32::MAX;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct HeightmapUniform {
    dimensions: u32,
    height_scale: f32,
    _pad: [u32; 2],
}

/// Turns an `n × n` height field into `n²` vertices and `(n - 1)² · 2`
/// triangles.
///
/// Vertex `(x, y)` sits at `(x, curve(h) * height_scale, y)` with UV
/// `(x / n, y / n)`. Each grid cell is split into triangles
/// `(v, v + n, v + 1)` and `(v + 1, v + n, v + n + 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapMesher {
    pub height_scale: f32,
    pub curve: HeightCurve,
}

impl Default for HeightmapMesher {
    fn default() -> Self {
        Self {
            height_scale: 50.0,
            curve: HeightCurve::identity(),
        }
    }
}

impl HeightmapMesher {
    pub fn new(height_scale: f32, curve: HeightCurve) -> Self {
        Self { height_scale, curve }
    }

    pub fn build<B>(&self, backend: &B, tile: &FieldTile) -> Result<MeshBuffers, MeshError>
    where
        B: ComputeBackend + ?Sized,
    {
        if tile.rank() != Rank::Two {
            return Err(MeshError::RankMismatch {
                expected: Rank::Two,
                actual: tile.rank(),
            });
        }
        let n = tile.dimensions();
        let vertex_count = n * n;

        let mut scope = DispatchScope::new(backend, "heightmap_mesh");
        scope.prepare_buffer("field", tile.cells())?;
        scope.prepare_constant(
            "heightmap",
            &HeightmapUniform {
                dimensions: n as u32,
                height_scale: self.height_scale,
                _pad: [0; 2],
            },
        )?;
        scope.prepare_output::<TerrainVertex>("vertices", vertex_count)?;
        scope.prepare_output::<u32>("indices", vertex_count * 6)?;

        let field: Vec<f32> = scope.input("field")?;
        let uniform: HeightmapUniform = scope.constant("heightmap")?;
        let n = uniform.dimensions as usize;

        scope.dispatch("vertices", vertex_count, 1, |v, out: &mut [TerrainVertex]| {
            let (x, y) = ((v % n) as f32, (v / n) as f32);
            let height = self.curve.evaluate(field[v]) * uniform.height_scale;
            out[0] = TerrainVertex {
                position: [x, height, y],
                uv: [x / n as f32, y / n as f32],
            };
        })?;
        scope.dispatch("indices", vertex_count, 6, |v, out: &mut [u32]| {
            if v % n == n - 1 || v / n == n - 1 {
                out.fill(SKIP);
                return;
            }
            let (v, n) = (v as u32, n as u32);
            out.copy_from_slice(&[v, v + n, v + 1, v + 1, v + n, v + n + 1]);
        })?;

        let vertices: Vec<TerrainVertex> = scope.read_output("vertices")?;
        let slots: Vec<u32> = scope.read_output("indices")?;
        scope.finish()?;

        let mut mesh = MeshBuffers::with_capacity(vertex_count, (n - 1) * (n - 1) * 6);
        for vertex in &vertices {
            mesh.push_vertex(Vec3::from_array(vertex.position), Vec2::from_array(vertex.uv));
        }
        mesh.indices.extend(
            slots
                .chunks_exact(6)
                .filter(|slot| slot[0] != SKIP)
                .flatten(),
        );
        log::debug!(
            "Triangulated {n}x{n} height field: {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}
