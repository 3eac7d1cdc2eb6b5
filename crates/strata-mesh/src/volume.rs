//! Marching cubes isosurface extraction for density volumes.

use bytemuck::Zeroable;
use glam::{Vec2, Vec3};
use strata_dispatch::{ComputeBackend, DispatchScope};
use strata_field::{FieldTile, Rank};

use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::{MeshBuffers, MeshError, TerrainVertex};

/// Most vertices one cube can emit (five triangles).
pub const MAX_CUBE_VERTICES: usize = 15;

/// Per-cube kernel output: up to five unwelded triangles.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeSlot {
    pub count: u32,
    pub vertices: [TerrainVertex; MAX_CUBE_VERTICES],
}

static_assertions::assert_eq_size!(CubeSlot, [u8; 4 + 20 * MAX_CUBE_VERTICES]);

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct VolumeUniform {
    dimensions: u32,
    edge: u32,
    cubes_per_axis: u32,
    threshold: f32,
}

/// Smallest level of detail `>= requested` that divides `dimensions - 1`.
///
/// Requests above `dimensions - 1` fall back to `dimensions - 1`, one cube
/// per cell.
pub fn fit_level_of_detail(dimensions: usize, requested: usize) -> usize {
    let span = dimensions.saturating_sub(1).max(1);
    (requested.max(1)..=span)
        .find(|lod| span % lod == 0)
        .unwrap_or(span)
}

/// Extracts the surface where a density volume crosses `threshold`.
///
/// The volume is split into `level_of_detail³` cubes of
/// `(n - 1) / level_of_detail` cells per side. Corners below the threshold
/// count as inside. Vertices are not shared between triangles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeMesher {
    pub threshold: f32,
    pub level_of_detail: usize,
}

impl Default for VolumeMesher {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            level_of_detail: 5,
        }
    }
}

impl VolumeMesher {
    pub fn new(threshold: f32, level_of_detail: usize) -> Self {
        Self {
            threshold,
            level_of_detail,
        }
    }

    pub fn build<B>(&self, backend: &B, tile: &FieldTile) -> Result<MeshBuffers, MeshError>
    where
        B: ComputeBackend + ?Sized,
    {
        if tile.rank() != Rank::Three {
            return Err(MeshError::RankMismatch {
                expected: Rank::Three,
                actual: tile.rank(),
            });
        }
        let n = tile.dimensions();
        let lod = self.level_of_detail;
        if n < 2 || lod == 0 || (n - 1) % lod != 0 {
            return Err(MeshError::Configuration(format!(
                "level of detail {lod} does not divide {} (try {})",
                n.saturating_sub(1),
                fit_level_of_detail(n, lod)
            )));
        }
        let cube_count = lod * lod * lod;

        let mut scope = DispatchScope::new(backend, "marching_cubes");
        scope.prepare_buffer("density", tile.cells())?;
        scope.prepare_constant(
            "volume",
            &VolumeUniform {
                dimensions: n as u32,
                edge: ((n - 1) / lod) as u32,
                cubes_per_axis: lod as u32,
                threshold: self.threshold,
            },
        )?;
        scope.prepare_output::<CubeSlot>("cubes", cube_count)?;

        let density: Vec<f32> = scope.input("density")?;
        let uniform: VolumeUniform = scope.constant("volume")?;
        scope.dispatch("cubes", cube_count, 1, |cube, out: &mut [CubeSlot]| {
            out[0] = march_cube(&uniform, &density, cube);
        })?;
        let slots: Vec<CubeSlot> = scope.read_output("cubes")?;
        scope.finish()?;

        let emitted: usize = slots.iter().map(|slot| slot.count as usize).sum();
        let mut mesh = MeshBuffers::with_capacity(emitted, emitted);
        for slot in &slots {
            for vertex in &slot.vertices[..slot.count as usize] {
                let index = mesh.push_vertex(Vec3::from_array(vertex.position), Vec2::from_array(vertex.uv));
                mesh.indices.push(index);
            }
        }
        log::debug!(
            "Marched {cube_count} cubes over {n}^3 volume: {} triangles",
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

fn march_cube(uniform: &VolumeUniform, density: &[f32], cube: usize) -> CubeSlot {
    let n = uniform.dimensions as usize;
    let per_axis = uniform.cubes_per_axis as usize;
    let edge = uniform.edge as usize;
    let base = [
        cube % per_axis * edge,
        cube / per_axis % per_axis * edge,
        cube / (per_axis * per_axis) * edge,
    ];

    let mut corners = [(Vec3::ZERO, 0.0f32); 8];
    let mut cube_index = 0usize;
    for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
        let [x, y, z] = [0, 1, 2].map(|axis| base[axis] + offset[axis] as usize * edge);
        let value = density[x + y * n + z * n * n];
        corners[i] = (Vec3::new(x as f32, y as f32, z as f32), value);
        if value < uniform.threshold {
            cube_index |= 1 << i;
        }
    }

    let mut slot = CubeSlot::zeroed();
    let crossed = EDGE_TABLE[cube_index];
    if crossed == 0 {
        return slot;
    }

    let mut edge_points = [Vec3::ZERO; 12];
    for (e, [a, b]) in EDGE_CORNERS.iter().enumerate() {
        if crossed & (1 << e) != 0 {
            let (pa, va) = corners[*a];
            let (pb, vb) = corners[*b];
            let t = (uniform.threshold - va) / (vb - va);
            edge_points[e] = pa + t * (pb - pa);
        }
    }

    for &e in TRI_TABLE[cube_index].iter().take_while(|&&e| e >= 0) {
        let position = edge_points[e as usize];
        slot.vertices[slot.count as usize] = TerrainVertex::new(position, cubic_uv(position));
        slot.count += 1;
    }
    slot
}

/// Project onto the plane of the two smaller axes.
fn cubic_uv(p: Vec3) -> Vec2 {
    let a = p.abs();
    if a.x >= a.y && a.x >= a.z {
        Vec2::new(p.y, p.z)
    } else if a.y >= a.z {
        Vec2::new(p.x, p.z)
    } else {
        Vec2::new(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use strata_dispatch::HostBackend;

    use super::*;

    fn volume(n: usize, f: impl Fn(usize, usize, usize) -> f32) -> FieldTile {
        let mut cells = Vec::with_capacity(n * n * n);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    cells.push(f(x, y, z));
                }
            }
        }
        FieldTile::from_cells(n, Rank::Three, cells).unwrap()
    }

    #[test]
    fn test_uniform_volume_has_no_triangles() {
        let backend = HostBackend::new(2);
        for value in [0.0, 1.0] {
            let mesh = VolumeMesher::new(0.5, 2)
                .build(&backend, &volume(5, |_, _, _| value))
                .unwrap();
            assert!(mesh.is_empty(), "uniform {value} volume produced triangles");
        }
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_single_corner_below_threshold() {
        let backend = HostBackend::new(1);
        let tile = volume(2, |x, y, z| if x + y + z == 0 { 0.0 } else { 1.0 });
        let mesh = VolumeMesher::new(0.5, 1).build(&backend, &tile).unwrap();

        let expected = TRI_TABLE[1].iter().take_while(|&&e| e >= 0).count() / 3;
        assert_eq!(mesh.triangle_count(), expected);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices.len(), 3, "vertices are not welded");
        for v in &mesh.vertices {
            let halves = v.to_array().iter().filter(|&&c| c == 0.5).count();
            assert_eq!(halves, 1, "vertex {v} should sit midway along one edge");
        }
    }

    #[test]
    fn test_sphere_surface_is_valid() {
        let backend = HostBackend::new(4);
        let n = 9;
        let c = (n - 1) as f32 / 2.0;
        let tile = volume(n, |x, y, z| {
            let d = Vec3::new(x as f32 - c, y as f32 - c, z as f32 - c).length();
            (d / c).min(1.0)
        });
        let mesh = VolumeMesher::new(0.5, 8).build(&backend, &tile).unwrap();
        assert!(mesh.triangle_count() > 0);
        assert_eq!(mesh.validate(), Ok(()));
        for v in &mesh.vertices {
            let d = (*v - Vec3::splat(c)).length();
            assert!(d > 0.9 && d < 3.1, "vertex {v} far from the radius-2 shell");
        }
    }

    #[test]
    fn test_level_of_detail_sets_cube_size() {
        let backend = HostBackend::new(2);
        let n = 9;
        let tile = volume(n, |x, _, _| x as f32 / (n - 1) as f32);
        // One plane at x = 4, crossed by lod² cubes each emitting two triangles.
        for lod in [1, 2, 4, 8] {
            let mesh = VolumeMesher::new(0.45, lod).build(&backend, &tile).unwrap();
            assert_eq!(mesh.triangle_count(), lod * lod * 2, "lod {lod}");
        }
    }

    #[test]
    fn test_non_dividing_level_of_detail_is_rejected() {
        let backend = HostBackend::new(1);
        let tile = volume(9, |_, _, _| 0.0);
        assert!(matches!(
            VolumeMesher::new(0.5, 3).build(&backend, &tile),
            Err(MeshError::Configuration(_))
        ));
        assert!(matches!(
            VolumeMesher::new(0.5, 0).build(&backend, &tile),
            Err(MeshError::Configuration(_))
        ));
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_rejects_height_field() {
        let backend = HostBackend::new(1);
        let tile = FieldTile::from_cells(3, Rank::Two, vec![0.0; 9]).unwrap();
        assert!(matches!(
            VolumeMesher::default().build(&backend, &tile),
            Err(MeshError::RankMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_level_of_detail() {
        assert_eq!(fit_level_of_detail(241, 5), 5);
        assert_eq!(fit_level_of_detail(241, 7), 8);
        assert_eq!(fit_level_of_detail(10, 2), 3);
        assert_eq!(fit_level_of_detail(10, 40), 9);
        assert_eq!(fit_level_of_detail(9, 0), 1);
    }

    #[test]
    fn test_cubic_uv_drops_largest_axis() {
        assert_eq!(cubic_uv(Vec3::new(5.0, 1.0, 2.0)), Vec2::new(1.0, 2.0));
        assert_eq!(cubic_uv(Vec3::new(1.0, 5.0, 2.0)), Vec2::new(1.0, 2.0));
        assert_eq!(cubic_uv(Vec3::new(1.0, 2.0, 5.0)), Vec2::new(1.0, 2.0));
    }
}
