//! End-to-end generation from a config file to per-tile outputs.

use std::collections::HashSet;

use strata_config::{Config, MeshKind};
use strata_dispatch::{ComputeBackend, HostBackend};
use strata_noise::PermutationTable;
use strata_terrain::TileCoord;
use strata_world::{TileOutput, rebuild, rebuild_with};

fn grid_config(n: usize, extent: (u32, u32)) -> Config {
    let mut config = Config::default();
    config.tiling.tile_dimensions = n;
    config.tiling.grid_extent = extent;
    config
}

fn tile(outputs: &[TileOutput], x: i32, y: i32) -> &TileOutput {
    outputs
        .iter()
        .find(|out| out.coord == TileCoord::new(x, y))
        .expect("tile missing from grid")
}

#[test]
fn test_grid_tiles_share_seams() {
    let n = 17;
    let outputs = rebuild(&grid_config(n, (2, 2))).unwrap();
    assert_eq!(outputs.len(), 4);

    let (a, right, below) = (tile(&outputs, 0, 0), tile(&outputs, 1, 0), tile(&outputs, 0, 1));
    for k in 0..n {
        assert_eq!(a.field.get(n - 1, k), right.field.get(0, k), "vertical seam at row {k}");
        assert_eq!(a.field.get(k, n - 1), below.field.get(k, 0), "horizontal seam at column {k}");
    }
}

#[test]
fn test_grid_is_normalized_globally() {
    let outputs = rebuild(&grid_config(17, (2, 2))).unwrap();
    let min = outputs.iter().map(|o| o.field.min_value()).fold(f32::INFINITY, f32::min);
    let max = outputs.iter().map(|o| o.field.max_value()).fold(f32::NEG_INFINITY, f32::max);
    assert_eq!(min, 0.0);
    assert_eq!(max, 1.0);
    assert!(
        outputs.iter().flat_map(|o| o.field.cells()).all(|v| (0.0..=1.0).contains(v)),
        "every normalized cell lies in [0, 1]"
    );
}

#[test]
fn test_landmasses_partition_each_tile() {
    let n = 17;
    let outputs = rebuild(&grid_config(n, (2, 1))).unwrap();
    for out in &outputs {
        let mut seen = HashSet::new();
        for mass in out.landmasses.values().flatten() {
            assert!(mass.cells.contains(&mass.seed_point), "seed point lies inside its landmass");
            for cell in &mass.cells {
                assert!(seen.insert(*cell), "cell {cell:?} claimed by two landmasses");
            }
        }
        assert_eq!(seen.len(), n * n, "default categories cover [0, 1]");
    }
}

#[test]
fn test_meshes_and_colors_match_tile_size() {
    let n = 9;
    let outputs = rebuild(&grid_config(n, (1, 2))).unwrap();
    for out in &outputs {
        assert!(out.mesh.validate().is_ok());
        assert_eq!(out.mesh.vertices.len(), n * n);
        assert_eq!(out.mesh.triangle_count(), 2 * (n - 1) * (n - 1));
        assert_eq!(out.colors.dimensions, n);
        assert_eq!(out.colors.as_bytes().len(), n * n * 16);
    }
}

#[test]
fn test_rebuild_releases_every_buffer() {
    let backend = HostBackend::new(2);
    let table = PermutationTable::from_seed(3);
    let outputs = rebuild_with(&grid_config(11, (2, 2)), &backend, &table).unwrap();
    assert_eq!(outputs.len(), 4);
    assert_eq!(backend.live_buffers(), 0, "all dispatch buffers released");
}

#[test]
fn test_config_file_drives_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.ron"),
        "(noise: (seed: 5), tiling: (tile_dimensions: 11, grid_extent: (3, 1)), mesh: (kind: Volume))",
    )
    .unwrap();

    let config = Config::load_or_create(dir.path()).unwrap();
    let outputs = rebuild(&config).unwrap();
    assert_eq!(outputs.len(), 3);
    assert_eq!(
        outputs.iter().map(|o| o.coord).collect::<Vec<_>>(),
        vec![TileCoord::new(0, 0), TileCoord::new(1, 0), TileCoord::new(2, 0)]
    );
    for out in &outputs {
        assert!(out.mesh.validate().is_ok(), "volume mesh of tile {} is valid", out.coord);
    }
}

#[test]
fn test_volume_mesh_follows_three_dimensional_density() {
    // One cube per cell, and one tile so its cells span the full [0, 1].
    let mut config = grid_config(11, (1, 1));
    config.mesh.kind = MeshKind::Volume;
    config.mesh.level_of_detail = 10;
    let outputs = rebuild(&config).unwrap();

    let mut triangles = 0;
    let mut tilted = 0;
    for out in &outputs {
        assert!(out.mesh.validate().is_ok());
        for tri in out.mesh.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| out.mesh.vertices[tri[k] as usize]);
            let normal = (b - a).cross(c - a);
            triangles += 1;
            if normal.z.abs() > 1e-6 {
                tilted += 1;
            }
        }
    }
    assert!(triangles > 0, "a volume spanning [0, 1] crosses the 0.5 threshold");
    assert!(
        tilted > 0,
        "{triangles} triangles, none facing along z: density does not vary with depth"
    );
}

#[test]
fn test_volume_tiles_share_seams() {
    let n = 9;
    let mut config = grid_config(n, (2, 1));
    config.mesh.kind = MeshKind::Volume;
    let outputs = rebuild(&config).unwrap();

    let left = tile(&outputs, 0, 0).volume.as_ref().unwrap();
    let right = tile(&outputs, 1, 0).volume.as_ref().unwrap();
    for z in 0..n {
        for y in 0..n {
            assert_eq!(
                left.get_3d(n - 1, y, z),
                right.get_3d(0, y, z),
                "seam mismatch at ({y}, {z})"
            );
        }
    }
}
