use std::collections::BTreeMap;
use std::time::Instant;

use strata_config::Config;
use strata_dispatch::{ComputeBackend, HostBackend};
use strata_field::{FieldTile, Rank};
use strata_mesh::MeshBuffers;
use strata_noise::PermutationTable;
use strata_terrain::{
    ColorMap, ColorMode, LandMass, TileBatch, TileCoord, color_map, extract_all, resource_field,
};

use crate::WorldError;

/// Everything generated for one tile of the grid.
#[derive(Clone, Debug)]
pub struct TileOutput {
    pub coord: TileCoord,
    /// Height field normalized against the whole grid. For volume meshes
    /// this is the `z = 0` slice of [`volume`](Self::volume).
    pub field: FieldTile,
    /// Density volume the mesh was marched from; `None` for heightmaps.
    pub volume: Option<FieldTile>,
    pub mesh: MeshBuffers,
    pub colors: ColorMap,
    /// Landmasses keyed by category index.
    pub landmasses: BTreeMap<usize, Vec<LandMass>>,
    /// Distance to the nearest landmass seed point; `None` when the tile has
    /// no landmass at all.
    pub resources: Option<FieldTile>,
}

impl TileOutput {
    pub fn landmass_count(&self) -> usize {
        self.landmasses.values().map(Vec::len).sum()
    }
}

/// Regenerate the whole grid described by `config` on the host backend.
///
/// The permutation table is derived from the noise seed, so equal configs
/// produce equal outputs.
pub fn rebuild(config: &Config) -> Result<Vec<TileOutput>, WorldError> {
    let table = PermutationTable::from_seed(config.noise.seed);
    rebuild_with(config, &HostBackend::with_defaults(), &table)
}

/// [`rebuild`] with a caller-provided backend and permutation table.
///
/// The config is sanitized first. Outputs are in row-major tile order.
pub fn rebuild_with<B>(
    config: &Config,
    backend: &B,
    table: &PermutationTable,
) -> Result<Vec<TileOutput>, WorldError>
where
    B: ComputeBackend + ?Sized,
{
    let config = config.sanitized();
    let started = Instant::now();

    let mut batch = TileBatch::new(config.fractal_params(), config.tiling.grid_extent);
    let seed_points = config.seed_points();
    if !seed_points.is_empty() {
        batch = batch.with_seed_points(seed_points);
    }
    let tiles = batch.generate(backend, table)?;

    let outputs = tiles
        .into_iter()
        .map(|(coord, field)| build_tile(&config, &batch, backend, table, coord, field))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Rebuilt {} tiles ({:?} meshes, {} landmasses) in {:.2?}",
        outputs.len(),
        config.mesh.kind,
        outputs.iter().map(TileOutput::landmass_count).sum::<usize>(),
        started.elapsed()
    );
    Ok(outputs)
}

fn build_tile<B>(
    config: &Config,
    batch: &TileBatch,
    backend: &B,
    table: &PermutationTable,
    coord: TileCoord,
    field: FieldTile,
) -> Result<TileOutput, WorldError>
where
    B: ComputeBackend + ?Sized,
{
    let (field, volume) = match field.rank() {
        Rank::Two => (field, None),
        Rank::Three => (field.project_to_2d()?, Some(field)),
    };
    let mesh = match &volume {
        Some(density) => config.volume_mesher().build(backend, density)?,
        None => config.heightmap_mesher().build(backend, &field)?,
    };
    let categories = config.classification.as_slice();
    let colors = color_map(&field, ColorMode::Categories(categories))?;
    let landmasses = extract_all(&field, categories)?;

    let resources = if landmasses.values().all(Vec::is_empty) {
        None
    } else {
        Some(resource_field(
            backend,
            table,
            field.dimensions(),
            batch.tile_offset(coord),
            landmasses.values().flatten(),
        )?)
    };

    log::debug!(
        "Tile {}: {} triangles, {} landmasses",
        coord,
        mesh.triangle_count(),
        landmasses.values().map(Vec::len).sum::<usize>()
    );
    Ok(TileOutput {
        coord,
        field,
        volume,
        mesh,
        colors,
        landmasses,
        resources,
    })
}
