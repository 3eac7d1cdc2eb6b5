use glam::Vec3;
use strata_dispatch::ComputeBackend;
use strata_field::{FieldSynthesizer, FieldTile, FractalParams, Rank};
use strata_noise::{NoiseMode, PermutationTable};

use crate::{LandMass, RegionError};

/// Distance field from every cell of a tile to the nearest landmass seed
/// point, for spreading resources around landmasses.
///
/// Seed points are tile-local; `offset` is the tile origin used when the
/// field tile was synthesized.
pub fn resource_field<'a, B, I>(
    backend: &B,
    table: &PermutationTable,
    dimensions: usize,
    offset: Vec3,
    landmasses: I,
) -> Result<FieldTile, RegionError>
where
    B: ComputeBackend + ?Sized,
    I: IntoIterator<Item = &'a LandMass>,
{
    let seeds = landmasses
        .into_iter()
        .map(|mass| Vec3::new(mass.seed_point.x as f32 + offset.x, mass.seed_point.y as f32 + offset.y, 0.0))
        .collect();
    let params = FractalParams {
        dimensions,
        offset: Vec3::new(offset.x, offset.y, 0.0),
        rank: Rank::Two,
        noise_mode: NoiseMode::Worley,
        ..Default::default()
    };
    Ok(FieldSynthesizer::new(backend, table)
        .with_seed_points(seeds)
        .synthesize(&params)?)
}
