//! Fractal field synthesis over a compute backend.

use glam::Vec3;
use strata_dispatch::{ComputeBackend, DispatchScope};
use strata_noise::{GradientNoise, NoiseMode, NoiseSource, OctaveOffsets, PermutationTable, Worley};

use crate::{FieldError, FieldTile, FractalParams, Rank};

const MODE_FRACTAL: u32 = 0;
const MODE_WORLEY: u32 = 1;

/// Scalar parameters of one synthesis dispatch, laid out for a uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FractalUniform {
    /// Tile origin, `w` unused.
    pub offset: [f32; 4],
    pub dimensions: u32,
    pub rank: u32,
    pub octaves: u32,
    /// `0` for layered noise, `1` for a single Worley layer.
    pub mode: u32,
    pub scale: f32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub _pad: u32,
}

static_assertions::assert_eq_size!(FractalUniform, [u8; 48]);

impl FractalUniform {
    pub fn from_params(params: &FractalParams) -> Self {
        Self {
            offset: [params.offset.x, params.offset.y, params.offset.z, 0.0],
            dimensions: params.dimensions as u32,
            rank: match params.rank {
                Rank::Two => 2,
                Rank::Three => 3,
            },
            octaves: params.octaves,
            mode: match params.noise_mode {
                NoiseMode::Worley => MODE_WORLEY,
                NoiseMode::Perlin | NoiseMode::Simplex => MODE_FRACTAL,
            },
            scale: params.scale,
            persistence: params.persistence,
            lacunarity: params.lacunarity,
            _pad: 0,
        }
    }

    fn origin(&self) -> Vec3 {
        Vec3::new(self.offset[0], self.offset[1], self.offset[2])
    }
}

/// Fills [`FieldTile`]s with layered noise.
///
/// The permutation table is injected so that callers control determinism:
/// two synthesizers sharing a table produce bit-identical tiles for the same
/// parameters.
pub struct FieldSynthesizer<'a, B: ComputeBackend + ?Sized> {
    backend: &'a B,
    table: &'a PermutationTable,
    seed_points: Option<Vec<Vec3>>,
}

impl<'a, B: ComputeBackend + ?Sized> FieldSynthesizer<'a, B> {
    pub fn new(backend: &'a B, table: &'a PermutationTable) -> Self {
        Self {
            backend,
            table,
            seed_points: None,
        }
    }

    /// Seed points sampled by [`NoiseMode::Worley`].
    pub fn with_seed_points(mut self, points: Vec<Vec3>) -> Self {
        self.seed_points = Some(points);
        self
    }

    pub fn synthesize(&self, params: &FractalParams) -> Result<FieldTile, FieldError> {
        let params = params.sanitized();
        let n = params.dimensions;
        let cells = params.rank.cell_count(n);

        let seed_points = match (params.noise_mode, &self.seed_points) {
            (NoiseMode::Worley, None) => {
                return Err(FieldError::Configuration(
                    "worley mode requires seed points".into(),
                ));
            }
            (NoiseMode::Worley, Some(points)) => Some(Worley::new(points.clone())?),
            _ => None,
        };
        let offsets = OctaveOffsets::generate(params.seed, params.octaves, params.offset);

        let mut scope = DispatchScope::new(self.backend, "fractal_field");
        scope.prepare_buffer("permutation_table", self.table.as_slice())?;
        scope.prepare_buffer("octave_offsets", &offsets.packed())?;
        if let Some(worley) = &seed_points {
            let packed: Vec<[f32; 4]> = worley.points().iter().map(|p| [p.x, p.y, p.z, 0.0]).collect();
            scope.prepare_buffer("seed_points", &packed)?;
        }
        scope.prepare_constant("fractal", &FractalUniform::from_params(&params))?;
        scope.prepare_output::<f32>("field", cells)?;

        let uniform: FractalUniform = scope.constant("fractal")?;
        let table = PermutationTable::try_from_slice(&scope.input::<u32>("permutation_table")?)?;
        let octave_offsets: Vec<Vec3> = scope
            .input::<[f32; 4]>("octave_offsets")?
            .into_iter()
            .map(|[x, y, z, _]| Vec3::new(x, y, z))
            .collect();
        let worley = match uniform.mode {
            MODE_WORLEY => Some(Worley::new(
                scope
                    .input::<[f32; 4]>("seed_points")?
                    .into_iter()
                    .map(|[x, y, z, _]| Vec3::new(x, y, z))
                    .collect(),
            )?),
            _ => None,
        };
        let source = match (&worley, params.noise_mode) {
            (Some(worley), _) => NoiseSource::Worley(worley),
            (None, NoiseMode::Simplex) => NoiseSource::simplex(params.seed),
            (None, _) => NoiseSource::Perlin(GradientNoise::new(&table, params.fade, params.interpolation)),
        };

        scope.dispatch("field", cells, 1, |index, out: &mut [f32]| {
            out[0] = sample_cell(&uniform, &source, &octave_offsets, index);
        })?;
        let values: Vec<f32> = scope.read_output("field")?;
        scope.finish()?;

        let tile = FieldTile::from_cells(n, params.rank, values)?;
        log::debug!(
            "Synthesized {n}^{} field at {:?}: [{}, {}]",
            uniform.rank,
            params.offset,
            tile.min_value(),
            tile.max_value()
        );
        Ok(tile)
    }
}

fn sample_cell(uniform: &FractalUniform, source: &NoiseSource<'_>, offsets: &[Vec3], index: usize) -> f32 {
    let n = uniform.dimensions as usize;
    let coord = Vec3::new(
        (index % n) as f32,
        (index / n % n) as f32,
        (index / (n * n)) as f32,
    );
    let sample = |p: Vec3| match uniform.rank {
        2 => source.sample_2d(p.x, p.y),
        _ => source.sample_3d(p.x, p.y, p.z),
    };

    if uniform.mode == MODE_WORLEY {
        return sample(coord + uniform.origin());
    }

    let mut amplitude = 1.0f32;
    let mut frequency = 1.0f32;
    let mut total = 0.0f32;
    for offset in offsets {
        let point = (coord + *offset) / uniform.scale * frequency;
        // High octaves overflow the sample point; they would only add NaN.
        if amplitude == 0.0 || !point.is_finite() {
            break;
        }
        total += amplitude * sample(point);
        amplitude *= uniform.persistence;
        frequency *= uniform.lacunarity;
    }
    total
}
