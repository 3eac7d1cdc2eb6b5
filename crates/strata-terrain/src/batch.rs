//! Two-pass generation of a grid of tiles with shared normalization.

use crossbeam_channel::bounded;
use glam::Vec3;
use strata_dispatch::ComputeBackend;
use strata_field::{FieldSynthesizer, FieldTile, FractalParams, normalize};
use strata_noise::PermutationTable;

use crate::{BatchError, TileCoord};

/// Running `(min, max)` over the raw cells of many tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalBounds {
    pub min: f32,
    pub max: f32,
}

impl GlobalBounds {
    /// Identity of [`merge`](Self::merge).
    pub const EMPTY: Self = Self {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn of(tile: &FieldTile) -> Self {
        Self {
            min: tile.min_value(),
            max: tile.max_value(),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// A grid of tiles generated from one set of fractal parameters.
///
/// Tile `(i, j)` is sampled at `world_offset + (i, j) * (dimensions - 1)`,
/// so neighbours share their boundary row or column. Generation runs in two
/// passes over a worker pool: raw tiles first, folding their bounds into one
/// [`GlobalBounds`], then every tile is normalized against those bounds.
pub struct TileBatch {
    pub params: FractalParams,
    pub grid_extent: (u32, u32),
    pub world_offset: Vec3,
    pub workers: usize,
    seed_points: Option<Vec<Vec3>>,
}

impl TileBatch {
    pub fn new(params: FractalParams, grid_extent: (u32, u32)) -> Self {
        let world_offset = params.offset;
        Self {
            params,
            grid_extent,
            world_offset,
            workers: num_cpus::get().max(1),
            seed_points: None,
        }
    }

    pub fn with_world_offset(mut self, world_offset: Vec3) -> Self {
        self.world_offset = world_offset;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Seed points for batches in Worley mode.
    pub fn with_seed_points(mut self, points: Vec<Vec3>) -> Self {
        self.seed_points = Some(points);
        self
    }

    /// Tile coordinates in row-major order.
    pub fn coords(&self) -> Vec<TileCoord> {
        let (width, height) = self.grid_extent;
        (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| TileCoord::new(x, y)))
            .collect()
    }

    pub fn tile_offset(&self, coord: TileCoord) -> Vec3 {
        let stride = (self.params.sanitized().dimensions - 1) as f32;
        self.world_offset + Vec3::new(coord.x as f32 * stride, coord.y as f32 * stride, 0.0)
    }

    /// Generate and normalize every tile. Any tile failure fails the batch.
    pub fn generate<B>(
        &self,
        backend: &B,
        table: &PermutationTable,
    ) -> Result<Vec<(TileCoord, FieldTile)>, BatchError>
    where
        B: ComputeBackend + ?Sized,
    {
        let mut synth = FieldSynthesizer::new(backend, table);
        if let Some(points) = &self.seed_points {
            synth = synth.with_seed_points(points.clone());
        }

        let raw = run_pool(self.coords(), self.workers, |coord| {
            let params = FractalParams {
                offset: self.tile_offset(coord),
                ..self.params.clone()
            };
            synth
                .synthesize(&params)
                .map(|tile| (coord, tile))
                .map_err(|source| BatchError::Tile { coord, source })
        })?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        let bounds = raw
            .iter()
            .map(|(_, tile)| GlobalBounds::of(tile))
            .fold(GlobalBounds::EMPTY, GlobalBounds::merge);
        log::info!(
            "Generated {} raw tiles, global bounds [{}, {}]",
            raw.len(),
            bounds.min,
            bounds.max
        );

        run_pool(raw, self.workers, |(coord, tile)| {
            (coord, normalize(&tile, bounds.min, bounds.max))
        })
    }
}

/// Map `jobs` through `work` on `workers` threads, keeping input order.
fn run_pool<T, R, F>(jobs: Vec<T>, workers: usize, work: F) -> Result<Vec<R>, BatchError>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let count = jobs.len();
    let (job_sender, job_receiver) = bounded::<(usize, T)>(count.max(1));
    let (result_sender, result_receiver) = bounded::<(usize, R)>(count.max(1));
    for job in jobs.into_iter().enumerate() {
        if job_sender.send(job).is_err() {
            break;
        }
    }
    drop(job_sender);

    std::thread::scope(|s| {
        for worker in 0..workers.clamp(1, count.max(1)) {
            let receiver = job_receiver.clone();
            let sender = result_sender.clone();
            let work = &work;
            std::thread::Builder::new()
                .name(format!("tile-worker-{worker}"))
                .spawn_scoped(s, move || {
                    while let Ok((index, job)) = receiver.recv() {
                        if sender.send((index, work(job))).is_err() {
                            break;
                        }
                    }
                })
                .map_err(BatchError::Spawn)?;
        }
        Ok::<_, BatchError>(())
    })?;
    drop(result_sender);

    let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
    for (index, result) in result_receiver.try_iter() {
        slots[index] = Some(result);
    }
    Ok(slots.into_iter().flatten().collect())
}
