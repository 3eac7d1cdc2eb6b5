//! Immutable scalar field tiles.

use strata_noise::inverse_lerp;

use crate::FieldError;

/// Dimensionality of a field tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rank {
    /// An `n × n` height field.
    Two,
    /// An `n × n × n` density volume.
    Three,
}

impl Rank {
    /// Number of cells in an `n`-wide tile of this rank.
    pub fn cell_count(self, dimensions: usize) -> usize {
        match self {
            Self::Two => dimensions * dimensions,
            Self::Three => dimensions * dimensions * dimensions,
        }
    }
}

/// A square (or cubic) grid of scalar samples for one tile.
///
/// Cells are stored flat, indexed `x + y * n + z * n * n`. The recorded
/// bounds always enclose every cell. Tiles are never mutated: normalization
/// and rank conversion build new tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldTile {
    dimensions: usize,
    rank: Rank,
    min_value: f32,
    max_value: f32,
    cells: Vec<f32>,
}

impl FieldTile {
    /// Wrap `cells`, computing tight bounds.
    pub fn from_cells(dimensions: usize, rank: Rank, cells: Vec<f32>) -> Result<Self, FieldError> {
        let expected = rank.cell_count(dimensions);
        if cells.len() != expected || expected == 0 {
            return Err(FieldError::CellCount {
                dimensions,
                rank,
                expected,
                actual: cells.len(),
            });
        }
        let (min_value, max_value) = bounds(&cells);
        Ok(Self {
            dimensions,
            rank,
            min_value,
            max_value,
            cells,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<f32> {
        self.cells
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let n = self.dimensions;
        x + y * n + z * n * n
    }

    /// Sample of a height field, or of the `z = 0` slice of a volume.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[self.index(x, y, 0)]
    }

    #[inline]
    pub fn get_3d(&self, x: usize, y: usize, z: usize) -> f32 {
        self.cells[self.index(x, y, z)]
    }

    /// Extrude a height field along z into a volume with identical slices.
    pub fn lift_to_3d(&self) -> Result<FieldTile, FieldError> {
        self.expect_rank(Rank::Two)?;
        Ok(Self {
            dimensions: self.dimensions,
            rank: Rank::Three,
            min_value: self.min_value,
            max_value: self.max_value,
            cells: self.cells.repeat(self.dimensions),
        })
    }

    /// Keep the `z = 0` slice of a volume. Bounds are recomputed for the slice.
    pub fn project_to_2d(&self) -> Result<FieldTile, FieldError> {
        self.expect_rank(Rank::Three)?;
        let slice = self.cells[..Rank::Two.cell_count(self.dimensions)].to_vec();
        Self::from_cells(self.dimensions, Rank::Two, slice)
    }

    pub(crate) fn expect_rank(&self, expected: Rank) -> Result<(), FieldError> {
        if self.rank != expected {
            return Err(FieldError::RankMismatch {
                expected,
                actual: self.rank,
            });
        }
        Ok(())
    }
}

/// Remap every cell of `tile` to `[0, 1]` relative to `(global_min, global_max)`.
///
/// Cells outside the range are clamped and a degenerate range maps every
/// cell to `0`. The result carries the tight bounds of the remapped cells.
pub fn normalize(tile: &FieldTile, global_min: f32, global_max: f32) -> FieldTile {
    let cells: Vec<f32> = tile
        .cells
        .iter()
        .map(|&value| inverse_lerp(global_min, global_max, value))
        .collect();
    let (min_value, max_value) = bounds(&cells);
    FieldTile {
        dimensions: tile.dimensions,
        rank: tile.rank,
        min_value,
        max_value,
        cells,
    }
}

fn bounds(cells: &[f32]) -> (f32, f32) {
    cells
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
