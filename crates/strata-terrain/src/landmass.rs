//! Connected-component extraction and seed point scoring.

use std::collections::BTreeMap;

use glam::Vec2;
use hashbrown::{HashMap, HashSet};
use strata_field::FieldTile;

use crate::{GridCoord, NEIGHBOUR_OFFSETS, RegionError, TerrainCategory, classify};

/// Weight kept by each propagation hop when scoring seed points.
const DECAY: f32 = 0.8;

/// Inclusive cell bounds of a landmass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl CellBounds {
    fn around(cell: GridCoord) -> Self {
        Self {
            min_x: cell.x,
            max_x: cell.x,
            min_y: cell.y,
            max_y: cell.y,
        }
    }

    fn include(&mut self, cell: GridCoord) {
        self.min_x = self.min_x.min(cell.x);
        self.max_x = self.max_x.max(cell.x);
        self.min_y = self.min_y.min(cell.y);
        self.max_y = self.max_y.max(cell.y);
    }
}

/// A maximal 8-connected set of cells sharing one terrain category.
#[derive(Clone, Debug, PartialEq)]
pub struct LandMass {
    pub category_index: usize,
    pub category_name: String,
    pub cells: HashSet<GridCoord>,
    pub bounds: CellBounds,
    /// Representative cell, biased towards the densely connected interior.
    pub seed_point: GridCoord,
}

impl LandMass {
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Squared diagonal of the bounds.
    pub fn extent(&self) -> f32 {
        let width = (self.bounds.max_x - self.bounds.min_x) as f32;
        let height = (self.bounds.max_y - self.bounds.min_y) as f32;
        width * width + height * height
    }

    /// Mean cell position.
    pub fn centroid(&self) -> Vec2 {
        let sum = self
            .cells
            .iter()
            .fold(Vec2::ZERO, |acc, c| acc + Vec2::new(c.x as f32, c.y as f32));
        sum / self.cells.len().max(1) as f32
    }

    /// Relative importance against the largest area and extent in a set of
    /// landmasses: `0.65 * area + 0.35 * extent`, both normalized.
    pub fn score(&self, max_area: usize, max_extent: f32) -> f32 {
        let area = self.area() as f32 / max_area.max(1) as f32;
        let extent = if max_extent > 0.0 {
            self.extent() / max_extent
        } else {
            0.0
        };
        0.65 * area + 0.35 * extent
    }
}

/// Flood-fill traversal record of one component.
struct Component {
    order: Vec<GridCoord>,
    masks: HashMap<GridCoord, u8>,
    density: HashMap<GridCoord, f32>,
    bounds: CellBounds,
}

/// Split the cells of one category into connected landmasses.
///
/// Cells are traversed depth-first with an explicit stack. Each popped cell
/// records which of its neighbours were still unvisited (its mask) and how
/// many it pushed (its density); both feed the seed point scoring.
pub fn extract_landmasses(
    category_index: usize,
    category: &TerrainCategory,
    coords: &[GridCoord],
    dimensions: usize,
) -> Vec<LandMass> {
    let mut remaining: HashSet<GridCoord> = coords.iter().copied().collect();
    let mut landmasses = Vec::new();

    for &start in coords {
        if !remaining.contains(&start) {
            continue;
        }
        let component = flood_fill(start, &mut remaining, dimensions);
        let seed_point = seed_point(&component);
        landmasses.push(LandMass {
            category_index,
            category_name: category.name.clone(),
            cells: component.order.iter().copied().collect(),
            bounds: component.bounds,
            seed_point,
        });
    }

    log::debug!(
        "Category `{}`: {} cells in {} landmasses",
        category.name,
        coords.len(),
        landmasses.len()
    );
    landmasses
}

/// Classify a height field and extract the landmasses of every category,
/// keyed by category index. Categories with no cells map to an empty list.
pub fn extract_all(
    tile: &FieldTile,
    categories: &[TerrainCategory],
) -> Result<BTreeMap<usize, Vec<LandMass>>, RegionError> {
    let classes = classify(tile, categories)?;
    Ok(categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            (
                i,
                extract_landmasses(i, category, classes.cells(i), classes.dimensions()),
            )
        })
        .collect())
}

fn neighbour_mask(cell: GridCoord, remaining: &HashSet<GridCoord>, dimensions: usize) -> u8 {
    NEIGHBOUR_OFFSETS
        .iter()
        .enumerate()
        .fold(0u8, |mask, (bit, &offset)| {
            let neighbour = cell.offset(offset);
            if neighbour.in_tile(dimensions) && remaining.contains(&neighbour) {
                mask | (1 << bit)
            } else {
                mask
            }
        })
}

fn flood_fill(start: GridCoord, remaining: &mut HashSet<GridCoord>, dimensions: usize) -> Component {
    let mut component = Component {
        order: Vec::new(),
        masks: HashMap::new(),
        density: HashMap::new(),
        bounds: CellBounds::around(start),
    };
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        // A cell can be pushed by several neighbours before it is popped.
        if !remaining.remove(&current) {
            continue;
        }
        let mask = neighbour_mask(current, remaining, dimensions);
        for (bit, &offset) in NEIGHBOUR_OFFSETS.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                stack.push(current.offset(offset));
            }
        }
        component.order.push(current);
        component.masks.insert(current, mask);
        component.density.insert(current, mask.count_ones() as f32);
        component.bounds.include(current);
    }
    component
}

/// Pick the seed point of a component.
///
/// Every cell starts a wave carrying its density. A wave of weight `w >= 1`
/// adds `w * DECAY` to each cell in its mask and continues from there with
/// that weight. The cell with the highest accumulated score among those
/// reached by a wave wins, ties going to the smallest coordinate. If no wave
/// travels at all, the densest cell in traversal order wins.
fn seed_point(component: &Component) -> GridCoord {
    let mut score = component.density.clone();
    let mut reached: HashSet<GridCoord> = HashSet::new();

    // Waves with the same weight at the same cell propagate identically, so
    // each round merges them and carries a multiplicity.
    let mut waves: HashMap<(GridCoord, u32), u64> = component
        .order
        .iter()
        .map(|cell| ((*cell, component.density[cell].to_bits()), 1))
        .collect();

    while !waves.is_empty() {
        let mut next: HashMap<(GridCoord, u32), u64> = HashMap::new();
        for ((cell, weight_bits), count) in waves {
            let weight = f32::from_bits(weight_bits);
            if weight < 1.0 {
                continue;
            }
            let propagated = weight * DECAY;
            let mask = component.masks.get(&cell).copied().unwrap_or(0);
            for (bit, &offset) in NEIGHBOUR_OFFSETS.iter().enumerate() {
                if mask & (1 << bit) == 0 {
                    continue;
                }
                let neighbour = cell.offset(offset);
                *score.entry(neighbour).or_insert(0.0) += propagated * count as f32;
                reached.insert(neighbour);
                *next.entry((neighbour, propagated.to_bits())).or_insert(0) += count;
            }
        }
        waves = next;
    }

    let best = reached.iter().copied().max_by(|a, b| {
        score[a]
            .total_cmp(&score[b])
            .then_with(|| b.cmp(a))
    });
    best.unwrap_or_else(|| {
        component
            .order
            .iter()
            .copied()
            .fold(None, |best: Option<GridCoord>, cell| match best {
                Some(b) if component.density[&b] >= component.density[&cell] => Some(b),
                _ => Some(cell),
            })
            .unwrap_or_default()
    })
}
