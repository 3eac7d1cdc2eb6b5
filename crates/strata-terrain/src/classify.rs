use strata_field::{FieldTile, Rank};

use crate::{GridCoord, RegionError, TerrainCategory};

/// Cells of one tile grouped by terrain category.
///
/// `cells(i)` lists, in row-major order, every cell whose value falls in the
/// band of category `i`. Overlapping bands put a cell in several lists; a
/// cell outside every band is in none.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    dimensions: usize,
    sets: Vec<Vec<GridCoord>>,
}

impl Classification {
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn category_count(&self) -> usize {
        self.sets.len()
    }

    pub fn cells(&self, category: usize) -> &[GridCoord] {
        self.sets.get(category).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Sort every cell of a height field into the categories whose band holds it.
pub fn classify(tile: &FieldTile, categories: &[TerrainCategory]) -> Result<Classification, RegionError> {
    if tile.rank() != Rank::Two {
        return Err(RegionError::RankMismatch(tile.rank()));
    }
    for category in categories {
        // Also rejects NaN thresholds.
        if !(category.min_threshold < category.max_threshold) {
            return Err(RegionError::InvalidBand {
                name: category.name.clone(),
                min: category.min_threshold,
                max: category.max_threshold,
            });
        }
    }

    let n = tile.dimensions();
    let mut sets = vec![Vec::new(); categories.len()];
    for y in 0..n {
        for x in 0..n {
            let value = tile.get(x, y);
            for (set, category) in sets.iter_mut().zip(categories) {
                if category.contains(value) {
                    set.push(GridCoord::new(x as i32, y as i32));
                }
            }
        }
    }
    Ok(Classification { dimensions: n, sets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn categories() -> Vec<TerrainCategory> {
        vec![
            TerrainCategory::new("low", 0.0, 0.5, Color::BLACK),
            TerrainCategory::new("high", 0.5, 1.01, Color::WHITE),
            TerrainCategory::new("middle", 0.25, 0.75, Color::WHITE),
        ]
    }

    #[test]
    fn test_cells_land_in_every_matching_band() {
        let tile = FieldTile::from_cells(2, Rank::Two, vec![0.0, 0.3, 0.6, 1.0]).unwrap();
        let classes = classify(&tile, &categories()).unwrap();
        assert_eq!(classes.category_count(), 3);
        assert_eq!(classes.cells(0), &[GridCoord::new(0, 0), GridCoord::new(1, 0)]);
        assert_eq!(classes.cells(1), &[GridCoord::new(0, 1), GridCoord::new(1, 1)]);
        assert_eq!(classes.cells(2), &[GridCoord::new(1, 0), GridCoord::new(0, 1)]);
        assert!(classes.cells(7).is_empty());
    }

    #[test]
    fn test_cell_outside_every_band() {
        let tile = FieldTile::from_cells(2, Rank::Two, vec![-1.0; 4]).unwrap();
        let classes = classify(&tile, &categories()).unwrap();
        assert!((0..3).all(|i| classes.cells(i).is_empty()));
    }

    #[test]
    fn test_rejects_volume_and_bad_bands() {
        let volume = FieldTile::from_cells(2, Rank::Three, vec![0.0; 8]).unwrap();
        assert_eq!(
            classify(&volume, &categories()),
            Err(RegionError::RankMismatch(Rank::Three))
        );

        let tile = FieldTile::from_cells(2, Rank::Two, vec![0.0; 4]).unwrap();
        let inverted = [TerrainCategory::new("bad", 0.8, 0.2, Color::BLACK)];
        assert!(matches!(
            classify(&tile, &inverted),
            Err(RegionError::InvalidBand { .. })
        ));
    }
}
