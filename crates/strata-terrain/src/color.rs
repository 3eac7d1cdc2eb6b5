use strata_field::{FieldTile, Rank};

use crate::{Color, RegionError, TerrainCategory};

/// How [`color_map`] colors a cell.
#[derive(Clone, Copy, Debug)]
pub enum ColorMode<'a> {
    /// One color scaled by the cell value.
    Tint(Color),
    /// The color of the first category whose band holds the cell, black if none.
    Categories(&'a [TerrainCategory]),
}

/// Per-cell colors of a height field, indexed `y * n + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    pub dimensions: usize,
    pub pixels: Vec<Color>,
}

impl ColorMap {
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.dimensions + x]
    }

    /// Pixels as raw RGBA32F bytes for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

pub fn color_map(tile: &FieldTile, mode: ColorMode<'_>) -> Result<ColorMap, RegionError> {
    if tile.rank() != Rank::Two {
        return Err(RegionError::RankMismatch(tile.rank()));
    }
    let pixels = tile
        .cells()
        .iter()
        .map(|&value| match mode {
            ColorMode::Tint(color) => color.scaled(value),
            ColorMode::Categories(categories) => categories
                .iter()
                .find(|category| category.contains(value))
                .map_or(Color::BLACK, |category| category.color),
        })
        .collect();
    Ok(ColorMap {
        dimensions: tile.dimensions(),
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> FieldTile {
        FieldTile::from_cells(2, Rank::Two, vec![0.0, 0.5, 0.75, 1.0]).unwrap()
    }

    #[test]
    fn test_tint_scales_by_value() {
        let map = color_map(&tile(), ColorMode::Tint(Color::rgb(1.0, 0.5, 0.0))).unwrap();
        assert_eq!(map.get(0, 0), Color::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(map.get(1, 0), Color::new(0.5, 0.25, 0.0, 1.0));
        assert_eq!(map.get(1, 1), Color::rgb(1.0, 0.5, 0.0));
        assert_eq!(map.as_bytes().len(), 4 * 16);
    }

    #[test]
    fn test_categories_pick_first_match() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let categories = [
            TerrainCategory::new("a", 0.4, 0.8, red),
            TerrainCategory::new("b", 0.7, 0.9, blue),
        ];
        let map = color_map(&tile(), ColorMode::Categories(&categories)).unwrap();
        assert_eq!(map.get(0, 0), Color::BLACK, "no band holds 0.0");
        assert_eq!(map.get(1, 0), red);
        assert_eq!(map.get(0, 1), red, "0.75 is in both bands, first wins");
        assert_eq!(map.get(1, 1), Color::BLACK);
    }
}
