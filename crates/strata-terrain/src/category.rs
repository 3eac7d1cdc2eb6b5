use serde::{Deserialize, Serialize};

/// Linear RGBA color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Scale the color channels, keeping alpha.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }
}

/// A named band of normalized heights, `[min_threshold, max_threshold)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainCategory {
    pub name: String,
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub color: Color,
}

impl TerrainCategory {
    pub fn new(name: impl Into<String>, min_threshold: f32, max_threshold: f32, color: Color) -> Self {
        Self {
            name: name.into(),
            min_threshold,
            max_threshold,
            color,
        }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        self.min_threshold <= value && value < self.max_threshold
    }
}
