use serde::{Deserialize, Serialize};

use crate::MeshError;

/// Monotonic piecewise-linear remapping of normalized heights.
///
/// Inputs left of the first key or right of the last are clamped to the end
/// values. Persisted as a list of `(input, output)` keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>")]
pub struct HeightCurve {
    keys: Vec<(f32, f32)>,
}

impl HeightCurve {
    /// Keys must be non-empty, strictly increasing in input and
    /// non-decreasing in output.
    pub fn new(keys: Vec<(f32, f32)>) -> Result<Self, MeshError> {
        if keys.is_empty() {
            return Err(MeshError::Configuration("height curve needs at least one key".into()));
        }
        for pair in keys.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            if x1 <= x0 || y1 < y0 {
                return Err(MeshError::Configuration(format!(
                    "height curve keys must be monotonic: ({x0}, {y0}) then ({x1}, {y1})"
                )));
            }
        }
        Ok(Self { keys })
    }

    /// Maps `[0, 1]` onto itself unchanged.
    pub fn identity() -> Self {
        Self {
            keys: vec![(0.0, 0.0), (1.0, 1.0)],
        }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let upper = self.keys.partition_point(|&(x, _)| x <= t);
        match upper {
            0 => self.keys[0].1,
            n if n == self.keys.len() => self.keys[n - 1].1,
            n => {
                let (x0, y0) = self.keys[n - 1];
                let (x1, y1) = self.keys[n];
                y0 + (t - x0) / (x1 - x0) * (y1 - y0)
            }
        }
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<Vec<(f32, f32)>> for HeightCurve {
    type Error = MeshError;

    fn try_from(keys: Vec<(f32, f32)>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<HeightCurve> for Vec<(f32, f32)> {
    fn from(curve: HeightCurve) -> Self {
        curve.keys
    }
}
