//! Fade and blend curves shared by the gradient kernels.

use serde::{Deserialize, Serialize};

/// Easing curve applied to the fractional lattice coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FadeMode {
    /// `t²(3 - 2t)`.
    SmoothStep,
    /// `6t⁵ - 15t⁴ + 10t³`.
    #[default]
    Quintic,
}

impl FadeMode {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::Quintic => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        }
    }
}

/// How two corner contributions are blended along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationMode {
    #[default]
    Linear,
    /// Cubic Hermite basis `h1 = 2t³ - 3t² + 1`, `h2 = -2t³ + 3t²`.
    Hermite,
}

impl InterpolationMode {
    #[inline]
    pub fn blend(self, a: f32, b: f32, t: f32) -> f32 {
        match self {
            Self::Linear => a + t * (b - a),
            Self::Hermite => {
                let t2 = t * t;
                let t3 = t2 * t;
                let h1 = 2.0 * t3 - 3.0 * t2 + 1.0;
                let h2 = -2.0 * t3 + 3.0 * t2;
                h1 * a + h2 * b
            }
        }
    }
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`.
///
/// A degenerate range (`a == b`) maps everything to `0`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
