//! Gradient (Perlin-style) noise over a seeded permutation table.

use crate::interpolate::{FadeMode, InterpolationMode};
use crate::permutation::PermutationTable;

/// Version tag of the 2D corner hash `p[p[xi] + yi]` with gradients
/// `(±1, ±1)` picked by `h & 3`. Changing the hash changes every field.
pub const HASH_2D_V1: u32 = 1;

/// Version tag of the 3D corner hash `p[p[p[xi] + yi] + zi]` with the twelve
/// cube-edge gradients picked by `h % 12`.
pub const HASH_3D_V1: u32 = 1;

/// Evaluates gradient noise in `[-1, 1]` at arbitrary 2D or 3D points.
#[derive(Clone, Copy, Debug)]
pub struct GradientNoise<'a> {
    table: &'a PermutationTable,
    fade: FadeMode,
    interpolation: InterpolationMode,
}

impl<'a> GradientNoise<'a> {
    pub fn new(table: &'a PermutationTable, fade: FadeMode, interpolation: InterpolationMode) -> Self {
        Self {
            table,
            fade,
            interpolation,
        }
    }

    pub fn evaluate_2d(&self, x: f32, y: f32) -> f32 {
        let (xi, xf) = lattice(x);
        let (yi, yf) = lattice(y);
        let p = |i: usize| self.table.get(i) as usize;

        let aa = p(p(xi) + yi);
        let ab = p(p(xi) + yi + 1);
        let ba = p(p(xi + 1) + yi);
        let bb = p(p(xi + 1) + yi + 1);

        let u = self.fade.apply(xf);
        let v = self.fade.apply(yf);
        let blend = |a, b, t| self.interpolation.blend(a, b, t);

        let bottom = blend(grad_2d(aa, xf, yf), grad_2d(ba, xf - 1.0, yf), u);
        let top = blend(grad_2d(ab, xf, yf - 1.0), grad_2d(bb, xf - 1.0, yf - 1.0), u);
        blend(bottom, top, v).clamp(-1.0, 1.0)
    }

    pub fn evaluate_3d(&self, x: f32, y: f32, z: f32) -> f32 {
        let (xi, xf) = lattice(x);
        let (yi, yf) = lattice(y);
        let (zi, zf) = lattice(z);
        let p = |i: usize| self.table.get(i) as usize;

        let a = p(xi) + yi;
        let b = p(xi + 1) + yi;
        let aa = p(a) + zi;
        let ab = p(a + 1) + zi;
        let ba = p(b) + zi;
        let bb = p(b + 1) + zi;

        let u = self.fade.apply(xf);
        let v = self.fade.apply(yf);
        let w = self.fade.apply(zf);
        let blend = |a, b, t| self.interpolation.blend(a, b, t);

        let near = blend(
            blend(grad_3d(p(aa), xf, yf, zf), grad_3d(p(ba), xf - 1.0, yf, zf), u),
            blend(grad_3d(p(ab), xf, yf - 1.0, zf), grad_3d(p(bb), xf - 1.0, yf - 1.0, zf), u),
            v,
        );
        let far = blend(
            blend(
                grad_3d(p(aa + 1), xf, yf, zf - 1.0),
                grad_3d(p(ba + 1), xf - 1.0, yf, zf - 1.0),
                u,
            ),
            blend(
                grad_3d(p(ab + 1), xf, yf - 1.0, zf - 1.0),
                grad_3d(p(bb + 1), xf - 1.0, yf - 1.0, zf - 1.0),
                u,
            ),
            v,
        );
        blend(near, far, w).clamp(-1.0, 1.0)
    }
}

/// Split a coordinate into its wrapped lattice cell and fractional part.
#[inline]
fn lattice(coord: f32) -> (usize, f32) {
    let floor = libm::floorf(coord);
    ((floor as i64 & 255) as usize, coord - floor)
}

#[inline]
fn grad_2d(hash: usize, x: f32, y: f32) -> f32 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

#[inline]
fn grad_3d(hash: usize, x: f32, y: f32, z: f32) -> f32 {
    match hash % 12 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x + z,
        5 => -x + z,
        6 => x - z,
        7 => -x - z,
        8 => y + z,
        9 => -y + z,
        10 => y - z,
        _ => -y - z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel(table: &PermutationTable) -> GradientNoise<'_> {
        GradientNoise::new(table, FadeMode::Quintic, InterpolationMode::Linear)
    }

    #[test]
    fn test_zero_on_lattice_points() {
        let table = PermutationTable::from_seed(5);
        let noise = kernel(&table);
        for (x, y) in [(0.0, 0.0), (3.0, 7.0), (-4.0, 12.0)] {
            assert_eq!(noise.evaluate_2d(x, y), 0.0, "2D at ({x}, {y})");
            assert_eq!(noise.evaluate_3d(x, y, 2.0), 0.0, "3D at ({x}, {y}, 2)");
        }
    }

    #[test]
    fn test_values_stay_in_range() {
        let table = PermutationTable::from_seed(11);
        for interpolation in [InterpolationMode::Linear, InterpolationMode::Hermite] {
            for fade in [FadeMode::SmoothStep, FadeMode::Quintic] {
                let noise = GradientNoise::new(&table, fade, interpolation);
                for i in 0..400 {
                    let x = i as f32 * 0.173 - 30.0;
                    let y = i as f32 * 0.291 + 5.0;
                    let v2 = noise.evaluate_2d(x, y);
                    let v3 = noise.evaluate_3d(x, y, x * 0.5);
                    assert!((-1.0..=1.0).contains(&v2), "2D value {v2} out of range");
                    assert!((-1.0..=1.0).contains(&v3), "3D value {v3} out of range");
                }
            }
        }
    }

    #[test]
    fn test_deterministic_for_same_table() {
        let a = PermutationTable::from_seed(21);
        let b = PermutationTable::from_seed(21);
        for i in 0..50 {
            let x = i as f32 * 0.37;
            assert_eq!(
                kernel(&a).evaluate_2d(x, -x).to_bits(),
                kernel(&b).evaluate_2d(x, -x).to_bits()
            );
            assert_eq!(
                kernel(&a).evaluate_3d(x, 1.5, -x).to_bits(),
                kernel(&b).evaluate_3d(x, 1.5, -x).to_bits()
            );
        }
    }

    #[test]
    fn test_negative_coordinates_vary() {
        let table = PermutationTable::from_seed(8);
        let noise = kernel(&table);
        let values: Vec<f32> = (0..20).map(|i| noise.evaluate_2d(-0.5 - i as f32 * 0.7, -2.25)).collect();
        assert!(
            values.iter().any(|v| v.abs() > 1e-3),
            "noise on negative coordinates should not collapse to zero"
        );
    }

    #[test]
    fn test_continuous_across_cell_boundary() {
        let table = PermutationTable::from_seed(13);
        let noise = kernel(&table);
        let left = noise.evaluate_2d(2.0 - 1e-4, 0.4);
        let right = noise.evaluate_2d(2.0 + 1e-4, 0.4);
        assert!((left - right).abs() < 1e-2, "jump across x = 2: {left} vs {right}");
    }

    #[test]
    fn test_lattice_wraps_negative() {
        assert_eq!(lattice(-0.25), (255, 0.75));
        assert_eq!(lattice(256.5), (0, 0.5));
    }
}
