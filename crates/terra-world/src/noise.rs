//! Gradient noise kernel.
//!
//! Classic 2D gradient noise over a 256-wide integer lattice, plus fractal
//! (multi-octave) composition. The quintic fade curve has zero first and
//! second derivatives at the lattice lines, so neighbouring chunks sampled at
//! shared world coordinates join without a visible seam.
//!
//! ## Determinism
//!
//! The permutation table is shuffled with a fixed xorshift64 Fisher-Yates
//! pass, so a seed maps to the same table on every platform and independent
//! of any RNG crate version. All evaluation is plain `f64` arithmetic in a
//! fixed operation order; batch and parallel evaluation return exactly what
//! the scalar path returns.

use rayon::prelude::*;

/// Gradient directions indexed by `hash % 8`: four diagonals, then four axes.
const GRADIENTS: [(i8, i8); 8] = [
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];

/// Pre-computed permutation table for noise.
///
/// 256 shuffled entries repeated twice, so `perm[perm[i] + j]` never needs
/// wrapping for `i, j <= 256`.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    /// Builds the table for a seed.
    #[must_use]
    pub fn build(seed: u64) -> Self {
        let mut base = [0u8; 256];
        for (i, slot) in base.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // A zero state would stall xorshift.
        let mut state = seed.wrapping_add(0x9E37_79B9_7F4A_7C15).max(1);
        for i in (1..256usize).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;

            let j = (state % (i as u64 + 1)) as usize;
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&base);
        perm[256..].copy_from_slice(&base);
        Self { perm }
    }

    /// Returns the entry at `index` (`index < 512`).
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index])
    }

    /// Returns all 512 entries.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.perm
    }

    #[inline]
    fn hash(&self, i: usize, j: usize) -> usize {
        self.get(self.get(i) + j)
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

/// Octave parameters for [`fractal_noise`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    /// Number of layers
    pub octaves: u32,
    /// Amplitude multiplier per layer
    pub persistence: f64,
    /// Frequency multiplier per layer
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: terra_common::OCTAVES,
            persistence: terra_common::PERSISTENCE,
            lacunarity: terra_common::LACUNARITY,
        }
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
#[must_use]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the hashed gradient with the offset `(x, y)`.
#[inline]
fn gradient(hash: usize, x: f64, y: f64) -> f64 {
    match GRADIENTS[hash % 8] {
        (gx, 0) => {
            if gx > 0 {
                x
            } else {
                -x
            }
        },
        (0, gy) => {
            if gy > 0 {
                y
            } else {
                -y
            }
        },
        (gx, gy) => {
            let dx = if gx > 0 { x } else { -x };
            let dy = if gy > 0 { y } else { -y };
            dx + dy
        },
    }
}

/// Samples 2D gradient noise at `(x, y)`.
///
/// Continuous and differentiable everywhere; zero on every lattice point.
#[must_use]
pub fn gradient_noise(x: f64, y: f64, table: &PermutationTable) -> f64 {
    let x_floor = x.floor();
    let y_floor = y.floor();
    let xi = (x_floor as i64 & 255) as usize;
    let yi = (y_floor as i64 & 255) as usize;

    let xf = x - x_floor;
    let yf = y - y_floor;

    let u = fade(xf);
    let v = fade(yf);

    let n00 = table.hash(xi, yi);
    let n01 = table.hash(xi, yi + 1);
    let n10 = table.hash(xi + 1, yi);
    let n11 = table.hash(xi + 1, yi + 1);

    let x1 = lerp(gradient(n00, xf, yf), gradient(n10, xf - 1.0, yf), u);
    let x2 = lerp(
        gradient(n01, xf, yf - 1.0),
        gradient(n11, xf - 1.0, yf - 1.0),
        u,
    );

    lerp(x1, x2, v)
}

/// Sums `params.octaves` layers of gradient noise, normalised by the total
/// amplitude.
#[must_use]
pub fn fractal_noise(x: f64, y: f64, table: &PermutationTable, params: FractalParams) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_amplitude = 0.0;

    for _ in 0..params.octaves {
        total += gradient_noise(x * frequency, y * frequency, table) * amplitude;
        max_amplitude += amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    total / max_amplitude
}

/// Evaluates [`fractal_noise`] for every point, in order.
#[must_use]
pub fn fractal_noise_batch(
    points: &[[f64; 2]],
    table: &PermutationTable,
    params: FractalParams,
) -> Vec<f64> {
    points
        .iter()
        .map(|&[x, y]| fractal_noise(x, y, table, params))
        .collect()
}

/// Parallel [`fractal_noise_batch`]. Results are bit-identical to the
/// sequential version.
#[must_use]
pub fn fractal_noise_par(
    points: &[[f64; 2]],
    table: &PermutationTable,
    params: FractalParams,
) -> Vec<f64> {
    points
        .par_iter()
        .map(|&[x, y]| fractal_noise(x, y, table, params))
        .collect()
}
