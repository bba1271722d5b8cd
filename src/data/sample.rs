//! Synthetic flow-of-funds generation.
//!
//! We start from a stylized "true" sector × instrument balance sheet and
//! perturb each cell with multiplicative Gaussian measurement error. The true
//! row and column totals stand in for reliable administrative data; the noisy
//! interior stands in for survey estimates that no longer add up.
//!
//! Randomness always comes from a caller-owned generator so runs are
//! reproducible and independent of any global state.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::data::labels::{INSTRUMENTS_SHORT, SECTORS_SHORT, to_owned_labels};
use crate::domain::{BalanceProblem, Matrix};
use crate::error::AppError;
use crate::math::{col_sums, row_sums};

/// Stylized holdings (billions) at a scale of 1000.
///
/// Rows: HH, NFC, FC, Gov, ROW. Cols: Cash, Bonds, Equity, Loans, Pensions, Other.
const BASE_HOLDINGS: [[f64; 6]; 5] = [
    [100.0, 50.0, 300.0, 20.0, 400.0, 80.0],
    [80.0, 100.0, 200.0, 150.0, 50.0, 70.0],
    [50.0, 150.0, 100.0, 300.0, 100.0, 50.0],
    [30.0, 200.0, 20.0, 50.0, 30.0, 20.0],
    [40.0, 100.0, 80.0, 80.0, 20.0, 30.0],
];

const BASE_SCALE: f64 = 1000.0;

/// Relative measurement error by sector (households are noisiest).
const SECTOR_NOISE: [f64; 5] = [0.15, 0.10, 0.05, 0.02, 0.08];

/// Relative measurement error by instrument (cash is noisiest).
const INSTRUMENT_NOISE: [f64; 6] = [0.20, 0.05, 0.10, 0.08, 0.12, 0.15];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Overall size of the economy; `1000` reproduces the base holdings.
    pub scale: f64,
    /// Multiplier on the per-cell relative error.
    pub noise_level: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            scale: BASE_SCALE,
            noise_level: 0.1,
        }
    }
}

/// One simulated observation set.
#[derive(Debug, Clone)]
pub struct SimulatedData {
    pub true_matrix: Matrix,
    pub noisy: Matrix,
    pub row_targets: Vec<f64>,
    pub col_targets: Vec<f64>,
}

impl SimulatedData {
    /// Package the noisy interior and true totals as a labelled problem.
    pub fn to_problem(&self, name: impl Into<String>) -> BalanceProblem {
        BalanceProblem {
            name: name.into(),
            row_labels: to_owned_labels(&SECTORS_SHORT),
            col_labels: to_owned_labels(&INSTRUMENTS_SHORT),
            matrix: self.noisy.clone(),
            row_targets: self.row_targets.clone(),
            col_targets: self.col_targets.clone(),
        }
    }
}

/// The noise-free balance sheet at the given scale.
pub fn true_holdings(scale: f64) -> Matrix {
    Matrix::from_fn(SECTOR_NOISE.len(), INSTRUMENT_NOISE.len(), |i, j| {
        BASE_HOLDINGS[i][j] * (scale / BASE_SCALE)
    })
}

/// Simulate a noisy flow-of-funds matrix with its true marginal totals.
pub fn simulate_fof<R: Rng + ?Sized>(
    rng: &mut R,
    params: &SimulationParams,
) -> Result<SimulatedData, AppError> {
    if !(params.scale.is_finite() && params.scale > 0.0) {
        return Err(AppError::new(2, "Scale must be finite and > 0."));
    }
    if !(params.noise_level.is_finite() && params.noise_level >= 0.0) {
        return Err(AppError::new(2, "Noise level must be finite and >= 0."));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let true_matrix = true_holdings(params.scale);
    let (rows, cols) = true_matrix.shape();

    // Draw in row-major order so a seed maps to the same table regardless of
    // the matrix storage layout.
    let mut noisy = Matrix::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            let sigma = SECTOR_NOISE[i] * INSTRUMENT_NOISE[j] * params.noise_level;
            let z: f64 = normal.sample(rng);
            // No negative holdings.
            noisy[(i, j)] = (true_matrix[(i, j)] * (1.0 + z * sigma)).max(0.0);
        }
    }

    Ok(SimulatedData {
        row_targets: row_sums(&true_matrix),
        col_targets: col_sums(&true_matrix),
        true_matrix,
        noisy,
    })
}
