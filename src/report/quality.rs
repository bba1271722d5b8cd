//! Marginal quality metrics for a balanced matrix.
//!
//! These look only at the output matrix and the targets, so they can grade
//! any result (converged or not) without access to the run itself.

use serde::{Deserialize, Serialize};

use crate::domain::Matrix;
use crate::math::{col_sums, row_sums};

/// How far a matrix's marginals are from their targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub max_row_error: f64,
    pub max_col_error: f64,
    pub rms_row_error: f64,
    pub rms_col_error: f64,
    /// Largest `|error| / target` in percent, over rows with a nonzero target.
    pub max_row_pct_error: Option<f64>,
    pub max_col_pct_error: Option<f64>,
}

impl QualityMetrics {
    /// Largest absolute error over both axes.
    pub fn max_error(&self) -> f64 {
        self.max_row_error.max(self.max_col_error)
    }
}

/// Grade `m` against the row and column targets.
///
/// Targets are matched to axes positionally; extra entries on either side
/// are ignored.
pub fn assess_quality(m: &Matrix, row_targets: &[f64], col_targets: &[f64]) -> QualityMetrics {
    let row_errors: Vec<f64> = row_sums(m)
        .iter()
        .zip(row_targets)
        .map(|(s, t)| s - t)
        .collect();
    let col_errors: Vec<f64> = col_sums(m)
        .iter()
        .zip(col_targets)
        .map(|(s, t)| s - t)
        .collect();

    QualityMetrics {
        max_row_error: max_abs(&row_errors),
        max_col_error: max_abs(&col_errors),
        rms_row_error: rms(&row_errors),
        rms_col_error: rms(&col_errors),
        max_row_pct_error: max_pct(&row_errors, row_targets),
        max_col_pct_error: max_pct(&col_errors, col_targets),
    }
}

fn max_abs(errors: &[f64]) -> f64 {
    errors.iter().map(|e| e.abs()).fold(0.0, f64::max)
}

fn rms(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }
    let mean_sq = errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64;
    mean_sq.sqrt()
}

fn max_pct(errors: &[f64], targets: &[f64]) -> Option<f64> {
    errors
        .iter()
        .zip(targets)
        .filter(|(_, t)| **t > 0.0)
        .map(|(e, t)| e.abs() / t * 100.0)
        .reduce(f64::max)
}
