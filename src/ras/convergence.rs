//! Convergence evaluation.
//!
//! A matrix is considered balanced when the aggregate absolute marginal
//! deviation
//!
//! ```text
//! Σ_i |rowsum_i − r_i| + Σ_j |colsum_j − c_j|
//! ```
//!
//! is strictly below the tolerance. Only threshold comparisons are used; a
//! NaN deviation never counts as converged.

use crate::domain::{Axis, DegenerateAxis, Matrix};
use crate::math::{col_sums, row_sums, stable_sum};

/// Aggregate absolute deviation of `m`'s marginals from the targets.
pub fn marginal_deviation(m: &Matrix, row_targets: &[f64], col_targets: &[f64]) -> f64 {
    let rows = row_sums(m);
    let cols = col_sums(m);

    let row_dev = rows.iter().zip(row_targets).map(|(s, t)| (s - t).abs());
    let col_dev = cols.iter().zip(col_targets).map(|(s, t)| (s - t).abs());
    stable_sum(row_dev.chain(col_dev))
}

/// `true` when `deviation` is within tolerance.
pub fn is_within_tolerance(deviation: f64, tolerance: f64) -> bool {
    deviation < tolerance
}

/// Evaluate whether `m` satisfies both marginals within `tolerance`.
pub fn is_balanced(m: &Matrix, row_targets: &[f64], col_targets: &[f64], tolerance: f64) -> bool {
    is_within_tolerance(marginal_deviation(m, row_targets, col_targets), tolerance)
}

/// Rows and columns that sum to zero yet carry a nonzero target.
///
/// The identity-scaler policy leaves such axes at zero forever, so their
/// targets are unreachable and any run containing one cannot converge.
pub fn degenerate_axes(m: &Matrix, row_targets: &[f64], col_targets: &[f64]) -> Vec<DegenerateAxis> {
    let rows = row_sums(m)
        .into_iter()
        .zip(row_targets)
        .enumerate()
        .filter(|(_, (s, t))| *s == 0.0 && **t > 0.0)
        .map(|(index, (_, &target))| DegenerateAxis {
            axis: Axis::Row,
            index,
            target,
        });

    let cols = col_sums(m)
        .into_iter()
        .zip(col_targets)
        .enumerate()
        .filter(|(_, (s, t))| *s == 0.0 && **t > 0.0)
        .map(|(index, (_, &target))| DegenerateAxis {
            axis: Axis::Column,
            index,
            target,
        });

    rows.chain(cols).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deviation_sums_row_and_column_gaps() {
        // rows: [3, 7] vs [4, 7] -> 1; cols: [4, 6] vs [4, 4] -> 2
        let m = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let d = marginal_deviation(&m, &[4.0, 7.0], &[4.0, 4.0]);
        assert_relative_eq!(d, 3.0);
    }

    #[test]
    fn exact_marginals_have_zero_deviation() {
        let m = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(marginal_deviation(&m, &[3.0, 7.0], &[4.0, 6.0]), 0.0);
        assert!(is_balanced(&m, &[3.0, 7.0], &[4.0, 6.0], 1e-12));
    }

    #[test]
    fn tolerance_is_strict() {
        assert!(!is_within_tolerance(1e-6, 1e-6));
        assert!(is_within_tolerance(0.99e-6, 1e-6));
        assert!(!is_within_tolerance(f64::NAN, 1e-6));
    }

    #[test]
    fn degenerate_axes_only_flags_unreachable_targets() {
        let m = Matrix::from_row_slice(3, 3, &[0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 0.0]);
        // Row 2 sums to zero with a zero target: not degenerate.
        let found = degenerate_axes(&m, &[5.0, 3.0, 0.0], &[1.0, 4.0, 2.0]);
        assert_eq!(
            found,
            vec![
                DegenerateAxis {
                    axis: Axis::Row,
                    index: 0,
                    target: 5.0
                },
                DegenerateAxis {
                    axis: Axis::Column,
                    index: 1,
                    target: 4.0
                },
            ]
        );
    }
}
