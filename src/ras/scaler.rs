//! Row and column scaling steps (the "R" and "S" halves of an iteration).
//!
//! Each step computes one multiplier per axis, `target / current_sum`, and
//! applies it to every cell on that axis.
//!
//! Degenerate axes: when the current sum is zero the ratio is undefined and
//! the identity multiplier `1.0` is used instead, so an all-zero row or
//! column is left untouched (it can never acquire mass, even when its target
//! is nonzero). The same fallback covers the pathological cases where the
//! ratio overflows to infinity because the sum is subnormal, or the sum
//! itself overflowed.

use crate::domain::Matrix;
use crate::math::stable_sum;

/// Multiplier that takes an axis summing to `current` onto `target`.
pub fn axis_scaler(target: f64, current: f64) -> f64 {
    if current > 0.0 && current.is_finite() {
        let ratio = target / current;
        if ratio.is_finite() {
            return ratio;
        }
    }
    1.0
}

/// Rescale every row of `m` onto `targets` in place.
///
/// Returns the multipliers that were applied, one per row.
///
/// # Panics
/// Panics if `targets.len() != m.nrows()`. The controller validates shapes
/// before any scaling happens.
pub fn scale_rows(m: &mut Matrix, targets: &[f64]) -> Vec<f64> {
    assert_eq!(targets.len(), m.nrows(), "row target length mismatch");

    let mut scalers = Vec::with_capacity(targets.len());
    for (mut row, &target) in m.row_iter_mut().zip(targets) {
        let r = axis_scaler(target, stable_sum(row.iter().copied()));
        for x in row.iter_mut() {
            *x *= r;
        }
        scalers.push(r);
    }
    scalers
}

/// Rescale every column of `m` onto `targets` in place.
///
/// Returns the multipliers that were applied, one per column.
///
/// # Panics
/// Panics if `targets.len() != m.ncols()`.
pub fn scale_cols(m: &mut Matrix, targets: &[f64]) -> Vec<f64> {
    assert_eq!(targets.len(), m.ncols(), "column target length mismatch");

    let mut scalers = Vec::with_capacity(targets.len());
    for (mut col, &target) in m.column_iter_mut().zip(targets) {
        let s = axis_scaler(target, stable_sum(col.iter().copied()));
        for x in col.iter_mut() {
            *x *= s;
        }
        scalers.push(s);
    }
    scalers
}
