//! Compensated summation and matrix marginals.
//!
//! Marginal sums are recomputed several times per iteration and compared
//! against targets at `1e-6`-scale tolerances, so plain left-to-right
//! summation is not good enough for wide rows with mixed magnitudes.
//!
//! We use Neumaier's variant of Kahan summation: it keeps a running
//! compensation term and, unlike classic Kahan, stays exact when a summand is
//! larger in magnitude than the running total.

use nalgebra::DMatrix;

/// Sum a sequence of values with Neumaier compensation.
///
/// If the running total overflows, the result is that infinity rather than
/// the NaN the compensation term would produce.
pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0_f64;
    let mut comp = 0.0_f64;

    for v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            comp += (sum - t) + v;
        } else {
            comp += (v - t) + sum;
        }
        sum = t;
    }

    if sum.is_finite() { sum + comp } else { sum }
}

/// Row sums of `m` (length = `m.nrows()`).
pub fn row_sums(m: &DMatrix<f64>) -> Vec<f64> {
    m.row_iter().map(|row| stable_sum(row.iter().copied())).collect()
}

/// Column sums of `m` (length = `m.ncols()`).
pub fn col_sums(m: &DMatrix<f64>) -> Vec<f64> {
    m.column_iter()
        .map(|col| stable_sum(col.iter().copied()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_sum_recovers_cancelled_small_terms() {
        // Naive summation loses the two 1.0 terms entirely.
        let values = [1.0, 1e100, 1.0, -1e100];
        assert_eq!(stable_sum(values), 2.0);
    }

    #[test]
    fn stable_sum_overflow_saturates_instead_of_nan() {
        assert_eq!(stable_sum([1e308, 1e308]), f64::INFINITY);
        assert_eq!(stable_sum([-1e308, -1e308]), f64::NEG_INFINITY);
        assert_eq!(row_sums(&DMatrix::from_row_slice(1, 2, &[1e308, 1e308])), vec![f64::INFINITY]);
    }

    #[test]
    fn stable_sum_of_nothing_is_zero() {
        assert_eq!(stable_sum(std::iter::empty()), 0.0);
    }

    #[test]
    fn marginals_follow_row_major_layout() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(row_sums(&m), vec![6.0, 15.0]);
        assert_eq!(col_sums(&m), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn marginals_of_empty_matrix() {
        let m = DMatrix::<f64>::zeros(0, 3);
        assert!(row_sums(&m).is_empty());
        assert_eq!(col_sums(&m), vec![0.0, 0.0, 0.0]);
    }
}
