//! Iteration controller: validation, the row → column → evaluate loop, and
//! the termination decision.
//!
//! A run moves through these states:
//!
//! ```text
//! validate ──(error)──> BalanceError, nothing touched
//!    │
//!    ▼
//! iterate: scale rows, scale columns, evaluate
//!    ├── deviation < tolerance ───────────────> Converged
//!    ├── iteration == max_iterations ─────────> MaxIterationsExceeded
//!    └── stop predicate / time budget fired ──> Interrupted
//! ```
//!
//! Each iteration is applied in full before any termination check, so a
//! caller never observes a half-scaled matrix. The caller's matrix is never
//! mutated; the loop works on a private copy.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::domain::{
    BalanceOptions, GrandTotalPolicy, IterationProgress, Matrix, RunResult, Termination,
};
use crate::error::BalanceError;
use crate::math::stable_sum;
use crate::ras::convergence::{degenerate_axes, is_within_tolerance, marginal_deviation};
use crate::ras::scaler::{scale_cols, scale_rows};

/// Balance `matrix` onto the given row and column totals.
///
/// Returns a validation error before doing any work if the inputs are
/// malformed. Otherwise always returns a `RunResult`; check
/// `RunResult::converged` before trusting its marginals.
pub fn balance(
    matrix: &Matrix,
    row_targets: &[f64],
    col_targets: &[f64],
    options: &BalanceOptions,
) -> Result<RunResult, BalanceError> {
    balance_with(matrix, row_targets, col_targets, options, |_| false)
}

/// Like [`balance`], with a caller-supplied stop predicate.
///
/// `stop` is consulted after every completed iteration that did not converge
/// (and is not the last one). Returning `true` ends the run with
/// `Termination::Interrupted`.
pub fn balance_with<F>(
    matrix: &Matrix,
    row_targets: &[f64],
    col_targets: &[f64],
    options: &BalanceOptions,
    mut stop: F,
) -> Result<RunResult, BalanceError>
where
    F: FnMut(&IterationProgress) -> bool,
{
    validate(matrix, row_targets, col_targets, options)?;

    let started = Instant::now();
    let mut working = matrix.clone();

    let degenerate = degenerate_axes(&working, row_targets, col_targets);
    if !degenerate.is_empty() {
        debug!(
            count = degenerate.len(),
            "zero-sum axes with nonzero targets; these targets are unreachable"
        );
    }

    if options.precheck || options.max_iterations == 0 {
        let deviation = marginal_deviation(&working, row_targets, col_targets);
        if is_within_tolerance(deviation, options.tolerance) {
            info!(deviation, "input already balanced; no iterations needed");
            return Ok(finish(working, 0, deviation, Termination::Converged));
        }
        if options.max_iterations == 0 {
            warn!(deviation, "max_iterations is 0; returning input unbalanced");
            return Ok(finish(working, 0, deviation, Termination::MaxIterationsExceeded));
        }
    }

    let mut iteration = 0;
    loop {
        scale_rows(&mut working, row_targets);
        scale_cols(&mut working, col_targets);
        iteration += 1;

        let deviation = marginal_deviation(&working, row_targets, col_targets);
        debug!(iteration, deviation, "RAS iteration");

        if is_within_tolerance(deviation, options.tolerance) {
            info!(iterations = iteration, deviation, "RAS converged");
            return Ok(finish(working, iteration, deviation, Termination::Converged));
        }

        if iteration >= options.max_iterations {
            warn!(
                iterations = iteration,
                deviation,
                tolerance = options.tolerance,
                "RAS reached max iterations without converging"
            );
            return Ok(finish(
                working,
                iteration,
                deviation,
                Termination::MaxIterationsExceeded,
            ));
        }

        let progress = IterationProgress {
            iteration,
            deviation,
            elapsed: started.elapsed(),
        };
        if over_budget(options.time_budget, &progress) || stop(&progress) {
            warn!(iterations = iteration, deviation, "RAS interrupted");
            return Ok(finish(working, iteration, deviation, Termination::Interrupted));
        }
    }
}

fn finish(matrix: Matrix, iterations: usize, deviation: f64, termination: Termination) -> RunResult {
    RunResult {
        matrix,
        converged: termination == Termination::Converged,
        iterations,
        deviation,
        termination,
    }
}

fn over_budget(budget: Option<Duration>, progress: &IterationProgress) -> bool {
    budget.is_some_and(|b| progress.elapsed >= b)
}

/// Check shapes, value domains, tolerance, and the grand-total policy.
pub fn validate(
    matrix: &Matrix,
    row_targets: &[f64],
    col_targets: &[f64],
    options: &BalanceOptions,
) -> Result<(), BalanceError> {
    if matrix.nrows() != row_targets.len() || matrix.ncols() != col_targets.len() {
        return Err(BalanceError::ShapeMismatch {
            rows: matrix.nrows(),
            cols: matrix.ncols(),
            row_targets: row_targets.len(),
            col_targets: col_targets.len(),
        });
    }

    if !(options.tolerance.is_finite() && options.tolerance > 0.0) {
        return Err(BalanceError::InvalidInput(format!(
            "tolerance must be finite and > 0, got {}",
            options.tolerance
        )));
    }

    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            let v = matrix[(i, j)];
            if !is_valid_amount(v) {
                return Err(BalanceError::InvalidInput(format!(
                    "matrix entry ({i}, {j}) must be finite and >= 0, got {v}"
                )));
            }
        }
    }
    check_targets("row", row_targets)?;
    check_targets("column", col_targets)?;

    if let GrandTotalPolicy::Strict { relative_tolerance } = options.grand_total {
        if !(relative_tolerance.is_finite() && relative_tolerance >= 0.0) {
            return Err(BalanceError::InvalidInput(format!(
                "grand-total relative tolerance must be finite and >= 0, got {relative_tolerance}"
            )));
        }
        let row_total = stable_sum(row_targets.iter().copied());
        let col_total = stable_sum(col_targets.iter().copied());
        if (row_total - col_total).abs() > relative_tolerance * row_total.max(col_total) {
            return Err(BalanceError::GrandTotalMismatch {
                row_total,
                col_total,
            });
        }
    }

    Ok(())
}

fn check_targets(kind: &str, targets: &[f64]) -> Result<(), BalanceError> {
    match targets.iter().position(|&v| !is_valid_amount(v)) {
        Some(idx) => Err(BalanceError::InvalidInput(format!(
            "{kind} target {idx} must be finite and >= 0, got {}",
            targets[idx]
        ))),
        None => Ok(()),
    }
}

fn is_valid_amount(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}
