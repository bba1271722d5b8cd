//! Balancing many independent problems (e.g. a quarterly series).
//!
//! Runs share nothing mutable: each call clones its own working matrix, so
//! the problems are balanced in parallel with rayon. Results come back in
//! input order.

use rayon::prelude::*;

use crate::domain::{BalanceOptions, BalanceProblem, RunResult};
use crate::error::BalanceError;
use crate::ras::controller::balance;

/// Balance every problem with the same options.
pub fn balance_all(
    problems: &[BalanceProblem],
    options: &BalanceOptions,
) -> Vec<Result<RunResult, BalanceError>> {
    problems
        .par_iter()
        .map(|p| balance(&p.matrix, &p.row_targets, &p.col_targets, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example_problem;
    use crate::domain::{Matrix, Termination};

    #[test]
    fn batch_matches_sequential_runs_in_order() {
        let base = example_problem();
        let problems: Vec<BalanceProblem> = (1..=6)
            .map(|k| {
                let k = k as f64;
                BalanceProblem {
                    name: format!("k{k}"),
                    matrix: &base.matrix * k,
                    row_targets: base.row_targets.iter().map(|v| v * k).collect(),
                    col_targets: base.col_targets.iter().map(|v| v * k).collect(),
                    ..base.clone()
                }
            })
            .collect();

        let options = BalanceOptions::default();
        let results = balance_all(&problems, &options);
        assert_eq!(results.len(), problems.len());

        for (p, r) in problems.iter().zip(&results) {
            let expected = balance(&p.matrix, &p.row_targets, &p.col_targets, &options).unwrap();
            let got = r.as_ref().unwrap();
            assert_eq!(got, &expected, "problem {}", p.name);
        }
    }

    #[test]
    fn one_bad_problem_does_not_affect_the_others() {
        let good = example_problem();
        let bad = BalanceProblem::unlabelled("bad", Matrix::zeros(2, 2), vec![1.0], vec![1.0, 1.0]);

        let results = balance_all(&[good, bad], &BalanceOptions::default());
        assert_eq!(results[0].as_ref().unwrap().termination, Termination::Converged);
        assert!(matches!(results[1], Err(BalanceError::ShapeMismatch { .. })));
    }
}
