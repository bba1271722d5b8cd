//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - passed between the balancing core and its collaborators
//! - exported to JSON/CSV
//! - built from CLI flags or constructed directly in tests

use std::path::PathBuf;
use std::time::Duration;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Dense matrix of non-negative observations (rows × columns).
pub type Matrix = DMatrix<f64>;

/// Default aggregate marginal deviation accepted as balanced.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default bound on full row+column iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// What to do when the row targets and column targets disagree on the grand total.
///
/// With inconsistent totals no matrix can satisfy both marginals, so a run
/// will exhaust its iterations without converging.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "policy")]
pub enum GrandTotalPolicy {
    /// Accept any totals and report non-convergence if they cannot be met.
    #[default]
    Permissive,
    /// Reject the call up front when `|Σr − Σc| > relative_tolerance · max(Σr, Σc)`.
    Strict { relative_tolerance: f64 },
}

/// Knobs for a single balancing run.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceOptions {
    /// Threshold on `Σ|rowsum − r| + Σ|colsum − c|`.
    pub tolerance: f64,
    /// Upper bound on full iterations. Zero is valid.
    pub max_iterations: usize,
    /// Evaluate the untouched input before the first iteration.
    pub precheck: bool,
    pub grand_total: GrandTotalPolicy,
    /// Wall-clock budget, checked between iterations only.
    pub time_budget: Option<Duration>,
}

impl Default for BalanceOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            precheck: false,
            grand_total: GrandTotalPolicy::Permissive,
            time_budget: None,
        }
    }
}

impl BalanceOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_precheck(mut self, precheck: bool) -> Self {
        self.precheck = precheck;
        self
    }

    pub fn with_grand_total(mut self, policy: GrandTotalPolicy) -> Self {
        self.grand_total = policy;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Aggregate deviation fell below tolerance.
    Converged,
    /// `max_iterations` full iterations ran without meeting tolerance.
    MaxIterationsExceeded,
    /// A caller budget stopped the run at an iteration boundary.
    Interrupted,
}

impl Termination {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::MaxIterationsExceeded => "max iterations reached",
            Termination::Interrupted => "interrupted",
        }
    }
}

/// Output of a balancing run.
///
/// `converged` must be checked before trusting the marginals of `matrix`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub matrix: Matrix,
    pub converged: bool,
    /// Number of completed row+column iterations.
    pub iterations: usize,
    /// Aggregate marginal deviation of `matrix`.
    pub deviation: f64,
    pub termination: Termination,
}

/// Snapshot handed to stop predicates between iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationProgress {
    /// Completed iterations so far (>= 1).
    pub iteration: usize,
    pub deviation: f64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

/// A row or column that sums to zero but carries a nonzero target.
///
/// Proportional scaling can never give such an axis mass, so a run containing
/// one cannot converge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegenerateAxis {
    pub axis: Axis,
    pub index: usize,
    pub target: f64,
}

/// A labelled balancing problem: interior estimates plus trusted marginals.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceProblem {
    pub name: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub matrix: Matrix,
    pub row_targets: Vec<f64>,
    pub col_targets: Vec<f64>,
}

impl BalanceProblem {
    /// Build a problem with generic `r1..`/`c1..` labels.
    pub fn unlabelled(
        name: impl Into<String>,
        matrix: Matrix,
        row_targets: Vec<f64>,
        col_targets: Vec<f64>,
    ) -> Self {
        let row_labels = (1..=matrix.nrows()).map(|i| format!("r{i}")).collect();
        let col_labels = (1..=matrix.ncols()).map(|j| format!("c{j}")).collect();
        Self {
            name: name.into(),
            row_labels,
            col_labels,
            matrix,
            row_targets,
            col_targets,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct BalanceConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub precheck: bool,
    /// Relative tolerance for the strict grand-total check (`None` = permissive).
    pub strict_grand_total: Option<f64>,
    pub time_budget_ms: Option<u64>,
    /// Treat a non-converged run as a failure (exit code 3).
    pub require_convergence: bool,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            precheck: false,
            strict_grand_total: None,
            time_budget_ms: None,
            require_convergence: false,
            export_csv: None,
            export_json: None,
        }
    }
}

impl BalanceConfig {
    /// Resolve the core options for this configuration.
    pub fn options(&self) -> BalanceOptions {
        let grand_total = match self.strict_grand_total {
            Some(relative_tolerance) => GrandTotalPolicy::Strict { relative_tolerance },
            None => GrandTotalPolicy::Permissive,
        };
        BalanceOptions {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            precheck: self.precheck,
            grand_total,
            time_budget: self.time_budget_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_documented_defaults() {
        let opts = BalanceOptions::default();
        assert_eq!(opts.tolerance, 1e-6);
        assert_eq!(opts.max_iterations, 1000);
        assert!(!opts.precheck);
        assert_eq!(opts.grand_total, GrandTotalPolicy::Permissive);
        assert!(opts.time_budget.is_none());
    }

    #[test]
    fn config_resolves_strict_policy_and_budget() {
        let config = BalanceConfig {
            strict_grand_total: Some(1e-9),
            time_budget_ms: Some(250),
            ..BalanceConfig::default()
        };
        let opts = config.options();
        assert_eq!(
            opts.grand_total,
            GrandTotalPolicy::Strict {
                relative_tolerance: 1e-9
            }
        );
        assert_eq!(opts.time_budget, Some(Duration::from_millis(250)));
    }

    #[test]
    fn unlabelled_problem_gets_generic_labels() {
        let p = BalanceProblem::unlabelled("p", Matrix::zeros(2, 3), vec![0.0; 2], vec![0.0; 3]);
        assert_eq!(p.row_labels, vec!["r1", "r2"]);
        assert_eq!(p.col_labels, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn termination_serializes_snake_case() {
        let s = serde_json::to_string(&Termination::MaxIterationsExceeded).unwrap();
        assert_eq!(s, "\"max_iterations_exceeded\"");
    }
}
