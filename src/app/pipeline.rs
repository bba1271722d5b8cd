//! Shared "balance pipeline" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! problem -> balance -> quality -> exports
//!
//! The subcommand handlers can then focus on presentation.

use tracing::info;

use crate::domain::{BalanceConfig, BalanceProblem, RunResult};
use crate::error::{AppError, BalanceError};
use crate::io::{RunRecord, write_matrix_csv, write_run_json, write_series_csv, write_series_json};
use crate::ras::{balance, balance_all};
use crate::report::{QualityMetrics, assess_quality};

/// All computed outputs of a single balancing run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub problem: BalanceProblem,
    pub run: RunResult,
    pub quality: QualityMetrics,
}

/// Outputs of a batch run, in input order.
#[derive(Debug, Clone)]
pub struct SeriesOutput {
    pub problems: Vec<BalanceProblem>,
    pub results: Vec<Result<RunResult, BalanceError>>,
}

impl SeriesOutput {
    pub fn all_converged(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.as_ref().is_ok_and(|run| run.converged))
    }
}

/// Balance one problem, grade it, and write any requested exports.
pub fn run_balance(problem: BalanceProblem, config: &BalanceConfig) -> Result<RunOutput, AppError> {
    let run = balance(
        &problem.matrix,
        &problem.row_targets,
        &problem.col_targets,
        &config.options(),
    )?;
    let quality = assess_quality(&run.matrix, &problem.row_targets, &problem.col_targets);

    if let Some(path) = &config.export_csv {
        write_matrix_csv(path, &problem, &run.matrix)?;
        info!(path = %path.display(), "wrote balanced matrix CSV");
    }
    if let Some(path) = &config.export_json {
        write_run_json(path, &RunRecord::new(&problem, &run))?;
        info!(path = %path.display(), "wrote run JSON");
    }

    Ok(RunOutput {
        problem,
        run,
        quality,
    })
}

/// Balance independent problems in parallel and write any requested exports.
///
/// Per-problem validation failures are kept in `results`; they do not abort
/// the other runs.
pub fn run_series(problems: Vec<BalanceProblem>, config: &BalanceConfig) -> Result<SeriesOutput, AppError> {
    let results = balance_all(&problems, &config.options());
    let output = SeriesOutput { problems, results };

    if let Some(path) = &config.export_csv {
        write_series_csv(path, &output.problems, &output.results)?;
        info!(path = %path.display(), "wrote series summary CSV");
    }
    if let Some(path) = &config.export_json {
        let records: Vec<RunRecord> = output
            .problems
            .iter()
            .zip(&output.results)
            .filter_map(|(p, r)| r.as_ref().ok().map(|run| RunRecord::new(p, run)))
            .collect();
        write_series_json(path, &records)?;
        info!(path = %path.display(), count = records.len(), "wrote series JSON");
    }

    Ok(output)
}

/// Turn a non-converged outcome into exit code 3 when the config asks for it.
pub fn enforce_convergence(converged: bool, config: &BalanceConfig) -> Result<(), AppError> {
    if config.require_convergence && !converged {
        return Err(AppError::new(
            3,
            "Balancing did not converge within the iteration budget.",
        ));
    }
    Ok(())
}
