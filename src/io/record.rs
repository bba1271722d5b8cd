//! Read/write run records as JSON.
//!
//! A run record is the portable representation of a balancing run:
//! - the labelled input targets
//! - the balanced matrix (row-major)
//! - convergence status and quality metrics

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{BalanceProblem, Matrix, RunResult, Termination};
use crate::error::AppError;
use crate::report::quality::{QualityMetrics, assess_quality};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub tool: String,
    pub problem: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub row_targets: Vec<f64>,
    pub col_targets: Vec<f64>,
    /// Balanced matrix, one inner vector per row.
    pub matrix: Vec<Vec<f64>>,
    pub converged: bool,
    pub iterations: usize,
    pub deviation: f64,
    pub termination: Termination,
    pub quality: QualityMetrics,
}

impl RunRecord {
    pub fn new(problem: &BalanceProblem, run: &RunResult) -> Self {
        Self {
            tool: "ras".to_string(),
            problem: problem.name.clone(),
            row_labels: problem.row_labels.clone(),
            col_labels: problem.col_labels.clone(),
            row_targets: problem.row_targets.clone(),
            col_targets: problem.col_targets.clone(),
            matrix: to_rows(&run.matrix),
            converged: run.converged,
            iterations: run.iterations,
            deviation: run.deviation,
            termination: run.termination,
            quality: assess_quality(&run.matrix, &problem.row_targets, &problem.col_targets),
        }
    }

    /// Rebuild the balanced matrix.
    pub fn to_matrix(&self) -> Result<Matrix, AppError> {
        let nrows = self.matrix.len();
        let ncols = self.matrix.first().map_or(self.col_labels.len(), Vec::len);
        if self.matrix.iter().any(|row| row.len() != ncols) {
            return Err(AppError::new(2, "Run record matrix rows have unequal lengths."));
        }
        let flat: Vec<f64> = self.matrix.iter().flatten().copied().collect();
        Ok(Matrix::from_row_slice(nrows, ncols, &flat))
    }
}

fn to_rows(m: &Matrix) -> Vec<Vec<f64>> {
    m.row_iter().map(|row| row.iter().copied().collect()).collect()
}

/// Write a run record JSON file.
pub fn write_run_json(path: &Path, record: &RunRecord) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create run JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, record)
        .map_err(|e| AppError::new(2, format!("Failed to write run JSON: {e}")))?;
    Ok(())
}

/// Write several run records as one JSON array.
pub fn write_series_json(path: &Path, records: &[RunRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create series JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, records)
        .map_err(|e| AppError::new(2, format!("Failed to write series JSON: {e}")))?;
    Ok(())
}

/// Read a run record JSON file.
pub fn read_run_json(path: &Path) -> Result<RunRecord, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open run JSON '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid run JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example_problem;
    use crate::domain::BalanceOptions;
    use crate::ras::balance;

    #[test]
    fn record_captures_status_and_quality() {
        let p = example_problem();
        let run = balance(&p.matrix, &p.row_targets, &p.col_targets, &BalanceOptions::default()).unwrap();
        let record = RunRecord::new(&p, &run);

        assert!(record.converged);
        assert_eq!(record.termination, Termination::Converged);
        assert_eq!(record.matrix.len(), 4);
        assert_eq!(record.matrix[0].len(), 4);
        assert!(record.quality.max_error() < 1e-6);
        assert_eq!(record.to_matrix().unwrap(), run.matrix);
    }

    #[test]
    fn json_file_reloads_identically() {
        let p = example_problem();
        let run = balance(&p.matrix, &p.row_targets, &p.col_targets, &BalanceOptions::default()).unwrap();
        let record = RunRecord::new(&p, &run);

        let path = std::env::temp_dir().join(format!("ras_record_{}.json", std::process::id()));
        write_run_json(&path, &record).unwrap();
        let loaded = read_run_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, record);
        let text = serde_json::to_string(&loaded).unwrap();
        assert!(text.contains("\"termination\":\"converged\""));
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let p = example_problem();
        let run = balance(&p.matrix, &p.row_targets, &p.col_targets, &BalanceOptions::default()).unwrap();
        let mut record = RunRecord::new(&p, &run);
        record.matrix[1].pop();
        assert!(record.to_matrix().is_err());
    }
}
