//! Export a balanced matrix to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: the same row/column layout as the input, with achieved totals in
//! place of the targets.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{BalanceProblem, Matrix, RunResult};
use crate::error::{AppError, BalanceError};
use crate::math::{col_sums, row_sums, stable_sum};

/// Write `matrix` with the problem's labels to a CSV file.
pub fn write_matrix_csv(path: &Path, problem: &BalanceProblem, matrix: &Matrix) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    write_matrix(file, problem, matrix)
}

/// Write `matrix` as CSV to any writer.
pub fn write_matrix<W: Write>(out: W, problem: &BalanceProblem, matrix: &Matrix) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let map_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV: {e}"));

    let mut header = vec!["label".to_string()];
    header.extend(problem.col_labels.iter().cloned());
    header.push("total".to_string());
    writer.write_record(&header).map_err(map_err)?;

    let rows = row_sums(matrix);
    for (i, total) in rows.iter().enumerate() {
        let mut record = vec![problem.row_labels.get(i).cloned().unwrap_or_default()];
        record.extend(matrix.row(i).iter().map(|v| v.to_string()));
        record.push(total.to_string());
        writer.write_record(&record).map_err(map_err)?;
    }

    let mut record = vec!["total".to_string()];
    record.extend(col_sums(matrix).iter().map(|v| v.to_string()));
    record.push(stable_sum(rows).to_string());
    writer.write_record(&record).map_err(map_err)?;

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write one summary row per series problem.
///
/// Problems that failed validation are kept with an `error` status and blank
/// numeric fields.
pub fn write_series_csv(
    path: &Path,
    problems: &[BalanceProblem],
    results: &[Result<RunResult, BalanceError>],
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create series CSV '{}': {e}", path.display()))
    })?;
    write_series(file, problems, results)
}

pub fn write_series<W: Write>(
    out: W,
    problems: &[BalanceProblem],
    results: &[Result<RunResult, BalanceError>],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let map_err = |e: csv::Error| AppError::new(2, format!("Failed to write series CSV: {e}"));

    writer
        .write_record(["problem", "target_total", "balanced_total", "iterations", "deviation", "status"])
        .map_err(map_err)?;

    for (problem, result) in problems.iter().zip(results) {
        let target_total = stable_sum(problem.row_targets.iter().copied());
        let record = match result {
            Ok(run) => [
                problem.name.clone(),
                target_total.to_string(),
                stable_sum(row_sums(&run.matrix)).to_string(),
                run.iterations.to_string(),
                run.deviation.to_string(),
                run.termination.display_name().to_string(),
            ],
            Err(_) => [
                problem.name.clone(),
                target_total.to_string(),
                String::new(),
                String::new(),
                String::new(),
                "error".to_string(),
            ],
        };
        writer.write_record(&record).map_err(map_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush series CSV: {e}")))?;
    Ok(())
}
