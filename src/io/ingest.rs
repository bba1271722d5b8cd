//! CSV ingest of a balancing problem.
//!
//! Layout (one file holds the interior and both sets of totals):
//!
//! ```text
//! label,Cash,Bonds,Shares,target
//! HH,150,50,200,1000
//! Corp,100,100,100,500
//! target,400,600,500,
//! ```
//!
//! - the header names the columns; its first cell is free text and its last
//!   cell must be `target`
//! - each body row is a row label, the interior values, and the row target
//! - exactly one row labelled `target` carries the column targets (its last
//!   cell is ignored)
//! - `total` is accepted wherever `target` is, so a balanced-matrix export
//!   reads back as a problem whose targets are its achieved totals
//!
//! Value checks (negatives, NaN) are left to the balancing core so the same
//! rules apply to every input path.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{BalanceProblem, Matrix};
use crate::error::AppError;

const TOTALS_LABELS: [&str; 2] = ["target", "total"];

/// Load a problem from a CSV file; the problem is named after the file stem.
pub fn load_problem(path: &Path) -> Result<BalanceProblem, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    read_problem(file, &name)
}

/// Parse a problem from any CSV reader.
pub fn read_problem<R: Read>(input: R, name: &str) -> Result<BalanceProblem, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let width = headers.len();
    if width < 2 || !is_totals_label(&headers[width - 1]) {
        return Err(AppError::new(
            2,
            "CSV header must be `label,<columns...>,target`.",
        ));
    }
    let col_labels: Vec<String> = headers.iter().skip(1).take(width - 2).map(str::to_string).collect();
    let ncols = col_labels.len();

    let mut row_labels = Vec::new();
    let mut values = Vec::new();
    let mut row_targets = Vec::new();
    let mut col_targets: Option<Vec<f64>> = None;

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Line {line}: CSV parse error: {e}")))?;

        if record.len() != width {
            return Err(AppError::new(
                2,
                format!("Line {line}: expected {width} fields, found {}.", record.len()),
            ));
        }

        let label = &record[0];
        if is_totals_label(label) {
            if col_targets.is_some() {
                return Err(AppError::new(2, format!("Line {line}: duplicate `{label}` row.")));
            }
            col_targets = Some(parse_cells(&record, 1..=ncols, &headers, line)?);
            continue;
        }

        values.extend(parse_cells(&record, 1..=ncols, &headers, line)?);
        row_targets.push(parse_value(&record, width - 1, &headers, line)?);
        row_labels.push(label.to_string());
    }

    let col_targets =
        col_targets.ok_or_else(|| AppError::new(2, "CSV has no `target` row with column totals (`total` is also accepted)."))?;

    Ok(BalanceProblem {
        name: name.to_string(),
        matrix: Matrix::from_row_slice(row_labels.len(), ncols, &values),
        row_labels,
        col_labels,
        row_targets,
        col_targets,
    })
}

fn is_totals_label(s: &str) -> bool {
    TOTALS_LABELS.iter().any(|l| s.eq_ignore_ascii_case(l))
}

fn parse_cells(
    record: &StringRecord,
    range: std::ops::RangeInclusive<usize>,
    headers: &StringRecord,
    line: usize,
) -> Result<Vec<f64>, AppError> {
    range.map(|i| parse_value(record, i, headers, line)).collect()
}

fn parse_value(record: &StringRecord, i: usize, headers: &StringRecord, line: usize) -> Result<f64, AppError> {
    let raw = &record[i];
    raw.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!("Line {line}, column '{}': cannot parse '{raw}' as a number.", &headers[i]),
        )
    })
}
