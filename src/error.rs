//! Error types.
//!
//! - `BalanceError` is the typed failure surface of the balancing core. Every
//!   variant is raised before the first iteration.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Validation failures of a balancing call.
///
/// Non-convergence is not an error; it is reported through `RunResult`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    /// Matrix dimensions disagree with the target vector lengths.
    #[error(
        "shape mismatch: matrix is {rows}x{cols}, but got {row_targets} row targets and {col_targets} column targets"
    )]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        row_targets: usize,
        col_targets: usize,
    },

    /// Negative or non-finite data, or an unusable tolerance.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Row and column targets disagree on the grand total (strict policy only).
    #[error(
        "grand total mismatch: row targets sum to {row_total}, column targets sum to {col_total}"
    )]
    GrandTotalMismatch { row_total: f64, col_total: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_error_maps_to_input_exit_code() {
        let err: AppError = BalanceError::InvalidInput("tolerance must be > 0".into()).into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "invalid input: tolerance must be > 0");
    }

    #[test]
    fn shape_mismatch_message_names_all_dimensions() {
        let err = BalanceError::ShapeMismatch {
            rows: 2,
            cols: 3,
            row_targets: 2,
            col_targets: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("2x3"), "{msg}");
        assert!(msg.contains("4 column targets"), "{msg}");
    }
}
