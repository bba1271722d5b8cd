//! Worked example: a household/corporate/government/non-resident balance
//! sheet whose survey interior badly under-reports household assets.

use crate::data::labels::to_owned_labels;
use crate::domain::{BalanceProblem, Matrix};

/// The 4×4 reference problem (interior sums to 1530 against totals of 2000).
pub fn example_problem() -> BalanceProblem {
    #[rustfmt::skip]
    let matrix = Matrix::from_row_slice(4, 4, &[
        150.0,  50.0, 200.0, 300.0, // HH: sums to 700 against a target of 1000
        100.0, 100.0, 100.0,  50.0,
         50.0, 200.0,  50.0,   0.0,
         20.0, 100.0,  50.0,  10.0,
    ]);

    BalanceProblem {
        name: "example".to_string(),
        row_labels: to_owned_labels(&["HH", "Corp", "Gov", "ROW"]),
        col_labels: to_owned_labels(&["Cash", "Bonds", "Shares", "Mtgs"]),
        matrix,
        row_targets: vec![1000.0, 500.0, 300.0, 200.0],
        col_targets: vec![400.0, 600.0, 500.0, 500.0],
    }
}
