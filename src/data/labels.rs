//! Default sector and instrument labels for flow-of-funds tables.
//!
//! Rows are institutional sectors, columns are financial instruments, in the
//! order used by the simulated national balance sheet.

/// Institutional sectors (row axis).
pub const SECTORS: [&str; 5] = [
    "Households",
    "Non-Financial Corporations",
    "Financial Corporations",
    "Government",
    "Non-Residents",
];

/// Short sector names for tables.
pub const SECTORS_SHORT: [&str; 5] = ["HH", "NFC", "FC", "Gov", "ROW"];

/// Financial instruments (column axis).
pub const INSTRUMENTS: [&str; 6] = [
    "Currency and Deposits",
    "Debt Securities",
    "Equity and Investment Fund Shares",
    "Loans",
    "Life Insurance and Pensions",
    "Other Accounts",
];

/// Short instrument names for tables.
pub const INSTRUMENTS_SHORT: [&str; 6] = ["Cash", "Bonds", "Equity", "Loans", "Pensions", "Other"];

pub fn to_owned_labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}
