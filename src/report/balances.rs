//! Sectoral financial balances (net lending / borrowing).
//!
//! A sector's balance is its financial assets minus its financial
//! liabilities. Assets are the row totals of the balanced holdings matrix.
//! Liabilities come either from an explicit liability matrix or, lacking
//! who-to-whom data, from a stylized allocation of total instrument issuance
//! across sectors.

use serde::{Deserialize, Serialize};

use crate::domain::Matrix;
use crate::error::AppError;
use crate::math::{col_sums, row_sums, stable_sum};

/// Stylized liability shares for HH, NFC, FC, Gov, ROW.
pub const DEFAULT_LIABILITY_SHARES: [f64; 5] = [0.1, 0.3, 0.3, 0.2, 0.1];

/// Where sector liabilities come from.
#[derive(Debug, Clone, Copy)]
pub enum Liabilities<'a> {
    /// Liability holdings, sectors × instruments.
    Matrix(&'a Matrix),
    /// Share of total issuance borne by each sector.
    Shares(&'a [f64]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorBalance {
    pub sector: String,
    pub assets: f64,
    pub liabilities: f64,
    /// Positive = net lender, negative = net borrower.
    pub net_position: f64,
}

/// Compute one balance per sector (row of `assets`).
pub fn sectoral_balances(
    assets: &Matrix,
    liabilities: Liabilities<'_>,
    sectors: &[String],
) -> Result<Vec<SectorBalance>, AppError> {
    let n = assets.nrows();
    if sectors.len() != n {
        return Err(AppError::new(
            2,
            format!("Expected {n} sector labels, got {}.", sectors.len()),
        ));
    }

    let asset_totals = row_sums(assets);
    let liability_totals = match liabilities {
        Liabilities::Matrix(l) => {
            if l.nrows() != n {
                return Err(AppError::new(
                    2,
                    format!("Liability matrix has {} sectors, expected {n}.", l.nrows()),
                ));
            }
            row_sums(l)
        }
        Liabilities::Shares(shares) => {
            if shares.len() != n {
                return Err(AppError::new(
                    2,
                    format!("Expected {n} liability shares, got {}.", shares.len()),
                ));
            }
            let issuance = stable_sum(col_sums(assets));
            shares.iter().map(|s| s * issuance).collect()
        }
    };

    Ok(sectors
        .iter()
        .zip(asset_totals.into_iter().zip(liability_totals))
        .map(|(sector, (assets, liabilities))| SectorBalance {
            sector: sector.clone(),
            assets,
            liabilities,
            net_position: assets - liabilities,
        })
        .collect())
}
