//! Quarterly series of simulated flow-of-funds tables.
//!
//! Each quarter is an independent balancing problem. The economy grows at a
//! constant quarterly rate with a weak seasonal swing on top, and every
//! quarter gets fresh measurement error from the shared generator.

use std::f64::consts::PI;

use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;

use crate::data::sample::{SimulatedData, SimulationParams, simulate_fof};
use crate::domain::BalanceProblem;
use crate::error::AppError;

/// Amplitude of the seasonal factor `1 + A sin(2πq/4)`.
const SEASONAL_AMPLITUDE: f64 = 0.03;

/// Measurement error level used for every quarter.
const QUARTER_NOISE_LEVEL: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesParams {
    pub n_quarters: usize,
    /// Scale of the first quarter (before seasonality).
    pub scale: f64,
    /// Compounding growth per quarter (`0.02` = 2%).
    pub growth_rate: f64,
    /// First day of the first quarter.
    pub start: NaiveDate,
}

impl Default for SeriesParams {
    fn default() -> Self {
        Self {
            n_quarters: 8,
            scale: 1000.0,
            growth_rate: 0.02,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }
}

/// One quarter of simulated data.
#[derive(Debug, Clone)]
pub struct QuarterData {
    pub period_start: NaiveDate,
    /// e.g. `2024Q3`.
    pub label: String,
    /// Scale after growth and seasonality.
    pub scale: f64,
    pub data: SimulatedData,
}

impl QuarterData {
    pub fn to_problem(&self) -> BalanceProblem {
        self.data.to_problem(self.label.clone())
    }
}

/// Seasonal multiplier for the `q`-th quarter of the series.
pub fn seasonal_factor(q: usize) -> f64 {
    1.0 + SEASONAL_AMPLITUDE * (2.0 * PI * q as f64 / 4.0).sin()
}

/// Calendar label for the quarter containing `date`.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}Q{}", date.year(), date.month0() / 3 + 1)
}

/// Generate `n_quarters` simulated quarters.
pub fn generate_quarterly_series<R: Rng + ?Sized>(
    rng: &mut R,
    params: &SeriesParams,
) -> Result<Vec<QuarterData>, AppError> {
    if params.n_quarters == 0 {
        return Err(AppError::new(2, "Number of quarters must be > 0."));
    }
    if !(params.growth_rate.is_finite() && params.growth_rate > -1.0) {
        return Err(AppError::new(2, "Growth rate must be finite and > -1."));
    }

    let mut series = Vec::with_capacity(params.n_quarters);
    let mut current_scale = params.scale;

    for q in 0..params.n_quarters {
        let scale = current_scale * seasonal_factor(q);
        let data = simulate_fof(
            rng,
            &SimulationParams {
                scale,
                noise_level: QUARTER_NOISE_LEVEL,
            },
        )?;

        let months = u32::try_from(q * 3)
            .map_err(|_| AppError::new(2, "Series is too long to date."))?;
        let period_start = params
            .start
            .checked_add_months(Months::new(months))
            .ok_or_else(|| AppError::new(2, "Series runs past the supported date range."))?;

        series.push(QuarterData {
            period_start,
            label: quarter_label(period_start),
            scale,
            data,
        });

        current_scale *= 1.0 + params.growth_rate;
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seasonal_factor_cycles_yearly() {
        assert_relative_eq!(seasonal_factor(0), 1.0);
        assert_relative_eq!(seasonal_factor(1), 1.03, max_relative = 1e-12);
        assert_relative_eq!(seasonal_factor(3), 0.97, max_relative = 1e-12);
        assert_relative_eq!(seasonal_factor(5), seasonal_factor(1), max_relative = 1e-12);
    }

    #[test]
    fn quarters_are_labelled_and_grow() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = SeriesParams {
            n_quarters: 6,
            start: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            ..SeriesParams::default()
        };
        let series = generate_quarterly_series(&mut rng, &params).unwrap();

        let labels: Vec<&str> = series.iter().map(|q| q.label.as_str()).collect();
        assert_eq!(labels, vec!["2023Q3", "2023Q4", "2024Q1", "2024Q2", "2024Q3", "2024Q4"]);

        // Quarters 0 and 4 share a seasonal phase, so only growth separates them.
        assert_relative_eq!(series[4].scale, series[0].scale * 1.02_f64.powi(4), max_relative = 1e-12);

        let total_0: f64 = series[0].data.row_targets.iter().sum();
        assert_relative_eq!(total_0, 3050.0, max_relative = 1e-12);
    }

    #[test]
    fn quarters_draw_fresh_noise() {
        let mut rng = StdRng::seed_from_u64(9);
        let params = SeriesParams {
            n_quarters: 2,
            growth_rate: 0.0,
            ..SeriesParams::default()
        };
        let series = generate_quarterly_series(&mut rng, &params).unwrap();
        // Different seasonal scale and different draws.
        assert_ne!(series[0].data.noisy, series[1].data.noisy);
    }

    #[test]
    fn empty_series_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = SeriesParams {
            n_quarters: 0,
            ..SeriesParams::default()
        };
        assert!(generate_quarterly_series(&mut rng, &params).is_err());
    }
}
