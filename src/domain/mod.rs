//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run options and policies (`BalanceOptions`, `GrandTotalPolicy`)
//! - run outputs (`RunResult`, `Termination`, `DegenerateAxis`)
//! - labelled inputs (`BalanceProblem`) and CLI-derived `BalanceConfig`

pub mod types;

pub use types::*;
