//! `ras-balance` library crate.
//!
//! The binary (`ras`) is a thin wrapper around this library so that:
//!
//! - the balancing core is testable without spawning processes
//! - `ras::balance` can be embedded in other tools (batch jobs, notebooks, services)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod ras;
pub mod report;
