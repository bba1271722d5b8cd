//! Numerical utilities: compensated summation and matrix marginals.

pub mod summation;

pub use summation::*;
