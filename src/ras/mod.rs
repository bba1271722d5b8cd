//! Bi-proportional matrix balancing (RAS / iterative proportional fitting).
//!
//! Responsibilities:
//!
//! - rescale rows, then columns, onto their target totals (`scaler`)
//! - measure aggregate marginal deviation against tolerance (`convergence`)
//! - validate inputs and drive the iteration to a terminal state (`controller`)
//! - balance independent problems in parallel (`batch`)

pub mod batch;
pub mod controller;
pub mod convergence;
pub mod scaler;

pub use batch::*;
pub use controller::*;
pub use convergence::*;
pub use scaler::*;
