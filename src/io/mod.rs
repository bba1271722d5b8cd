//! Input/output helpers.
//!
//! - CSV ingest of balancing problems (`ingest`)
//! - balanced matrix export to CSV (`export`)
//! - run record JSON read/write (`record`)

pub mod export;
pub mod ingest;
pub mod record;

pub use export::*;
pub use ingest::*;
pub use record::*;
