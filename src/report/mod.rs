//! Reporting utilities: quality metrics, sectoral balances, and formatted
//! terminal output.

pub mod balances;
pub mod format;
pub mod quality;

pub use balances::*;
pub use format::*;
pub use quality::*;
