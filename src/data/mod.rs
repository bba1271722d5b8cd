//! Input data for balancing runs: labels, simulated flow-of-funds tables,
//! quarterly series, and the worked example.

pub mod example;
pub mod labels;
pub mod sample;
pub mod series;

pub use example::*;
pub use labels::*;
pub use sample::*;
pub use series::*;
