// Analyzer module: moving average over closes and the cross-symbol merge.

pub mod combine;
pub mod moving_average;

pub use combine::combine;
pub use moving_average::{Analyzer, MovingAverageAnalyzer};
