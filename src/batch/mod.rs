/// Monte-Carlo batch runs over the packing kernel
///
/// This module provides functionality to:
/// - Repeat a single packing simulation with per-run seeds
/// - Run the repetitions in parallel without changing the outcome
/// - Aggregate min/max/average bundle diameters
/// - Apply a wrap-thickness offset and a manufacturing tolerance

pub mod config;
pub mod runner;

pub use config::BatchConfig;
pub use runner::{run_batch, BatchSummary, DiameterStats};
