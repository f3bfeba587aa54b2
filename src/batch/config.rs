/// Batch configuration
use crate::error::{BundleError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RUNS: usize = 10;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of independent simulations
    pub runs: usize,

    /// Run `k` is seeded with `seed + k`
    pub seed: u64,

    /// Thickness of the wrap (tape, sleeve) around the bundle, added on both sides
    pub wrap_thickness: f64,

    /// Multiplier applied to the wrapped diameter
    pub tolerance_factor: f64,

    /// Spread runs over the rayon thread pool
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            seed: DEFAULT_SEED,
            wrap_thickness: 0.0,
            tolerance_factor: 1.0,
            parallel: true,
        }
    }
}

impl BatchConfig {
    pub fn run_seed(&self, run: usize) -> u64 {
        self.seed.wrapping_add(run as u64)
    }

    /// Wrapped and toleranced diameter for a raw bundle diameter.
    pub fn adjust(&self, diameter: f64) -> f64 {
        (diameter + 2.0 * self.wrap_thickness) * self.tolerance_factor
    }

    pub fn validate(&self) -> Result<()> {
        if !self.wrap_thickness.is_finite() || self.wrap_thickness < 0.0 {
            return Err(BundleError::InvalidParams(format!(
                "wrap_thickness must be finite and non-negative, got {}",
                self.wrap_thickness
            )));
        }
        if !self.tolerance_factor.is_finite() || self.tolerance_factor <= 0.0 {
            return Err(BundleError::InvalidParams(format!(
                "tolerance_factor must be finite and positive, got {}",
                self.tolerance_factor
            )));
        }
        Ok(())
    }
}
