// Batch runner: repeated packing simulations and diameter statistics

use super::config::BatchConfig;
use crate::config::PackingParams;
use crate::simulation::run_seeded;
use crate::utils::sanitize_radii;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiameterStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl DiameterStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        Self { min, max, avg }
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            min: f(self.min),
            max: f(self.max),
            avg: f(self.avg),
        }
    }
}

/// Outcome of one run within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub seed: u64,
    pub diameter: f64,
    pub converged: bool,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: Vec<RunRecord>,
    pub converged_runs: usize,
    /// Bundle diameters straight from the simulation
    pub raw: DiameterStats,
    /// Diameters after wrap thickness and tolerance factor
    pub adjusted: DiameterStats,
}

impl BatchSummary {
    pub fn empty() -> Self {
        Self {
            runs: Vec::new(),
            converged_runs: 0,
            raw: DiameterStats::default(),
            adjusted: DiameterStats::default(),
        }
    }

    pub fn all_converged(&self) -> bool {
        self.converged_runs == self.runs.len()
    }
}

fn run_one(radii: &[f64], params: &PackingParams, seed: u64) -> RunRecord {
    let result = run_seeded(radii, params, seed);
    debug!(seed, diameter = result.diameter(), converged = result.converged, "batch run");
    RunRecord {
        seed,
        diameter: result.diameter(),
        converged: result.converged,
        iterations: result.iterations,
    }
}

/// Run `batch.runs` independent simulations and aggregate their diameters.
/// Every run has its own seed, so the summary does not depend on `parallel`.
pub fn run_batch(radii: &[f64], params: &PackingParams, batch: &BatchConfig) -> BatchSummary {
    let radii = sanitize_radii(radii);
    if radii.is_empty() || batch.runs == 0 {
        return BatchSummary::empty();
    }

    let runs: Vec<RunRecord> = if batch.parallel {
        (0..batch.runs)
            .into_par_iter()
            .map(|k| run_one(&radii, params, batch.run_seed(k)))
            .collect()
    } else {
        (0..batch.runs)
            .map(|k| run_one(&radii, params, batch.run_seed(k)))
            .collect()
    };

    let diameters: Vec<f64> = runs.iter().map(|r| r.diameter).collect();
    let raw = DiameterStats::from_values(&diameters);
    let adjusted = raw.map(|d| batch.adjust(d));
    let converged_runs = runs.iter().filter(|r| r.converged).count();

    info!(
        runs = runs.len(),
        converged_runs,
        min = raw.min,
        max = raw.max,
        avg = raw.avg,
        "batch finished"
    );

    BatchSummary {
        runs,
        converged_runs,
        raw,
        adjusted,
    }
}
