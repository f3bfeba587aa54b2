// config.rs
// Centralized defaults and the per-run parameter set for the packing kernel

use serde::{Deserialize, Serialize};
use crate::error::{BundleError, Result};

// ====================
// Container
// ====================
/// Outer (rendering) container radius as a multiple of the inner container.
pub const CONTAINER_RATIO: f64 = 1.01;
/// Area-based initial container estimate multiplier.
pub const INITIAL_AREA_FACTOR: f64 = 1.15;
/// Initial container is never smaller than the largest wire times this.
pub const INITIAL_MAX_RADIUS_FACTOR: f64 = 1.05;

// ====================
// Relaxation
// ====================
pub const ACCELERATION_BASE: f64 = 1.65;
pub const ACCELERATION_MIN: f64 = 1.0;
pub const ACCELERATION_MAX: f64 = 1.8;
pub const ACCELERATION_DECREASE: f64 = 0.9;
pub const ACCELERATION_INCREASE: f64 = 1.05;
/// Mass exponent: `mass = r^WEIGHT_FACTOR` (2 = area weighting).
pub const WEIGHT_FACTOR: f64 = 2.0;

// ====================
// Convergence
// ====================
pub const CONVERGENCE_THRESHOLD: f64 = 0.001;
pub const MAX_OUTER_ITERATIONS: usize = 500;
pub const MAX_INNER_ITERATIONS: usize = 15;
/// Inner loop stops when the penetration change drops below threshold / this.
pub const INNER_DELTA_DIVISOR: f64 = 50.0;
/// Penetration rise (as a ratio) treated as instability.
pub const INSTABILITY_RATIO: f64 = 1.05;
/// Relative penetration change below which an outer iteration is stagnant.
pub const STAGNATION_RATIO: f64 = 0.01;

// ====================
// Container growth
// ====================
pub const CONTAINER_ADJUST_FACTOR: f64 = 0.05;
pub const ADJUST_FACTOR_MIN: f64 = 0.04;
pub const ADJUST_FACTOR_MAX: f64 = 0.08;
pub const PENETRATION_GROWTH_CAP: f64 = 0.3;

// ====================
// Numeric tolerances
// ====================
/// Overlaps at or below this are treated as touching, not penetrating.
pub const PENETRATION_EPSILON: f64 = 1e-9;
/// Centres closer than this are treated as coincident.
pub const COINCIDENT_EPSILON: f64 = 1e-9;
/// Coincident-centre kick as a fraction of the wire radius.
pub const DEGENERATE_KICK_FACTOR: f64 = 0.1;
/// Pull multiplier for a wire larger than the container itself.
pub const OVERSIZED_PULL_FACTOR: f64 = 1.1;
/// Smallest spatial grid cell size.
pub const MIN_CELL_SIZE: f64 = 1e-6;

/// Parameter set for a single packing run. Every field falls back to the
/// module defaults when omitted from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingParams {
    pub pi: f64,
    pub container_ratio: f64,
    pub acceleration_base: f64,
    pub weight_factor: f64,
    pub convergence_threshold: f64,
    pub max_outer_iterations: usize,
    pub max_inner_iterations: usize,
    pub container_adjust_factor: f64,
    pub adjust_factor_min: f64,
    pub adjust_factor_max: f64,
    /// Cap on the average penetration fed into container growth
    pub penetration_growth_cap: f64,
    pub acceleration_min: f64,
    pub acceleration_max: f64,
    pub acceleration_decrease: f64,
    pub acceleration_increase: f64,
    pub instability_ratio: f64,
    pub stagnation_ratio: f64,
    pub inner_delta_divisor: f64,
    pub initial_area_factor: f64,
    pub initial_max_radius_factor: f64,
}

impl Default for PackingParams {
    fn default() -> Self {
        Self {
            pi: std::f64::consts::PI,
            container_ratio: CONTAINER_RATIO,
            acceleration_base: ACCELERATION_BASE,
            weight_factor: WEIGHT_FACTOR,
            convergence_threshold: CONVERGENCE_THRESHOLD,
            max_outer_iterations: MAX_OUTER_ITERATIONS,
            max_inner_iterations: MAX_INNER_ITERATIONS,
            container_adjust_factor: CONTAINER_ADJUST_FACTOR,
            adjust_factor_min: ADJUST_FACTOR_MIN,
            adjust_factor_max: ADJUST_FACTOR_MAX,
            penetration_growth_cap: PENETRATION_GROWTH_CAP,
            acceleration_min: ACCELERATION_MIN,
            acceleration_max: ACCELERATION_MAX,
            acceleration_decrease: ACCELERATION_DECREASE,
            acceleration_increase: ACCELERATION_INCREASE,
            instability_ratio: INSTABILITY_RATIO,
            stagnation_ratio: STAGNATION_RATIO,
            inner_delta_divisor: INNER_DELTA_DIVISOR,
            initial_area_factor: INITIAL_AREA_FACTOR,
            initial_max_radius_factor: INITIAL_MAX_RADIUS_FACTOR,
        }
    }
}

impl PackingParams {
    /// Inner-loop stagnation bound: `threshold / inner_delta_divisor`.
    pub fn inner_delta_threshold(&self) -> f64 {
        self.convergence_threshold / self.inner_delta_divisor
    }

    /// Clamp an acceleration into the configured adaptive range. Never
    /// panics: with `min > max` the upper bound wins.
    pub fn clamp_acceleration(&self, acceleration: f64) -> f64 {
        acceleration
            .max(self.acceleration_min)
            .min(self.acceleration_max)
    }

    /// Check the parameter set for values the controller cannot work with.
    /// The kernel itself never calls this; it is for config files and the CLI.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pi", self.pi),
            ("container_ratio", self.container_ratio),
            ("acceleration_base", self.acceleration_base),
            ("convergence_threshold", self.convergence_threshold),
            ("container_adjust_factor", self.container_adjust_factor),
            ("adjust_factor_min", self.adjust_factor_min),
            ("adjust_factor_max", self.adjust_factor_max),
            ("penetration_growth_cap", self.penetration_growth_cap),
            ("acceleration_min", self.acceleration_min),
            ("acceleration_max", self.acceleration_max),
            ("acceleration_decrease", self.acceleration_decrease),
            ("acceleration_increase", self.acceleration_increase),
            ("instability_ratio", self.instability_ratio),
            ("inner_delta_divisor", self.inner_delta_divisor),
            ("initial_area_factor", self.initial_area_factor),
            ("initial_max_radius_factor", self.initial_max_radius_factor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(BundleError::InvalidParams(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        if !self.weight_factor.is_finite() || self.weight_factor < 0.0 {
            return Err(BundleError::InvalidParams(format!(
                "weight_factor must be finite and non-negative, got {}",
                self.weight_factor
            )));
        }
        if !self.stagnation_ratio.is_finite() || self.stagnation_ratio < 0.0 {
            return Err(BundleError::InvalidParams(format!(
                "stagnation_ratio must be finite and non-negative, got {}",
                self.stagnation_ratio
            )));
        }
        if self.container_ratio < 1.0 {
            return Err(BundleError::InvalidParams(format!(
                "container_ratio must be at least 1.0, got {}",
                self.container_ratio
            )));
        }
        if self.adjust_factor_min > self.adjust_factor_max {
            return Err(BundleError::InvalidParams(format!(
                "adjust_factor_min ({}) exceeds adjust_factor_max ({})",
                self.adjust_factor_min, self.adjust_factor_max
            )));
        }
        if self.acceleration_min > self.acceleration_max {
            return Err(BundleError::InvalidParams(format!(
                "acceleration_min ({}) exceeds acceleration_max ({})",
                self.acceleration_min, self.acceleration_max
            )));
        }
        if self.max_inner_iterations == 0 {
            return Err(BundleError::InvalidParams(
                "max_inner_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
