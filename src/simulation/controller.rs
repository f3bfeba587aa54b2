// simulation/controller.rs
// Outer/inner iteration loop: grow the container, relax, adapt acceleration

use super::contact::contact_norm;
use super::relax::pack_step;
use crate::circle::{Bundle, PlacedCircle};
use crate::config::PackingParams;
use crate::spatial_grid::SpatialGrid;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackingState {
    Growing,
    Relaxing,
    Converged,
    MaxIterationsReached,
}

impl PackingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PackingState::Converged | PackingState::MaxIterationsReached)
    }
}

/// Why an inner loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InnerExit {
    /// Penetration fell below the convergence threshold
    Threshold,
    /// Penetration stopped changing
    Delta,
    /// Inner iteration cap
    Max,
}

impl fmt::Display for InnerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InnerExit::Threshold => "threshold",
            InnerExit::Delta => "delta",
            InnerExit::Max => "max",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackingResult {
    /// Wire circles at their final positions
    pub final_circles: Vec<PlacedCircle>,
    /// Settled inner container radius; the bundle diameter is twice this
    pub container_radius: f64,
    pub outer_radius: f64,
    pub converged: bool,
    /// Outer iterations performed
    pub iterations: usize,
    pub final_avg_penetration: f64,
    /// Initial penetration followed by one value per outer iteration
    pub convergence_series: Vec<f64>,
    pub inner_exit_reasons: Vec<InnerExit>,
    pub final_state: PackingState,
    pub final_acceleration: f64,
}

impl PackingResult {
    /// Result for a run with no usable wires.
    pub fn empty() -> Self {
        Self {
            final_circles: Vec::new(),
            container_radius: 0.0,
            outer_radius: 0.0,
            converged: true,
            iterations: 0,
            final_avg_penetration: 0.0,
            convergence_series: Vec::new(),
            inner_exit_reasons: Vec::new(),
            final_state: PackingState::Converged,
            final_acceleration: 0.0,
        }
    }

    pub fn diameter(&self) -> f64 {
        2.0 * self.container_radius
    }
}

/// Severity-scaled growth factor for the inner container.
pub fn container_growth(avg_penetration: f64, params: &PackingParams) -> f64 {
    let severity = avg_penetration.min(params.penetration_growth_cap);
    let adjust = (params.container_adjust_factor
        * (0.8 + severity / params.penetration_growth_cap))
        .max(params.adjust_factor_min)
        .min(params.adjust_factor_max);
    1.0 + adjust * severity
}

/// Next acceleration after an outer iteration moved the penetration from
/// `previous` to `current`.
pub fn adapt_acceleration(
    acceleration: f64,
    previous: f64,
    current: f64,
    params: &PackingParams,
) -> f64 {
    let next = if current > previous * params.instability_ratio {
        acceleration * params.acceleration_decrease
    } else if (current - previous).abs() < previous * params.stagnation_ratio {
        acceleration * params.acceleration_increase
    } else {
        acceleration
    };
    params.clamp_acceleration(next)
}

fn transition(from: PackingState, to: PackingState) -> PackingState {
    if from != to {
        trace!(?from, ?to, "packing state");
    }
    to
}

/// Relax `bundle` until the average normalized penetration drops below the
/// threshold or the outer cap is hit. Both outcomes return the best state;
/// the cap is reported through `converged = false`.
pub fn run_packing_simulation<R: Rng + ?Sized>(
    mut bundle: Bundle,
    params: &PackingParams,
    rng: &mut R,
) -> PackingResult {
    let threshold = params.convergence_threshold;
    let delta_threshold = params.inner_delta_threshold();
    let mut acceleration = params.clamp_acceleration(params.acceleration_base);
    let mut grid = SpatialGrid::build(&bundle.wires);
    let mut avg = contact_norm(&mut bundle, &grid);
    let mut series = vec![avg];
    let mut exits = Vec::new();
    let mut outer = 0;
    let mut state = PackingState::Growing;

    debug!(
        wires = bundle.wires.len(),
        container_radius = bundle.inner.r,
        initial_penetration = avg,
        "starting packing simulation"
    );

    while avg > threshold && outer < params.max_outer_iterations {
        outer += 1;
        let before = avg;

        state = transition(state, PackingState::Growing);
        let grown = bundle.inner.r * container_growth(avg, params);
        bundle.set_container_radius(grown, params.container_ratio);

        state = transition(state, PackingState::Relaxing);
        let mut exit = InnerExit::Max;
        for _ in 0..params.max_inner_iterations {
            let prev = avg;
            pack_step(&mut bundle, acceleration, params.weight_factor, &grid, rng);
            grid.rebuild(&bundle.wires);
            avg = contact_norm(&mut bundle, &grid);
            if avg < threshold {
                exit = InnerExit::Threshold;
                break;
            }
            if (avg - prev).abs() < delta_threshold {
                exit = InnerExit::Delta;
                break;
            }
        }
        exits.push(exit);
        series.push(avg);

        acceleration = adapt_acceleration(acceleration, before, avg, params);
        trace!(
            outer,
            container_radius = bundle.inner.r,
            avg_penetration = avg,
            acceleration,
            exit = %exit,
            "outer iteration"
        );
    }

    let converged = avg <= threshold;
    if converged {
        state = transition(state, PackingState::Converged);
    } else {
        state = transition(state, PackingState::MaxIterationsReached);
        warn!(
            iterations = outer,
            avg_penetration = avg,
            "packing did not converge within the outer iteration cap"
        );
    }
    debug_assert!(state.is_terminal());
    debug!(
        iterations = outer,
        container_radius = bundle.inner.r,
        converged,
        "packing simulation finished"
    );

    PackingResult {
        final_circles: bundle.placed_wires(),
        container_radius: bundle.inner.r,
        outer_radius: bundle.outer.r,
        converged,
        iterations: outer,
        final_avg_penetration: avg,
        convergence_series: series,
        inner_exit_reasons: exits,
        final_state: state,
        final_acceleration: acceleration,
    }
}
