// simulation/runner.rs
// Builds the initial bundle from a radius list and hands it to the controller

use super::controller::{run_packing_simulation, PackingResult};
use crate::circle::{Bundle, Circle};
use crate::config::PackingParams;
use crate::utils::{sanitize_radii, uniform_disc_point};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

/// Starting inner radius: an area estimate with headroom, floored so the
/// largest wire always fits.
pub fn initial_container_radius(radii: &[f64], params: &PackingParams) -> f64 {
    let total_area: f64 = radii.iter().map(|r| params.pi * r * r).sum();
    let max_r = radii.iter().copied().fold(0.0, f64::max);
    let area_estimate = (total_area / params.pi).sqrt() * params.initial_area_factor;
    area_estimate.max(max_r * params.initial_max_radius_factor)
}

/// Place every wire uniformly at random inside the initial container.
pub fn initialize_bundle<R: Rng + ?Sized>(
    radii: &[f64],
    params: &PackingParams,
    rng: &mut R,
) -> Bundle {
    let inner_r = initial_container_radius(radii, params);
    let wires = radii
        .iter()
        .map(|&r| {
            let max_placement = (inner_r - r).max(0.0);
            Circle::new(uniform_disc_point(rng, max_placement, params.pi), r)
        })
        .collect();
    Bundle::new(inner_r, params.container_ratio, wires)
}

/// Estimate the bundle for `radii`. Non-positive or non-finite radii are
/// dropped; an empty list yields an empty result without simulating.
pub fn run_single_simulation<R: Rng + ?Sized>(
    radii: &[f64],
    params: &PackingParams,
    rng: &mut R,
) -> PackingResult {
    let radii = sanitize_radii(radii);
    if radii.is_empty() {
        debug!("no usable radii, skipping simulation");
        return PackingResult::empty();
    }
    let bundle = initialize_bundle(&radii, params, rng);
    run_packing_simulation(bundle, params, rng)
}

/// [`run_single_simulation`] with a `StdRng` seeded from `seed`.
pub fn run_seeded(radii: &[f64], params: &PackingParams, seed: u64) -> PackingResult {
    let mut rng = StdRng::seed_from_u64(seed);
    run_single_simulation(radii, params, &mut rng)
}
