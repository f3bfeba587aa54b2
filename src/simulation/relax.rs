// simulation/relax.rs
// One relaxation pass: pull wires back inside the container, push overlapping pairs apart

use crate::circle::Bundle;
use crate::config::{COINCIDENT_EPSILON, DEGENERATE_KICK_FACTOR, OVERSIZED_PULL_FACTOR};
use crate::profile_scope;
use crate::spatial_grid::SpatialGrid;
use rand::Rng;
use std::f64::consts::TAU;
use ultraviolet::DVec2;

/// Resolve the current overlaps once, in wire order. Never fails: coincident
/// centres are separated with a random kick drawn from `rng`.
pub fn pack_step<R: Rng + ?Sized>(
    bundle: &mut Bundle,
    acceleration: f64,
    weight_factor: f64,
    grid: &SpatialGrid,
    rng: &mut R,
) {
    profile_scope!("pack_step");
    let inner_r = bundle.inner.r;
    for i in 0..bundle.wires.len() {
        resolve_boundary(bundle, i, inner_r);
        for j in grid.neighbors(&bundle.wires, i) {
            resolve_pair(bundle, i, j, acceleration, weight_factor, rng);
        }
    }
}

fn resolve_boundary(bundle: &mut Bundle, i: usize, inner_r: f64) {
    let w = &mut bundle.wires[i];
    let pos = w.pos;
    let dist = pos.mag();
    if w.r <= inner_r {
        let allowed = inner_r - w.r;
        if dist > allowed {
            let overlap = dist - allowed;
            w.pos -= pos * (overlap / dist);
        }
    } else if dist > COINCIDENT_EPSILON {
        // Wire wider than the container: pull harder, but never past the centre.
        let overlap = w.r - inner_r;
        let fraction = (OVERSIZED_PULL_FACTOR * overlap / dist).min(1.0);
        w.pos -= pos * fraction;
    }
}

fn resolve_pair<R: Rng + ?Sized>(
    bundle: &mut Bundle,
    i: usize,
    j: usize,
    acceleration: f64,
    weight_factor: f64,
    rng: &mut R,
) {
    let wi = bundle.wires[i];
    let wj = bundle.wires[j];
    let min_dist = wi.r + wj.r;
    let d = wj.pos - wi.pos;
    let dist_sq = d.mag_sq();
    if dist_sq >= min_dist * min_dist {
        return;
    }
    let dist = dist_sq.sqrt();

    if dist < COINCIDENT_EPSILON {
        let angle = rng.random_range(0.0..TAU);
        let (sin, cos) = angle.sin_cos();
        let kick = DVec2::new(cos, sin) * (DEGENERATE_KICK_FACTOR * wi.r);
        bundle.wires[i].pos -= kick;
        bundle.wires[j].pos += kick;
        return;
    }

    let overlap = min_dist - dist;
    let mass_i = wi.r.powf(weight_factor);
    let mass_j = wj.r.powf(weight_factor);
    let total_mass = mass_i + mass_j;
    // The heavier wire moves less.
    let (ratio_i, ratio_j) = if total_mass > 0.0 && total_mass.is_finite() {
        (mass_j / total_mass, mass_i / total_mass)
    } else {
        (0.5, 0.5)
    };
    let push = d * (overlap / dist * acceleration);
    bundle.wires[i].pos -= push * ratio_i;
    bundle.wires[j].pos += push * ratio_j;
}
