// simulation/contact.rs
// Contact analysis: average normalized penetration and per-circle bookkeeping

use crate::circle::Bundle;
use crate::config::PENETRATION_EPSILON;
use crate::profile_scope;
use crate::spatial_grid::SpatialGrid;

/// Average penetration per active wire, each normalized by the wire's
/// diameter. This is the controller's only convergence signal.
///
/// Resets and refills `contacts`/`penetration` on the inner container and
/// every wire. A wire's own total is derived fresh here, while the share it
/// receives as the higher-indexed partner `j` of a pair accumulates across all
/// its partners in the same call. `grid` must have been rebuilt for the
/// current wire positions.
pub fn contact_norm(bundle: &mut Bundle, grid: &SpatialGrid) -> f64 {
    profile_scope!("contact_norm");
    bundle.inner.reset_contacts();
    for w in bundle.wires.iter_mut() {
        w.reset_contacts();
    }

    let inner_r = bundle.inner.r;
    let mut total = 0.0;
    let mut active = 0usize;

    for i in 0..bundle.wires.len() {
        let wi = bundle.wires[i];
        if wi.r <= 0.0 {
            continue;
        }
        active += 1;
        let mut local = 0.0;

        // Boundary. `dist + r > inner_r` also covers a wire wider than the container.
        let reach = wi.pos.mag() + wi.r;
        if reach > inner_r {
            let pen = (reach - inner_r).abs();
            if pen > PENETRATION_EPSILON {
                local += pen;
                bundle.inner.penetration += pen;
                bundle.inner.contacts += 1;
                bundle.wires[i].contacts += 1;
            }
        }

        // Pairs
        for j in grid.neighbors(&bundle.wires, i) {
            let wj = bundle.wires[j];
            if wj.r <= 0.0 {
                continue;
            }
            let min_dist = wi.r + wj.r;
            let d = wj.pos - wi.pos;
            if d.x.abs() >= min_dist || d.y.abs() >= min_dist {
                continue;
            }
            let limit = min_dist - PENETRATION_EPSILON;
            if limit <= 0.0 {
                continue;
            }
            let dist_sq = d.mag_sq();
            if dist_sq < limit * limit {
                let pen = (min_dist - dist_sq.sqrt()).abs();
                local += pen;
                bundle.wires[i].contacts += 1;
                bundle.wires[j].contacts += 1;
                bundle.wires[j].penetration += pen;
            }
        }

        bundle.wires[i].penetration += local;
        total += local / (2.0 * wi.r);
    }

    if active == 0 {
        0.0
    } else {
        total / active as f64
    }
}
