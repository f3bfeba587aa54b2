// simulation/tests.rs
// Kernel tests: contact analysis, relaxation, controller and runner

use super::controller::{adapt_acceleration, container_growth};
use super::*;
use crate::circle::{Bundle, Circle};
use crate::config::PackingParams;
use crate::spatial_grid::SpatialGrid;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;
use ultraviolet::DVec2;

fn wire(x: f64, y: f64, r: f64) -> Circle {
    Circle::new(DVec2::new(x, y), r)
}

fn bundle(inner_r: f64, wires: Vec<Circle>) -> Bundle {
    Bundle::new(inner_r, 1.01, wires)
}

fn norm(b: &mut Bundle) -> f64 {
    let grid = SpatialGrid::build(&b.wires);
    contact_norm(b, &grid)
}

fn step(b: &mut Bundle, acceleration: f64, seed: u64) {
    let grid = SpatialGrid::build(&b.wires);
    let mut rng = StdRng::seed_from_u64(seed);
    pack_step(b, acceleration, 2.0, &grid, &mut rng);
}

fn overlap(a: &Circle, b: &Circle) -> f64 {
    (a.r + b.r - (b.pos - a.pos).mag()).max(0.0)
}

#[cfg(test)]
mod contact {
    use super::*;

    #[test]
    fn empty_bundle_has_zero_norm() {
        let mut b = bundle(1.0, Vec::new());
        assert_eq!(norm(&mut b), 0.0);
    }

    #[test]
    fn separated_wires_have_zero_norm() {
        let mut b = bundle(5.0, vec![wire(-2.0, 0.0, 1.0), wire(2.0, 0.0, 1.0), wire(0.0, 2.5, 0.5)]);
        assert_eq!(norm(&mut b), 0.0);
        assert!(b.wires.iter().all(|w| w.contacts == 0 && w.penetration == 0.0));
        assert_eq!(b.inner.contacts, 0);
    }

    #[test]
    fn exactly_touching_wires_do_not_count() {
        let mut b = bundle(4.0, vec![wire(-1.0, 0.0, 1.0), wire(1.0, 0.0, 1.0), wire(0.0, 3.0, 1.0)]);
        assert_eq!(norm(&mut b), 0.0);
    }

    #[test]
    fn pair_overlap_is_normalized_by_diameter() {
        let mut b = bundle(10.0, vec![wire(0.0, 0.0, 1.0), wire(1.5, 0.0, 1.0)]);
        let avg = norm(&mut b);
        // Only the lower index carries the pair in its own sum: (0.5 / 2) / 2 wires.
        assert!((avg - 0.125).abs() < 1e-12, "avg = {}", avg);
        assert!((b.wires[0].penetration - 0.5).abs() < 1e-12);
        assert!((b.wires[1].penetration - 0.5).abs() < 1e-12);
        assert_eq!(b.wires[0].contacts, 1);
        assert_eq!(b.wires[1].contacts, 1);
    }

    #[test]
    fn partner_penetration_accumulates_across_pairs() {
        let mut b = bundle(
            20.0,
            vec![wire(-1.5, 0.0, 1.0), wire(1.5, 0.0, 1.0), wire(0.0, 0.0, 1.0)],
        );
        norm(&mut b);
        // Wire 2 overlaps both others by 0.5 and receives both as partner.
        assert!((b.wires[2].penetration - 1.0).abs() < 1e-12);
        assert_eq!(b.wires[2].contacts, 2);
    }

    #[test]
    fn boundary_violation_is_shared_with_container() {
        let mut b = bundle(3.0, vec![wire(2.5, 0.0, 1.0)]);
        let avg = norm(&mut b);
        assert!((avg - 0.25).abs() < 1e-12);
        assert!((b.inner.penetration - 0.5).abs() < 1e-12);
        assert_eq!(b.inner.contacts, 1);
        assert_eq!(b.wires[0].contacts, 1);
        assert_eq!(b.outer.contacts, 0);
    }

    #[test]
    fn oversized_wire_counts_as_boundary_violation() {
        let mut b = bundle(3.0, vec![wire(0.0, 0.0, 4.0)]);
        let avg = norm(&mut b);
        assert!((avg - 1.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn stale_bookkeeping_is_reset() {
        let mut b = bundle(10.0, vec![wire(0.0, 0.0, 1.0), wire(5.0, 0.0, 1.0)]);
        b.wires[0].penetration = 42.0;
        b.wires[1].contacts = 7;
        b.inner.penetration = 3.0;
        assert_eq!(norm(&mut b), 0.0);
        assert_eq!(b.wires[0].penetration, 0.0);
        assert_eq!(b.wires[1].contacts, 0);
        assert_eq!(b.inner.penetration, 0.0);
    }

    #[test]
    fn norm_is_never_negative() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let n = rng.random_range(1..30);
            let wires = (0..n)
                .map(|_| {
                    wire(
                        rng.random_range(-4.0..4.0),
                        rng.random_range(-4.0..4.0),
                        rng.random_range(0.1..1.5),
                    )
                })
                .collect();
            let mut b = bundle(rng.random_range(0.5..6.0), wires);
            let avg = norm(&mut b);
            assert!(avg >= 0.0 && avg.is_finite());
        }
    }
}

#[cfg(test)]
mod relax {
    use super::*;

    #[test]
    fn pair_overlap_does_not_grow_under_bounded_acceleration() {
        for &acc in &[1.0, 1.2, 1.5, 1.65, 1.8] {
            for &(r1, r2, gap) in &[(1.0, 1.0, 1.2), (2.0, 0.5, 2.0), (0.3, 1.1, 0.5)] {
                let mut b = bundle(100.0, vec![wire(0.0, 0.0, r1), wire(gap, 0.3, r2)]);
                let before = overlap(&b.wires[0], &b.wires[1]);
                step(&mut b, acc, 1);
                let after = overlap(&b.wires[0], &b.wires[1]);
                assert!(after <= before, "acc {}: {} -> {}", acc, before, after);
            }
        }
    }

    #[test]
    fn unit_acceleration_separates_to_contact() {
        let mut b = bundle(100.0, vec![wire(0.0, 0.0, 1.0), wire(1.0, 0.0, 1.0)]);
        step(&mut b, 1.0, 0);
        let dist = (b.wires[1].pos - b.wires[0].pos).mag();
        assert!((dist - 2.0).abs() < 1e-12);
    }

    #[test]
    fn heavier_wire_moves_less() {
        let mut b = bundle(100.0, vec![wire(0.0, 0.0, 2.0), wire(2.5, 0.0, 1.0)]);
        step(&mut b, 1.0, 0);
        // masses 4 and 1: the overlap of 0.5 splits 1:4
        assert!((b.wires[0].pos.x + 0.1).abs() < 1e-12);
        assert!((b.wires[1].pos.x - 2.9).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_factor_splits_evenly() {
        let mut b = bundle(100.0, vec![wire(0.0, 0.0, 2.0), wire(2.5, 0.0, 1.0)]);
        let grid = SpatialGrid::build(&b.wires);
        let mut rng = StdRng::seed_from_u64(0);
        pack_step(&mut b, 1.0, 0.0, &grid, &mut rng);
        assert!((b.wires[0].pos.x + 0.25).abs() < 1e-12);
        assert!((b.wires[1].pos.x - 2.75).abs() < 1e-12);
    }

    #[test]
    fn boundary_violator_is_pulled_onto_the_wall() {
        let mut b = bundle(3.0, vec![wire(0.0, 5.0, 1.0)]);
        step(&mut b, 1.6, 0);
        assert!((b.wires[0].pos - DVec2::new(0.0, 2.0)).mag() < 1e-12);
        assert_eq!(b.inner.r, 3.0);
    }

    #[test]
    fn oversized_wire_uses_stronger_pull() {
        // overlap = r - R = 1, fraction = 1.1 * 1 / 5
        let mut b = bundle(3.0, vec![wire(5.0, 0.0, 4.0)]);
        step(&mut b, 1.6, 0);
        assert!((b.wires[0].pos.x - 3.9).abs() < 1e-12);

        // Close to the centre the pull is capped at the centre itself.
        let mut b = bundle(3.0, vec![wire(0.5, 0.0, 4.0)]);
        step(&mut b, 1.6, 0);
        assert_eq!(b.wires[0].pos, DVec2::zero());
    }

    #[test]
    fn coincident_centres_get_a_symmetric_kick() {
        let mut b = bundle(10.0, vec![wire(1.0, 1.0, 0.5), wire(1.0, 1.0, 0.5)]);
        step(&mut b, 1.6, 5);
        let a = b.wires[0].pos;
        let c = b.wires[1].pos;
        assert!(a.x.is_finite() && a.y.is_finite() && c.x.is_finite() && c.y.is_finite());
        assert!(((c - a).mag() - 0.1).abs() < 1e-12);
        let mid = (a + c) * 0.5;
        assert!((mid - DVec2::new(1.0, 1.0)).mag() < 1e-12);
    }

    #[test]
    fn coincident_kick_is_reproducible_for_a_seed() {
        let run = |seed| {
            let mut b = bundle(10.0, vec![wire(0.0, 0.0, 0.5), wire(0.0, 0.0, 0.5)]);
            step(&mut b, 1.6, seed);
            b.wires[0].pos
        };
        assert_eq!(run(3), run(3));
        assert_ne!(run(3), run(4));
    }

    #[test]
    fn wire_radii_are_untouched() {
        let mut b = bundle(1.0, vec![wire(0.0, 0.0, 0.7), wire(0.1, 0.0, 0.4), wire(2.0, 2.0, 0.2)]);
        step(&mut b, 1.8, 0);
        let radii: Vec<f64> = b.wires.iter().map(|w| w.r).collect();
        assert_eq!(radii, vec![0.7, 0.4, 0.2]);
    }
}

#[cfg(test)]
mod controller {
    use super::*;

    #[test]
    fn growth_is_neutral_without_penetration() {
        let params = PackingParams::default();
        assert_eq!(container_growth(0.0, &params), 1.0);
    }

    #[test]
    fn growth_factor_is_clamped_and_capped() {
        let params = PackingParams::default();
        // severity capped at 0.3, adjust 0.05 * 1.8 clamped to 0.08
        assert!((container_growth(5.0, &params) - 1.024).abs() < 1e-12);
        // mild penetration: adjust 0.05 * 0.81 = 0.0405
        let g = container_growth(0.003, &params);
        assert!((g - (1.0 + 0.0405 * 0.003)).abs() < 1e-12);
        // very small penetration hits the lower clamp
        let params = PackingParams {
            container_adjust_factor: 0.01,
            ..Default::default()
        };
        let g = container_growth(0.1, &params);
        assert!((g - (1.0 + 0.04 * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn growth_survives_inverted_adjust_range() {
        let params = PackingParams {
            adjust_factor_min: 0.08,
            adjust_factor_max: 0.04,
            ..Default::default()
        };
        // upper bound wins: 1 + 0.04 * 0.3
        assert!((container_growth(5.0, &params) - 1.012).abs() < 1e-12);

        let params = PackingParams {
            adjust_factor_max: f64::NAN,
            ..Default::default()
        };
        assert!(container_growth(0.1, &params).is_finite());
    }

    #[test]
    fn acceleration_backs_off_on_instability() {
        let params = PackingParams::default();
        let next = adapt_acceleration(1.5, 0.1, 0.2, &params);
        assert!((next - 1.35).abs() < 1e-12);
        assert_eq!(adapt_acceleration(1.05, 0.1, 0.2, &params), 1.0);
    }

    #[test]
    fn acceleration_speeds_up_when_stagnant() {
        let params = PackingParams::default();
        let next = adapt_acceleration(1.5, 0.1, 0.1005, &params);
        assert!((next - 1.575).abs() < 1e-12);
        assert_eq!(adapt_acceleration(1.79, 0.1, 0.1, &params), 1.8);
    }

    #[test]
    fn acceleration_holds_on_normal_progress() {
        let params = PackingParams::default();
        assert_eq!(adapt_acceleration(1.6, 0.1, 0.05, &params), 1.6);
    }

    #[test]
    fn settled_bundle_needs_no_iterations() {
        let b = bundle(3.0, vec![wire(-1.0, 0.0, 1.0), wire(1.0, 0.0, 1.0)]);
        let mut rng = StdRng::seed_from_u64(0);
        let result = run_packing_simulation(b, &PackingParams::default(), &mut rng);
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.final_state, PackingState::Converged);
        assert_eq!(result.convergence_series, vec![0.0]);
        assert!(result.inner_exit_reasons.is_empty());
        assert_eq!(result.container_radius, 3.0);
        assert!((result.outer_radius - 3.03).abs() < 1e-12);
    }

    #[test]
    fn iteration_cap_returns_best_effort() {
        let params = PackingParams {
            max_outer_iterations: 2,
            ..Default::default()
        };
        let b = bundle(1.0, (0..12).map(|k| wire(0.01 * k as f64, 0.0, 0.5)).collect());
        let mut rng = StdRng::seed_from_u64(1);
        let result = run_packing_simulation(b, &params, &mut rng);
        assert!(!result.converged);
        assert_eq!(result.final_state, PackingState::MaxIterationsReached);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.inner_exit_reasons.len(), 2);
        assert_eq!(result.convergence_series.len(), 3);
        assert!(result.container_radius > 1.0);
        assert!(result.final_circles.iter().all(|c| c.x.is_finite() && c.y.is_finite()));
    }

    #[test]
    fn container_only_grows() {
        let b = bundle(1.0, (0..8).map(|k| wire(0.1 * k as f64, 0.05, 0.5)).collect());
        let mut rng = StdRng::seed_from_u64(2);
        let result = run_packing_simulation(b, &PackingParams::default(), &mut rng);
        assert!(result.container_radius >= 1.0);
        assert!((result.outer_radius / result.container_radius - 1.01).abs() < 1e-12);
    }

    #[test]
    fn inner_exit_reasons_serialize_lowercase() {
        let json = serde_json::to_string(&vec![InnerExit::Threshold, InnerExit::Delta, InnerExit::Max])
            .unwrap();
        assert_eq!(json, r#"["threshold","delta","max"]"#);
        assert_eq!(InnerExit::Delta.to_string(), "delta");
    }

    // A wire wider than the container, sitting on the centre: relaxation cannot
    // move it, so only container growth changes the penetration.
    fn stuck_oversized_wire() -> Bundle {
        bundle(3.0, vec![wire(0.0, 0.0, 4.0)])
    }

    #[test]
    fn converged_run_ends_on_threshold_exit() {
        let params = PackingParams::default();
        for seed in 0..5 {
            let result = run_seeded(&[0.5; 4], &params, seed);
            assert!(result.converged);
            assert!(result.iterations > 0);
            assert_eq!(result.inner_exit_reasons.last(), Some(&InnerExit::Threshold));
        }
    }

    #[test]
    fn unchanged_penetration_exits_on_delta() {
        let params = PackingParams {
            max_outer_iterations: 3,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let result = run_packing_simulation(stuck_oversized_wire(), &params, &mut rng);
        assert!(!result.converged);
        // First inner step sees the growth, the second sees no change.
        assert_eq!(result.inner_exit_reasons, vec![InnerExit::Delta; 3]);
    }

    #[test]
    fn single_inner_step_exits_on_max() {
        let params = PackingParams {
            max_outer_iterations: 3,
            max_inner_iterations: 1,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let result = run_packing_simulation(stuck_oversized_wire(), &params, &mut rng);
        assert!(!result.converged);
        assert_eq!(result.inner_exit_reasons, vec![InnerExit::Max; 3]);
    }

    #[test]
    fn final_acceleration_stays_in_range() {
        let params = PackingParams::default();
        let radii: Vec<f64> = (0..40).map(|k| 0.2 + 0.05 * (k % 7) as f64).collect();
        for seed in 0..4 {
            let result = run_seeded(&radii, &params, seed);
            assert!(result.iterations > 0);
            assert!(result.final_acceleration >= params.acceleration_min);
            assert!(result.final_acceleration <= params.acceleration_max);
        }
    }
}

#[cfg(test)]
mod runner {
    use super::*;

    #[test]
    fn empty_input_skips_simulation() {
        let result = run_seeded(&[], &PackingParams::default(), 0);
        assert!(result.final_circles.is_empty());
        assert_eq!(result.container_radius, 0.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn non_conforming_radii_are_dropped() {
        let result = run_seeded(&[0.5, -1.0, f64::NAN, 0.0, f64::INFINITY], &PackingParams::default(), 0);
        assert_eq!(result.final_circles.len(), 1);
        assert_eq!(result.final_circles[0].r, 0.5);

        let result = run_seeded(&[-2.0, f64::NAN], &PackingParams::default(), 0);
        assert!(result.final_circles.is_empty());
        assert_eq!(result.container_radius, 0.0);
    }

    #[test]
    fn initial_radius_combines_area_and_largest_wire() {
        let params = PackingParams::default();
        assert!((initial_container_radius(&[0.5; 4], &params) - 1.15).abs() < 1e-12);
        let r = initial_container_radius(&[5.0], &params);
        assert!((r - 5.75).abs() < 1e-12);
        // One dominant wire among tiny ones: the area estimate still wins here
        let r = initial_container_radius(&[5.0, 0.1], &params);
        assert!((r - (25.01f64).sqrt() * 1.15).abs() < 1e-12);
        let params = PackingParams {
            initial_area_factor: 0.5,
            ..Default::default()
        };
        assert!((initial_container_radius(&[5.0, 0.1], &params) - 5.25).abs() < 1e-12);
    }

    #[test]
    fn initial_placement_is_inside_the_container() {
        let params = PackingParams::default();
        let mut rng = StdRng::seed_from_u64(17);
        let radii = [0.3, 0.9, 0.5, 1.4, 0.2, 0.2, 0.7];
        let b = initialize_bundle(&radii, &params, &mut rng);
        assert_eq!(b.wires.len(), radii.len());
        for (w, &r) in b.wires.iter().zip(radii.iter()) {
            assert_eq!(w.r, r);
            assert!(w.pos.mag() + w.r <= b.inner.r + 1e-12);
        }
        assert!((b.outer.r - b.inner.r * 1.01).abs() < 1e-12);
    }

    #[test]
    fn four_equal_wires_settle_near_optimal_packing() {
        for seed in 0..5 {
            let result = run_seeded(&[0.5, 0.5, 0.5, 0.5], &PackingParams::default(), seed);
            assert!(result.converged, "seed {} did not converge", seed);
            assert!(
                (1.05..=1.35).contains(&result.container_radius),
                "seed {}: radius {}",
                seed,
                result.container_radius
            );
            assert_eq!(result.final_circles.len(), 4);
        }
    }

    #[test]
    fn single_wire_converges_quickly() {
        let result = run_seeded(&[5.0], &PackingParams::default(), 3);
        assert!(result.converged);
        assert!(result.iterations < 5);
        assert!(result.container_radius >= 5.0);
    }

    #[test]
    fn converged_bundle_does_not_exceed_container_area() {
        let params = PackingParams::default();
        let mut rng = StdRng::seed_from_u64(21);
        let radii: Vec<f64> = (0..25).map(|_| [0.3, 0.5, 0.8, 1.2][rng.random_range(0..4)]).collect();
        let result = run_single_simulation(&radii, &params, &mut rng);
        assert!(result.converged);
        let wire_area: f64 = radii.iter().map(|r| PI * r * r).sum();
        let container_area = PI * result.container_radius.powi(2);
        assert!(wire_area <= container_area * (1.0 + params.convergence_threshold));
        // every wire is inside the container up to the penetration tolerance
        for c in &result.final_circles {
            let reach = (c.x * c.x + c.y * c.y).sqrt() + c.r;
            assert!(reach <= result.container_radius + 2.0 * c.r * params.convergence_threshold * radii.len() as f64);
        }
    }

    #[test]
    fn same_seed_gives_identical_circles() {
        let params = PackingParams::default();
        let radii = [0.4, 0.4, 0.6, 0.9, 0.25, 0.25, 0.25, 1.1];
        let a = run_seeded(&radii, &params, 1234);
        let b = run_seeded(&radii, &params, 1234);
        assert_eq!(a.final_circles, b.final_circles);
        assert_eq!(a.container_radius.to_bits(), b.container_radius.to_bits());
        assert_eq!(a.convergence_series, b.convergence_series);
    }

    #[test]
    fn settled_bundle_barely_moves_on_another_step() {
        let params = PackingParams::default();
        let radii = [0.3, 0.5, 0.5, 0.8, 1.2, 0.3, 0.3, 0.5, 0.8, 0.5, 0.3, 1.2];
        let result = run_seeded(&radii, &params, 8);
        assert!(result.converged);
        assert!(result.final_avg_penetration <= params.convergence_threshold);

        let wires = result
            .final_circles
            .iter()
            .map(|c| wire(c.x, c.y, c.r))
            .collect();
        let mut b = Bundle::new(result.container_radius, params.container_ratio, wires);
        let before: Vec<DVec2> = b.wires.iter().map(|w| w.pos).collect();
        step(&mut b, params.acceleration_max, 0);

        let max_r = radii.iter().copied().fold(0.0, f64::max);
        let epsilon = params.acceleration_max
            * 2.0
            * max_r
            * params.convergence_threshold
            * radii.len() as f64;
        for (w, p) in b.wires.iter().zip(before) {
            assert!((w.pos - p).mag() < epsilon, "moved {}", (w.pos - p).mag());
        }
    }

    #[test]
    fn series_and_exit_reasons_line_up_with_iterations() {
        let result = run_seeded(&[0.5, 0.7, 0.3, 0.3, 0.9, 0.5], &PackingParams::default(), 77);
        assert_eq!(result.inner_exit_reasons.len(), result.iterations);
        assert_eq!(result.convergence_series.len(), result.iterations + 1);
        assert_eq!(result.convergence_series.last().copied(), Some(result.final_avg_penetration));
    }
}
