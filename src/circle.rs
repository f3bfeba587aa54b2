// circle.rs
// Circle value type and the tagged bundle (outer container, inner container, wires)

use serde::{Deserialize, Serialize};
use ultraviolet::DVec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub pos: DVec2,
    pub r: f64,
    /// Contact count from the last analysis pass
    pub contacts: u32,
    /// Penetration accumulated during the last analysis pass
    pub penetration: f64,
}

impl Circle {
    pub fn new(pos: DVec2, r: f64) -> Self {
        Self {
            pos,
            r,
            contacts: 0,
            penetration: 0.0,
        }
    }

    /// Circle centred on the origin, used for the two containers.
    pub fn centered(r: f64) -> Self {
        Self::new(DVec2::zero(), r)
    }

    pub fn reset_contacts(&mut self) {
        self.contacts = 0;
        self.penetration = 0.0;
    }

    pub fn placed(&self) -> PlacedCircle {
        PlacedCircle {
            x: self.pos.x,
            y: self.pos.y,
            r: self.r,
        }
    }
}

/// Final position of a circle as reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedCircle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// All circles of one run. The inner container is the physical boundary;
/// the outer container only tracks it at a fixed ratio.
#[derive(Clone, Debug)]
pub struct Bundle {
    pub outer: Circle,
    pub inner: Circle,
    pub wires: Vec<Circle>,
}

impl Bundle {
    pub fn new(inner_radius: f64, container_ratio: f64, wires: Vec<Circle>) -> Self {
        Self {
            outer: Circle::centered(inner_radius * container_ratio),
            inner: Circle::centered(inner_radius),
            wires,
        }
    }

    /// Set the inner container radius and keep the outer one in step.
    pub fn set_container_radius(&mut self, inner_radius: f64, container_ratio: f64) {
        self.inner.r = inner_radius;
        self.outer.r = inner_radius * container_ratio;
    }

    pub fn placed_wires(&self) -> Vec<PlacedCircle> {
        self.wires.iter().map(Circle::placed).collect()
    }
}

pub fn max_radius(circles: &[Circle]) -> f64 {
    circles.iter().map(|c| c.r).fold(0.0, f64::max)
}
