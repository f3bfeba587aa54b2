// simulation/mod.rs
// Packing kernel: contact analysis, relaxation step, controller and runner

pub mod contact;
pub mod controller;
pub mod relax;
pub mod runner;

pub use contact::contact_norm;
pub use controller::{run_packing_simulation, InnerExit, PackingResult, PackingState};
pub use relax::pack_step;
pub use runner::{initial_container_radius, initialize_bundle, run_seeded, run_single_simulation};

#[cfg(test)]
mod tests;
