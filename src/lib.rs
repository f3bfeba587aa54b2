pub mod batch;
pub mod bundle_config;
pub mod circle;
pub mod config;
pub mod error;
pub mod profiler;
pub mod simulation;
pub mod spatial_grid;
pub mod utils;

pub use batch::{run_batch, BatchConfig, BatchSummary};
pub use bundle_config::{BundleConfig, WireEntry};
pub use circle::{Bundle, Circle, PlacedCircle};
pub use config::PackingParams;
pub use error::{BundleError, Result};
pub use simulation::{run_seeded, run_single_simulation, InnerExit, PackingResult, PackingState};

#[cfg(feature = "profiling")]
use once_cell::sync::Lazy;
#[cfg(feature = "profiling")]
use parking_lot::Mutex;

#[cfg(feature = "profiling")]
pub static PROFILER: Lazy<Mutex<profiler::Profiler>> =
    Lazy::new(|| Mutex::new(profiler::Profiler::new()));
