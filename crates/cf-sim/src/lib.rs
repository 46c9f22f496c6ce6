//! Discrete-time simulation engine for the cruiseflow speed loop.
//!
//! Provides:
//! - Immutable, validated system parameters
//! - Function-of-time inputs for reference speed and disturbance forces
//! - Vehicle plant with linear drag
//! - The fixed-step loop composing controller, engine and vehicle
//! - Parallel execution of independent runs (tuning sweeps)

pub mod error;
pub mod params;
pub mod profile;
pub mod providers;
pub mod sim;
pub mod sweep;
pub mod trace;
pub mod vehicle;

// Re-exports for public API
pub use error::{InputKind, SimError, SimResult};
pub use params::{MAX_STEPS, SystemParameters};
pub use profile::{DisturbanceSet, ProfileError, ReferenceProfile, TimeFn};
pub use sim::{SimProgress, Simulation, run};
pub use sweep::{SweepOutcome, Tuning, run_sweep};
pub use trace::{RunStatus, Trace, TraceRecord};
pub use vehicle::{PlantState, VehiclePlant};
