//! Control blocks for cruiseflow.
//!
//! This crate holds the two stateful blocks on the forward path of the speed
//! loop: the PID controller that turns a tracking error into a bounded
//! command, and the first-order actuator (engine) that turns the command into
//! a drive force.
//!
//! Every block is split into an immutable configuration struct and a small
//! mutable state struct. Configuration is validated once on construction;
//! state is created fresh per run and threaded through `update(&mut state, ..)`
//! calls, so independent runs never share anything.

pub mod actuator;
pub mod controller;
pub mod error;

pub use actuator::{ActuatorState, FirstOrderActuator};
pub use controller::{PidController, PidOutput, PidState};
pub use error::{ControlError, ControlResult};
