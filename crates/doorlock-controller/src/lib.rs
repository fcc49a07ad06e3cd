//! Access controller driving the capture-verify-actuate cycle.
//!
//! This crate contains the state machine and the orchestrator that ties the
//! camera, the link, the verification client and the actuator together.

pub mod controller;
pub mod error;
pub mod state_machine;

pub use controller::{AccessController, CycleReport};
pub use error::{ControllerError, Result};
pub use state_machine::{ControllerState, StateMachine, StateTransition};
