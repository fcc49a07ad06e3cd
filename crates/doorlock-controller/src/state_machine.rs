//! Access cycle state machine.
//!
//! One cycle walks the controller through a fixed ring of states and always
//! ends back in `Idle`. There is no terminal state; the device cycles until
//! power-off.
//!
//! # States
//!
//! - `Idle`: Waiting for the next check, or skipping a cycle with no link
//! - `Capturing`: Acquiring one frame from the camera
//! - `Verifying`: Frame is with the verification server
//! - `Actuating`: Grant or deny feedback is running
//!
//! # Valid Transitions
//!
//! - Idle → Capturing → Verifying → Actuating → Idle
//! - Capturing → Idle (no frame)
//!
//! # Examples
//!
//! ```
//! use doorlock_controller::{ControllerState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), &ControllerState::Idle);
//!
//! machine.transition_to(ControllerState::Capturing).unwrap();
//! assert_eq!(machine.current_state(), &ControllerState::Capturing);
//!
//! // Cannot skip verification
//! assert!(machine.transition_to(ControllerState::Actuating).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use doorlock_core::{Error, Result};

/// Maximum number of transitions to keep in history.
const MAX_HISTORY_SIZE: usize = 100;

/// Where the controller is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// Between cycles.
    Idle,

    /// Acquiring a frame.
    Capturing,

    /// Waiting for the server's decision.
    Verifying,

    /// Running grant or deny feedback.
    Actuating,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ControllerState::Idle => "Idle",
            ControllerState::Capturing => "Capturing",
            ControllerState::Verifying => "Verifying",
            ControllerState::Actuating => "Actuating",
        };
        write!(f, "{}", state_str)
    }
}

impl ControllerState {
    /// Check if a transition to the target state is allowed.
    pub fn can_transition_to(&self, target: &ControllerState) -> bool {
        matches!(
            (self, target),
            (ControllerState::Idle, ControllerState::Capturing)
                | (
                    ControllerState::Capturing,
                    ControllerState::Verifying | ControllerState::Idle
                )
                | (ControllerState::Verifying, ControllerState::Actuating)
                | (ControllerState::Actuating, ControllerState::Idle)
        )
    }
}

/// Record of a state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ControllerState,

    pub to: ControllerState,

    /// Not serialized; deserialized records get the current time.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: ControllerState, to: ControllerState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Cycle state machine with bounded transition history.
#[derive(Debug)]
pub struct StateMachine {
    current_state: ControllerState,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in `Idle`.
    pub fn new() -> Self {
        Self {
            current_state: ControllerState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> &ControllerState {
        &self.current_state
    }

    /// Transition history, oldest first, at most the last 100 entries.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// The most recent `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Move to `new_state`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` and leaves the state unchanged
    /// if the transition is not allowed.
    pub fn transition_to(&mut self, new_state: ControllerState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());

        Ok(transition)
    }

    /// Force the machine back to `Idle`, bypassing validation.
    ///
    /// Used when a cycle is abandoned by a fatal error.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, ControllerState::Idle);
        self.perform_state_change(ControllerState::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_state: ControllerState, transition: StateTransition) {
        self.current_state = new_state;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
