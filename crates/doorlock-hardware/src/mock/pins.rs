//! Mock control outputs for testing and development.
//!
//! Records every level change and tone with its (tokio) timestamp so tests can
//! check both the order and the timing of a feedback sequence.

use crate::{
    HardwareError, Result,
    traits::ControlPins,
    types::{Level, Output},
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Something that happened on the mock outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinEvent {
    /// An output was driven to a level.
    Write {
        output: Output,
        level: Level,
        at: Instant,
    },

    /// The buzzer played a tone. `at` is when it started.
    Tone {
        frequency_hz: u32,
        duration: Duration,
        at: Instant,
    },
}

#[derive(Debug, Default)]
struct PinsState {
    levels: HashMap<Output, Level>,
    events: Vec<PinEvent>,
    failing: HashSet<Output>,
}

fn lock(state: &Mutex<PinsState>) -> MutexGuard<'_, PinsState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock relay, LEDs and buzzer.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockPins;
/// use doorlock_hardware::traits::ControlPins;
/// use doorlock_hardware::types::{Level, Output};
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut pins, handle) = MockPins::new();
///
///     pins.write(Output::GreenLed, Level::High).await?;
///     assert_eq!(handle.level(Output::GreenLed), Level::High);
///     assert!(!handle.all_at_rest());
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPins {
    state: Arc<Mutex<PinsState>>,
}

impl MockPins {
    /// Create mock outputs, all at rest, and the handle that observes them.
    pub fn new() -> (Self, MockPinsHandle) {
        let state = Arc::new(Mutex::new(PinsState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockPinsHandle { state },
        )
    }
}

impl Default for MockPins {
    fn default() -> Self {
        Self::new().0
    }
}

impl ControlPins for MockPins {
    async fn write(&mut self, output: Output, level: Level) -> Result<()> {
        let mut state = lock(&self.state);
        if state.failing.contains(&output) {
            return Err(HardwareError::output_failed(output, "injected failure"));
        }

        state.levels.insert(output, level);
        state.events.push(PinEvent::Write {
            output,
            level,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<()> {
        {
            let mut state = lock(&self.state);
            if state.failing.contains(&Output::Buzzer) {
                return Err(HardwareError::output_failed(
                    Output::Buzzer,
                    "injected failure",
                ));
            }
            state.events.push(PinEvent::Tone {
                frequency_hz,
                duration,
                at: Instant::now(),
            });
        }

        tokio::time::sleep(duration).await;
        Ok(())
    }
}

/// Observer and fault injector for [`MockPins`].
#[derive(Debug, Clone)]
pub struct MockPinsHandle {
    state: Arc<Mutex<PinsState>>,
}

impl MockPinsHandle {
    /// Current level of an output (`Low` if never written).
    pub fn level(&self, output: Output) -> Level {
        lock(&self.state)
            .levels
            .get(&output)
            .copied()
            .unwrap_or_default()
    }

    /// Whether the relay is released and every indicator and the flash are off.
    pub fn all_at_rest(&self) -> bool {
        Output::ALL
            .iter()
            .all(|output| self.level(*output) == Level::Low)
    }

    /// Every recorded event, oldest first.
    pub fn events(&self) -> Vec<PinEvent> {
        lock(&self.state).events.clone()
    }

    /// Successful writes, oldest first.
    pub fn writes(&self) -> Vec<(Output, Level)> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|event| match event {
                PinEvent::Write { output, level, .. } => Some((*output, *level)),
                PinEvent::Tone { .. } => None,
            })
            .collect()
    }

    /// Tones played, oldest first.
    pub fn tones(&self) -> Vec<(u32, Duration)> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|event| match event {
                PinEvent::Tone {
                    frequency_hz,
                    duration,
                    ..
                } => Some((*frequency_hz, *duration)),
                PinEvent::Write { .. } => None,
            })
            .collect()
    }

    /// Make every following operation on `output` fail.
    pub fn fail_output(&self, output: Output) {
        lock(&self.state).failing.insert(output);
    }

    /// Undo [`fail_output`](Self::fail_output).
    pub fn repair_output(&self, output: Output) {
        lock(&self.state).failing.remove(&output);
    }

    /// Forget recorded events, keeping current levels.
    pub fn clear_events(&self) {
        lock(&self.state).events.clear();
    }
}
