//! Physical feedback sequences.
//!
//! The [`Actuator`] owns the control outputs and is the only place that knows
//! how a grant or a denial looks and sounds, and for how long. Every sequence
//! blocks until it has finished and always ends by driving all outputs back to
//! rest, even when a write in the middle failed:
//!
//! ```text
//! grant:  green on ─ beep 1000Hz ─ relay on ─ hold unlock_duration ─ relay off ─ green off
//! deny:   red on ─ beep 500Hz ×3 ─ hold 500ms ─ red off
//! ```
//!
//! It also owns the camera flash, which the controller lights around each
//! frame grab with [`Actuator::flash_on`] and [`Actuator::flash_off`].

use crate::error::{HardwareError, Result};
use crate::traits::ControlPins;
use crate::types::{Level, Output};
use doorlock_core::ActuationCommand;
use doorlock_core::constants::{
    BLINK_INTERVAL_MS, DENY_HOLD_MS, DENY_TONE, DENY_TONE_COUNT, DENY_TONE_GAP_MS, FAULT_BLINKS,
    GRANT_TONE, STARTUP_BLINKS, STARTUP_TONE,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Drives the lock relay, indicators and buzzer through fixed feedback
/// patterns.
///
/// # Examples
///
/// ```no_run
/// use doorlock_hardware::Actuator;
/// use doorlock_hardware::mock::MockPins;
/// use std::time::Duration;
///
/// # async fn example() -> doorlock_hardware::Result<()> {
/// let (pins, _handle) = MockPins::new();
/// let mut actuator = Actuator::new(pins, Duration::from_secs(5));
///
/// // Returns after the door has been re-locked.
/// actuator.grant("Alice").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Actuator<P> {
    pins: P,
    unlock_duration: Duration,
}

impl<P: ControlPins> Actuator<P> {
    /// Create an actuator holding the door open for `unlock_duration` on
    /// every grant.
    pub fn new(pins: P, unlock_duration: Duration) -> Self {
        Self {
            pins,
            unlock_duration,
        }
    }

    /// How long a grant keeps the relay energized.
    pub fn unlock_duration(&self) -> Duration {
        self.unlock_duration
    }

    /// Access the underlying outputs.
    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Drive every output to its rest level.
    ///
    /// All outputs are attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub async fn rest(&mut self) -> Result<()> {
        let mut first_error: Option<HardwareError> = None;

        for output in Output::ALL {
            if let Err(e) = self.pins.write(output, Level::Low).await {
                error!(%output, error = %e, "Failed to drive output to rest");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Unlock the door for the configured duration with positive feedback.
    ///
    /// Blocks for the whole unlock hold. When this returns the relay is
    /// released and both indicators are off.
    ///
    /// # Errors
    ///
    /// Returns the first output failure. Rest state has been attempted
    /// regardless.
    pub async fn grant(&mut self, label: &str) -> Result<()> {
        info!(subject = label, "ACCESS GRANTED");

        let sequence = self.grant_sequence().await;
        let rest = self.rest().await;

        if sequence.is_ok() && rest.is_ok() {
            info!("Door locked");
        }
        sequence.and(rest)
    }

    async fn grant_sequence(&mut self) -> Result<()> {
        self.pins.write(Output::GreenLed, Level::High).await?;
        self.beep(GRANT_TONE).await?;

        debug!(hold_ms = self.unlock_duration.as_millis() as u64, "Unlocking door");
        self.pins.write(Output::LockRelay, Level::High).await?;
        sleep(self.unlock_duration).await;

        self.pins.write(Output::LockRelay, Level::Low).await?;
        self.pins.write(Output::GreenLed, Level::Low).await
    }

    /// Show rejection feedback. Never touches the lock.
    ///
    /// # Errors
    ///
    /// Returns the first output failure. Rest state has been attempted
    /// regardless.
    pub async fn deny(&mut self, reason: &str) -> Result<()> {
        warn!(reason, "ACCESS DENIED");

        let sequence = self.deny_sequence().await;
        let rest = self.rest().await;
        sequence.and(rest)
    }

    async fn deny_sequence(&mut self) -> Result<()> {
        self.pins.write(Output::RedLed, Level::High).await?;

        for _ in 0..DENY_TONE_COUNT {
            self.beep(DENY_TONE).await?;
            sleep(Duration::from_millis(DENY_TONE_GAP_MS)).await;
        }

        sleep(Duration::from_millis(DENY_HOLD_MS)).await;
        self.pins.write(Output::RedLed, Level::Low).await
    }

    /// Light the camera flash.
    ///
    /// # Errors
    ///
    /// Returns the write failure. The flash is driven low again first.
    pub async fn flash_on(&mut self) -> Result<()> {
        debug!("Flash on");
        if let Err(e) = self.pins.write(Output::Flash, Level::High).await {
            if let Err(off) = self.flash_off().await {
                error!(error = %off, "Failed to turn flash off");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Turn the camera flash off.
    pub async fn flash_off(&mut self) -> Result<()> {
        self.pins.write(Output::Flash, Level::Low).await
    }

    /// Run the feedback sequence for a command.
    ///
    /// # Errors
    ///
    /// Same as [`grant`](Self::grant) and [`deny`](Self::deny).
    pub async fn execute(&mut self, command: &ActuationCommand) -> Result<()> {
        match command {
            ActuationCommand::Grant { label } => self.grant(label).await,
            ActuationCommand::Deny { reason } => self.deny(reason).await,
        }
    }

    /// Boot-complete pattern: three green blinks and a high beep.
    ///
    /// # Errors
    ///
    /// Returns the first output failure.
    pub async fn show_startup_ok(&mut self) -> Result<()> {
        let sequence = async {
            self.blink(Output::GreenLed, STARTUP_BLINKS).await?;
            self.beep(STARTUP_TONE).await
        }
        .await;
        let rest = self.rest().await;
        sequence.and(rest)
    }

    /// Fault pattern: five red blinks.
    ///
    /// # Errors
    ///
    /// Returns the first output failure.
    pub async fn show_fault(&mut self) -> Result<()> {
        let sequence = self.blink(Output::RedLed, FAULT_BLINKS).await;
        let rest = self.rest().await;
        sequence.and(rest)
    }

    async fn beep(&mut self, (frequency_hz, duration_ms): (u32, u64)) -> Result<()> {
        self.pins
            .tone(frequency_hz, Duration::from_millis(duration_ms))
            .await
    }

    async fn blink(&mut self, output: Output, times: usize) -> Result<()> {
        let interval = Duration::from_millis(BLINK_INTERVAL_MS);
        for _ in 0..times {
            self.pins.write(output, Level::High).await?;
            sleep(interval).await;
            self.pins.write(output, Level::Low).await?;
            sleep(interval).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPins, PinEvent};
    use tokio::time::Instant;

    const UNLOCK: Duration = Duration::from_secs(5);

    fn actuator() -> (Actuator<MockPins>, crate::mock::MockPinsHandle) {
        let (pins, handle) = MockPins::new();
        (Actuator::new(pins, UNLOCK), handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_grant_sequence_and_rest_state() {
        let (mut actuator, handle) = actuator();

        actuator.grant("Alice").await.unwrap();

        let writes = handle.writes();
        assert_eq!(writes[0], (Output::GreenLed, Level::High));
        assert_eq!(writes[1], (Output::LockRelay, Level::High));
        assert_eq!(writes[2], (Output::LockRelay, Level::Low));
        assert_eq!(writes[3], (Output::GreenLed, Level::Low));
        assert_eq!(handle.tones(), vec![(1000, Duration::from_millis(200))]);
        assert!(handle.all_at_rest());
    }

    #[tokio::test(start_paused = true)]
    async fn test_grant_blocks_for_unlock_duration() {
        let (mut actuator, handle) = actuator();

        let started = Instant::now();
        actuator.grant("Alice").await.unwrap();
        let elapsed = started.elapsed();

        // 200ms tone plus the hold.
        assert_eq!(elapsed, UNLOCK + Duration::from_millis(200));

        let events = handle.events();
        let unlocked_at = events
            .iter()
            .find_map(|e| match e {
                PinEvent::Write {
                    output: Output::LockRelay,
                    level: Level::High,
                    at,
                } => Some(*at),
                _ => None,
            })
            .unwrap();
        let locked_at = events
            .iter()
            .find_map(|e| match e {
                PinEvent::Write {
                    output: Output::LockRelay,
                    level: Level::Low,
                    at,
                } => Some(*at),
                _ => None,
            })
            .unwrap();
        assert_eq!(locked_at - unlocked_at, UNLOCK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deny_pattern_never_touches_lock() {
        let (mut actuator, handle) = actuator();

        let started = Instant::now();
        actuator.deny("HTTP 500").await.unwrap();

        assert_eq!(handle.tones(), vec![(500, Duration::from_millis(100)); 3]);
        assert!(
            !handle
                .writes()
                .contains(&(Output::LockRelay, Level::High))
        );
        assert_eq!(handle.writes()[0], (Output::RedLed, Level::High));
        // 3 x (100ms tone + 100ms gap) + 500ms hold
        assert_eq!(started.elapsed(), Duration::from_millis(1100));
        assert!(handle.all_at_rest());
    }

    #[tokio::test(start_paused = true)]
    async fn test_grant_failure_still_restores_rest_state() {
        let (mut actuator, handle) = actuator();
        handle.fail_output(Output::GreenLed);

        let result = actuator.grant("Alice").await;

        assert!(matches!(result, Err(HardwareError::OutputFailed { .. })));
        assert_eq!(handle.level(Output::LockRelay), Level::Low);
        assert_eq!(handle.level(Output::RedLed), Level::Low);
        assert_eq!(handle.level(Output::Buzzer), Level::Low);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_release_failure_reported() {
        let (mut actuator, handle) = actuator();

        // Relay goes high, then the pin breaks before it can be released.
        let fail_after_unlock = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            fail_after_unlock.fail_output(Output::LockRelay);
        });

        let result = actuator.grant("Alice").await;
        assert!(result.is_err());
        // Everything that could be rested was.
        assert_eq!(handle.level(Output::GreenLed), Level::Low);
        assert_eq!(handle.level(Output::Buzzer), Level::Low);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_dispatches_command() {
        let (mut actuator, handle) = actuator();

        actuator
            .execute(&ActuationCommand::Deny {
                reason: "No WiFi".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(handle.tones().len(), 3);

        actuator
            .execute(&ActuationCommand::Grant {
                label: "Bob".to_string(),
            })
            .await
            .unwrap();
        assert!(handle.writes().contains(&(Output::LockRelay, Level::High)));
        assert!(handle.all_at_rest());
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_pattern() {
        let (mut actuator, handle) = actuator();

        actuator.show_startup_ok().await.unwrap();

        let green_on = handle
            .writes()
            .iter()
            .filter(|w| **w == (Output::GreenLed, Level::High))
            .count();
        assert_eq!(green_on, 3);
        assert_eq!(handle.tones(), vec![(1500, Duration::from_millis(100))]);
        assert!(handle.all_at_rest());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_pattern() {
        let (mut actuator, handle) = actuator();

        actuator.show_fault().await.unwrap();

        let red_on = handle
            .writes()
            .iter()
            .filter(|w| **w == (Output::RedLed, Level::High))
            .count();
        assert_eq!(red_on, 5);
        assert!(handle.tones().is_empty());
        assert!(handle.all_at_rest());
    }

    #[tokio::test]
    async fn test_rest_attempts_every_output() {
        let (mut actuator, handle) = actuator();
        handle.fail_output(Output::LockRelay);

        let result = actuator.rest().await;

        assert!(result.is_err());
        let rested: Vec<Output> = handle.writes().into_iter().map(|(o, _)| o).collect();
        assert_eq!(
            rested,
            vec![Output::GreenLed, Output::RedLed, Output::Buzzer, Output::Flash]
        );
    }

    #[tokio::test]
    async fn test_flash_on_then_off() {
        let (mut actuator, handle) = actuator();

        actuator.flash_on().await.unwrap();
        assert_eq!(handle.level(Output::Flash), Level::High);
        assert!(!handle.all_at_rest());

        actuator.flash_off().await.unwrap();
        assert_eq!(
            handle.writes(),
            vec![(Output::Flash, Level::High), (Output::Flash, Level::Low)]
        );
        assert!(handle.all_at_rest());
    }

    #[tokio::test]
    async fn test_flash_failure_reported() {
        let (mut actuator, handle) = actuator();
        handle.fail_output(Output::Flash);

        let result = actuator.flash_on().await;
        assert!(matches!(
            result,
            Err(HardwareError::OutputFailed { ref output, .. }) if output == "flash LED"
        ));
        assert_eq!(handle.level(Output::Flash), Level::Low);
    }
}
