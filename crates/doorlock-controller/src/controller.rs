//! The access controller.
//!
//! Owns every device and runs cycles strictly one after another:
//!
//! ```text
//! Idle ──(check interval)──> ensure link ──no──> Idle (skipped)
//!                                 │
//!                                yes
//!                                 v
//!                            Capturing (flash lit) ──no frame──> Idle (skipped)
//!                                 │
//!                                 v
//!                            Verifying ── release frame
//!                                 │
//!                                 v
//!                            Actuating (grant holds the door open)
//!                                 │
//!                                 v
//!                               Idle
//! ```
//!
//! A cycle never starts before the previous actuation has returned, so the
//! lock relay has exactly one driver at any time.

use crate::error::{ControllerError, Result};
use crate::state_machine::{ControllerState, StateMachine, StateTransition};
use doorlock_core::{ActuationCommand, CaptureSettings, DeviceConfig, VerificationOutcome};
use doorlock_hardware::{Actuator, ControlPins, ImageBuffer, ImageSource, LinkDevice, Output};
use doorlock_network::{LinkManager, Verifier};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// What one cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleReport {
    /// The link could not be established in time; nothing was captured.
    LinkUnavailable,

    /// The camera produced no frame; nothing was verified.
    CaptureFailed,

    /// The door was unlocked for the configured hold.
    Granted { label: String, confidence: f32 },

    /// Deny feedback was shown. `reason` is the server's subject label or the
    /// failure diagnostic.
    Denied { reason: String },
}

impl CycleReport {
    fn from_outcome(outcome: &VerificationOutcome) -> Self {
        match ActuationCommand::from_outcome(outcome) {
            ActuationCommand::Grant { label } => Self::Granted {
                label,
                confidence: outcome.confidence,
            },
            ActuationCommand::Deny { reason } => Self::Denied { reason },
        }
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkUnavailable => write!(f, "skipped (no link)"),
            Self::CaptureFailed => write!(f, "skipped (no frame)"),
            Self::Granted { label, confidence } => {
                write!(f, "granted to {} ({:.2})", label, confidence)
            }
            Self::Denied { reason } => write!(f, "denied ({})", reason),
        }
    }
}

/// Drives the capture-verify-actuate cycle.
///
/// # Example
///
/// ```no_run
/// use doorlock_controller::AccessController;
/// use doorlock_core::DeviceConfig;
/// use doorlock_hardware::mock::{MockCamera, MockLink, MockPins};
/// use doorlock_network::VerificationClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DeviceConfig::default();
/// let (camera, _) = MockCamera::new();
/// let (link, _) = MockLink::new();
/// let (pins, _) = MockPins::new();
/// let verifier = VerificationClient::new(&config.server)?;
///
/// let mut controller = AccessController::new(&config, camera, verifier, link, pins);
/// controller.start().await?;
/// controller.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AccessController<S, V, L, P> {
    camera: S,
    verifier: V,
    link: LinkManager<L>,
    actuator: Actuator<P>,
    machine: StateMachine,
    capture: CaptureSettings,
    link_timeout: Duration,
    check_interval: Duration,
}

impl<S, V, L, P> AccessController<S, V, L, P>
where
    S: ImageSource,
    V: Verifier,
    L: LinkDevice,
    P: ControlPins,
{
    /// Assemble a controller from its devices. Nothing is touched until
    /// [`start`](Self::start).
    pub fn new(config: &DeviceConfig, camera: S, verifier: V, link: L, pins: P) -> Self {
        Self {
            camera,
            verifier,
            link: LinkManager::new(link, config.link.poll_interval())
                .with_ssid(config.link.ssid.clone()),
            actuator: Actuator::new(pins, config.timing.unlock_duration()),
            machine: StateMachine::new(),
            capture: config.capture.clone(),
            link_timeout: config.link.connect_timeout(),
            check_interval: config.timing.check_interval(),
        }
    }

    /// Bring the device up.
    ///
    /// Drives every output to rest, initializes the camera, tries the link
    /// once and shows the startup pattern. A link that does not come up is
    /// only logged; every cycle retries it.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::CameraInit`] after showing the fault
    /// pattern if the camera cannot be initialized. The device must not
    /// cycle in that case. Output failures are returned as
    /// [`ControllerError::Hardware`].
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting access controller");
        self.actuator.rest().await?;

        if let Err(e) = self.camera.initialize(&self.capture).await {
            error!("Camera init failed: {}", e);
            if let Err(fault) = self.actuator.show_fault().await {
                error!("Failed to show fault pattern: {}", fault);
            }
            return Err(ControllerError::CameraInit(e));
        }

        let info = self.camera.get_info().await?;
        let (width, height) = self.capture.frame_size.dimensions();
        info!(
            camera = %info.name,
            model = %info.model,
            width,
            height,
            quality = self.capture.jpeg_quality,
            "Camera initialized"
        );
        for output in Output::ALL {
            debug!(%output, pin = output.pin(&self.capture.pins), "Output assigned");
        }

        if !self.link.ensure_connected(self.link_timeout).await {
            warn!("Starting without network, each cycle will retry");
        }

        self.actuator.show_startup_ok().await?;
        info!("System ready");
        Ok(())
    }

    /// Run cycles forever, one every check interval.
    ///
    /// A grant's unlock hold delays the next cycle by the hold duration on
    /// top of the interval.
    ///
    /// # Errors
    ///
    /// Only returns on a fatal error, after attempting the fault pattern.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            interval_ms = self.check_interval.as_millis() as u64,
            "Entering access loop"
        );

        loop {
            sleep(self.check_interval).await;

            if let Err(e) = self.run_cycle().await {
                error!("Fatal error, stopping: {}", e);
                if let Err(fault) = self.actuator.show_fault().await {
                    error!("Failed to show fault pattern: {}", fault);
                }
                return Err(e);
            }
        }
    }

    /// Run one complete cycle.
    ///
    /// Skips (without actuating) when the link cannot be established or the
    /// camera yields no frame. Every captured frame is released right after
    /// verification, before any actuation starts. Every verification outcome
    /// ends in a grant or a deny.
    ///
    /// # Errors
    ///
    /// Returns an error for camera faults other than "no frame" and for
    /// output failures. Rest state has been attempted before an actuation
    /// error is returned.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let cycle = Uuid::new_v4();
        let span = info_span!("cycle", %cycle);

        let result = self.cycle().instrument(span).await;
        if result.is_err() && self.machine.current_state() != &ControllerState::Idle {
            self.machine.reset();
        }
        result
    }

    async fn cycle(&mut self) -> Result<CycleReport> {
        debug!("Cycle started");

        if !self.link.ensure_connected(self.link_timeout).await {
            warn!(
                rssi = self.link.signal_quality(),
                "Link unavailable, skipping cycle"
            );
            return Ok(CycleReport::LinkUnavailable);
        }

        self.machine.transition_to(ControllerState::Capturing)?;
        let frame = match self.grab().await? {
            Some(frame) => frame,
            None => {
                warn!("Camera capture failed");
                self.machine.transition_to(ControllerState::Idle)?;
                return Ok(CycleReport::CaptureFailed);
            }
        };
        info!(
            bytes = frame.len(),
            sequence = frame.sequence(),
            "Image captured"
        );

        if let Err(e) = self.machine.transition_to(ControllerState::Verifying) {
            self.camera.release(frame)?;
            return Err(e.into());
        }
        let outcome = self
            .verifier
            .verify(self.link.state(), frame.data())
            .await;
        self.camera.release(frame)?;

        self.machine.transition_to(ControllerState::Actuating)?;
        let command = ActuationCommand::from_outcome(&outcome);
        debug!(%command, "Actuating");
        let actuated = self.actuator.execute(&command).await;
        self.machine.transition_to(ControllerState::Idle)?;
        actuated?;

        let report = CycleReport::from_outcome(&outcome);
        info!("Cycle complete: {}", report);
        Ok(report)
    }

    /// Grab one frame with the flash lit for the configured pulse.
    ///
    /// The flash is driven low again whatever the camera returned.
    async fn grab(&mut self) -> Result<Option<ImageBuffer>> {
        self.actuator.flash_on().await?;
        sleep(self.capture.flash_pulse()).await;
        let grabbed = self.camera.capture().await;

        if let Err(e) = self.actuator.flash_off().await {
            if let Ok(Some(frame)) = grabbed {
                self.camera.release(frame)?;
            }
            return Err(e.into());
        }
        Ok(grabbed?)
    }

    /// Current cycle state.
    pub fn state(&self) -> ControllerState {
        *self.machine.current_state()
    }

    /// Recent state transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    pub fn camera(&self) -> &S {
        &self.camera
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn link(&self) -> &LinkManager<L> {
        &self.link
    }

    pub fn actuator(&self) -> &Actuator<P> {
        &self.actuator
    }
}
