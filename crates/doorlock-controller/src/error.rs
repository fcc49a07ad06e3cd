use doorlock_hardware::HardwareError;
use thiserror::Error;

/// Conditions that stop the controller.
///
/// Per-cycle failures (no link, no frame, rejected or failed verification)
/// are reported through [`CycleReport`](crate::CycleReport) instead.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The camera could not be brought up; the device cannot operate.
    #[error("Camera initialization failed: {0}")]
    CameraInit(#[source] HardwareError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Core(#[from] doorlock_core::Error),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
