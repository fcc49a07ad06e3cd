//! Error types for hardware operations.
//!
//! Covers the failure scenarios of the door peripherals: camera
//! initialization and capture, frame buffer discipline, control outputs and
//! the network interface.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// The capture device failed for a reason other than "no frame".
    #[error("Capture failed: {message}")]
    CaptureFailed { message: String },

    /// A frame was requested while the only buffer is still checked out.
    #[error("Frame buffer pool exhausted: buffer {outstanding} was never released")]
    BufferExhausted { outstanding: u64 },

    /// A buffer was returned that the pool does not have checked out.
    #[error("Unknown frame buffer {sequence} returned to pool")]
    UnknownBuffer { sequence: u64 },

    /// Writing a control output failed.
    #[error("Output {output} failed: {message}")]
    OutputFailed { output: String, message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new capture failed error.
    pub fn capture_failed(message: impl Into<String>) -> Self {
        Self::CaptureFailed {
            message: message.into(),
        }
    }

    /// Create a new output failure.
    pub fn output_failed(output: impl ToString, message: impl Into<String>) -> Self {
        Self::OutputFailed {
            output: output.to_string(),
            message: message.into(),
        }
    }
}
