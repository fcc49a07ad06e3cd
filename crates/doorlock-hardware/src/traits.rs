//! Hardware device trait definitions.
//!
//! These traits are the contract between the access controller and the
//! peripherals it drives: the camera, the control outputs (relay, LEDs,
//! buzzer) and the network interface. Mock implementations live in
//! [`mock`](crate::mock); hardware drivers implement the same traits.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro. They are therefore not
//! object-safe; use generics, or the enum wrappers in
//! [`devices`](crate::devices) for concrete dispatch.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, ImageBuffer, Level, Output};
use doorlock_core::{CaptureSettings, LinkState};
use std::net::IpAddr;
use std::time::Duration;

/// Camera that yields single-use JPEG frames from a one-slot pool.
///
/// # Buffer Discipline
///
/// Every `Some(buffer)` returned by [`capture`](Self::capture) must be handed
/// back through [`release`](Self::release) exactly once, whatever happened to
/// it in between. A second `capture` while a buffer is outstanding fails with
/// [`HardwareError::BufferExhausted`](crate::HardwareError::BufferExhausted).
///
/// # Examples
///
/// ```no_run
/// use doorlock_hardware::traits::ImageSource;
/// use doorlock_hardware::error::Result;
///
/// async fn frame_size<S: ImageSource>(source: &mut S) -> Result<Option<usize>> {
///     let Some(frame) = source.capture().await? else {
///         return Ok(None);
///     };
///     let len = frame.len();
///     source.release(frame)?;
///     Ok(Some(len))
/// }
/// ```
pub trait ImageSource: Send + Sync {
    /// Configure resolution, compression and pins.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the sensor cannot be brought up.
    /// The device cannot operate without imaging, so callers treat this as
    /// fatal.
    async fn initialize(&mut self, settings: &CaptureSettings) -> Result<()>;

    /// Grab one frame. The caller lights the flash around this call.
    ///
    /// Returns `Ok(None)` when the sensor produced no frame; that is a
    /// transient condition and the next cycle simply tries again.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not initialized, the pool is
    /// exhausted, or the device failed in a way that leaves its state unknown.
    async fn capture(&mut self) -> Result<Option<ImageBuffer>>;

    /// Return a frame to the pool.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBuffer` if the buffer was not checked out from this
    /// source.
    fn release(&mut self, buffer: ImageBuffer) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Digital outputs and tone generator behind the lock, LEDs and buzzer.
pub trait ControlPins: Send + Sync {
    /// Drive an output to a level.
    ///
    /// # Errors
    ///
    /// Returns `OutputFailed` if the level could not be applied.
    async fn write(&mut self, output: Output, level: Level) -> Result<()>;

    /// Play a tone on the buzzer, returning once it has finished.
    ///
    /// # Errors
    ///
    /// Returns `OutputFailed` if the buzzer could not be driven.
    async fn tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<()>;
}

/// Network interface whose status is polled.
///
/// There is no notification mechanism. [`begin`](Self::begin) starts an
/// association and returns immediately; callers poll [`state`](Self::state)
/// until it reports `Connected` or they give up.
pub trait LinkDevice: Send + Sync {
    /// Start (or restart) associating with the configured network.
    ///
    /// Calling this while an association is already in progress or up is
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface refused to start.
    async fn begin(&mut self) -> Result<()>;

    /// Current link status.
    fn state(&self) -> LinkState;

    /// Received signal strength in dBm. Best effort, may be stale.
    fn signal_strength(&self) -> i32;

    /// Address assigned to the interface, if any.
    fn local_addr(&self) -> Option<IpAddr>;
}
