//! Hardware device abstraction layer for the door lock controller.
//!
//! This crate defines the peripherals the access pipeline drives, as traits
//! with mock and (future) hardware implementations:
//!
//! - [`ImageSource`]: camera yielding single-use [`ImageBuffer`]s from a
//!   one-slot pool.
//! - [`ControlPins`]: lock relay, indicators, buzzer and camera flash.
//! - [`LinkDevice`]: polled network interface.
//!
//! On top of [`ControlPins`] sits the [`Actuator`], which owns all physical
//! feedback timing.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Single owner**: Frame buffers move into `release`; a frame cannot be
//!   returned twice.
//! - **Error-aware**: All fallible operations return `Result<T>` with
//!   [`HardwareError`].
//!
//! # Example
//!
//! ```no_run
//! use doorlock_hardware::traits::ImageSource;
//! use doorlock_hardware::error::Result;
//!
//! async fn grab<S: ImageSource>(camera: &mut S) -> Result<()> {
//!     if let Some(frame) = camera.capture().await? {
//!         println!("captured {} bytes", frame.len());
//!         camera.release(frame)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`ImageSource`]: traits::ImageSource
//! [`ControlPins`]: traits::ControlPins
//! [`LinkDevice`]: traits::LinkDevice

pub mod actuator;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use actuator::Actuator;
pub use error::{HardwareError, Result};
pub use traits::{ControlPins, ImageSource, LinkDevice};
pub use types::{DeviceInfo, ImageBuffer, Level, Output};
