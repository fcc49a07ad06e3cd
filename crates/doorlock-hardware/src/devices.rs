//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so `Box<dyn ImageSource>` is not available. These enums give
//! the device binary a single concrete type per peripheral while each variant
//! keeps static dispatch.
//!
//! # Examples
//!
//! ```
//! use doorlock_hardware::devices::AnyImageSource;
//! use doorlock_hardware::mock::MockCamera;
//!
//! let (camera, _handle) = MockCamera::new();
//! let source = AnyImageSource::Mock(camera);
//! ```

use crate::mock::{MockCamera, MockLink, MockPins};
use crate::traits::{ControlPins, ImageSource, LinkDevice};
use crate::{DeviceInfo, ImageBuffer, Level, Output, Result};
use doorlock_core::{CaptureSettings, LinkState};
use std::net::IpAddr;
use std::time::Duration;

/// Enum wrapper for camera dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyImageSource {
    /// Mock camera for development and testing.
    Mock(MockCamera),
    // TODO: Add an `Esp32Cam` variant behind the `hardware-esp32` feature
    // once the esp-idf camera driver bindings are vendored.
}

impl ImageSource for AnyImageSource {
    async fn initialize(&mut self, settings: &CaptureSettings) -> Result<()> {
        match self {
            Self::Mock(device) => device.initialize(settings).await,
        }
    }

    async fn capture(&mut self) -> Result<Option<ImageBuffer>> {
        match self {
            Self::Mock(device) => device.capture().await,
        }
    }

    fn release(&mut self, buffer: ImageBuffer) -> Result<()> {
        match self {
            Self::Mock(device) => device.release(buffer),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for control output dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyControlPins {
    /// Mock outputs for development and testing.
    Mock(MockPins),
}

impl ControlPins for AnyControlPins {
    async fn write(&mut self, output: Output, level: Level) -> Result<()> {
        match self {
            Self::Mock(device) => device.write(output, level).await,
        }
    }

    async fn tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<()> {
        match self {
            Self::Mock(device) => device.tone(frequency_hz, duration).await,
        }
    }
}

/// Enum wrapper for network interface dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyLinkDevice {
    /// Mock interface for development and testing.
    Mock(MockLink),
}

impl LinkDevice for AnyLinkDevice {
    async fn begin(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.begin().await,
        }
    }

    fn state(&self) -> LinkState {
        match self {
            Self::Mock(device) => device.state(),
        }
    }

    fn signal_strength(&self) -> i32 {
        match self {
            Self::Mock(device) => device.signal_strength(),
        }
    }

    fn local_addr(&self) -> Option<IpAddr> {
        match self {
            Self::Mock(device) => device.local_addr(),
        }
    }
}
