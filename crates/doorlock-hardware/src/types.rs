//! Common types shared across hardware device implementations.
//!
//! This module defines the captured frame buffer, the control outputs driven
//! by the actuator and generic device information.

use bytes::Bytes;
use doorlock_core::PinMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "OV2640", "MockCamera").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// One captured JPEG frame.
///
/// The buffer is borrowed from the image source's pool, which holds a single
/// slot. It is deliberately neither `Clone` nor `Copy`: there is exactly one
/// owner, and ownership goes back to the source through
/// [`ImageSource::release`](crate::traits::ImageSource::release), which
/// consumes it.
#[derive(Debug)]
#[must_use = "captured frames must be released back to the image source"]
pub struct ImageBuffer {
    sequence: u64,
    data: Bytes,
    width: u32,
    height: u32,
    captured_at: chrono::DateTime<chrono::Utc>,
}

impl ImageBuffer {
    /// Wrap a frame produced by a capture device.
    ///
    /// `sequence` identifies the pool slot checkout so the source can check
    /// that what comes back is what it handed out.
    pub fn new(sequence: u64, data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            sequence,
            data: data.into(),
            width,
            height,
            captured_at: chrono::Utc::now(),
        }
    }

    /// Checkout sequence number assigned by the image source.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Encoded (JPEG) bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Frame width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn captured_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.captured_at
    }
}

/// Physical outputs driven by the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    /// Lock relay. High energizes the relay and releases the door.
    LockRelay,

    /// Access granted indicator.
    GreenLed,

    /// Access denied indicator.
    RedLed,

    /// Buzzer.
    Buzzer,

    /// Camera illumination, lit only while a frame is grabbed.
    Flash,
}

impl Output {
    /// All outputs, in the order they are driven to rest.
    pub const ALL: [Output; 5] = [
        Self::LockRelay,
        Self::GreenLed,
        Self::RedLed,
        Self::Buzzer,
        Self::Flash,
    ];

    /// GPIO number assigned to this output.
    pub fn pin(&self, map: &PinMap) -> u8 {
        match self {
            Self::LockRelay => map.lock,
            Self::GreenLed => map.led_green,
            Self::RedLed => map.led_red,
            Self::Buzzer => map.buzzer,
            Self::Flash => map.flash,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockRelay => write!(f, "lock relay"),
            Self::GreenLed => write!(f, "green LED"),
            Self::RedLed => write!(f, "red LED"),
            Self::Buzzer => write!(f, "buzzer"),
            Self::Flash => write!(f, "flash LED"),
        }
    }
}

/// Digital output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Rest level of every output: relay released (door locked), LEDs and
    /// buzzer off.
    #[default]
    Low,
    High,
}

impl Level {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}
