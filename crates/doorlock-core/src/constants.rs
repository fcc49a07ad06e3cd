//! Device-level constants for the door lock pipeline.
//!
//! These values are the factory defaults of the lock controller. Every
//! timing and network value here can be overridden through
//! [`DeviceConfig`](crate::DeviceConfig); the reason strings cannot, since
//! operators rely on them to tell failure modes apart.
//!
//! # Usage
//!
//! ```
//! use doorlock_core::constants::*;
//! use std::time::Duration;
//!
//! let hold = Duration::from_millis(DEFAULT_UNLOCK_DURATION_MS);
//! assert_eq!(hold.as_secs(), 5);
//! assert_eq!(LABEL_NO_LINK, "No WiFi");
//! ```

// ============================================================================
// Verification Server
// ============================================================================

/// Default address of the verification server on the local network.
pub const DEFAULT_SERVER_HOST: &str = "192.168.1.100";

/// Default TCP port of the verification server.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Path of the verification endpoint.
pub const DEFAULT_VERIFY_PATH: &str = "/verify";

/// Bound on a single verification request, in milliseconds.
///
/// Covers connect, upload of the encoded frame and the response body. There is
/// no retry once this fires.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// Link
// ============================================================================

/// Maximum time to wait for the link to come up, in milliseconds.
pub const DEFAULT_LINK_TIMEOUT_MS: u64 = 15_000;

/// Interval between link status polls while connecting, in milliseconds.
pub const DEFAULT_LINK_POLL_INTERVAL_MS: u64 = 500;

// ============================================================================
// Cycle Timing
// ============================================================================

/// How long the door stays unlocked after a grant, in milliseconds.
pub const DEFAULT_UNLOCK_DURATION_MS: u64 = 5_000;

/// Idle time before each capture cycle, in milliseconds.
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 3_000;

// ============================================================================
// Capture
// ============================================================================

/// Default JPEG quality (0-63, lower is better quality).
pub const DEFAULT_JPEG_QUALITY: u8 = 12;

/// Highest JPEG quality value accepted by the sensor.
pub const MAX_JPEG_QUALITY: u8 = 63;

/// Duration of the illumination pulse around frame acquisition, in milliseconds.
pub const DEFAULT_FLASH_PULSE_MS: u64 = 50;

// ============================================================================
// Default Pin Assignment
// ============================================================================

/// Relay control pin.
pub const DEFAULT_PIN_LOCK: u8 = 12;

/// Access granted LED.
pub const DEFAULT_PIN_LED_GREEN: u8 = 13;

/// Access denied LED.
pub const DEFAULT_PIN_LED_RED: u8 = 14;

/// Buzzer for audio feedback.
pub const DEFAULT_PIN_BUZZER: u8 = 15;

/// Onboard flash LED.
pub const DEFAULT_PIN_FLASH: u8 = 4;

// ============================================================================
// Feedback Patterns
// ============================================================================

/// Tone played when access is granted: (frequency Hz, duration ms).
pub const GRANT_TONE: (u32, u64) = (1_000, 200);

/// Tone repeated when access is denied: (frequency Hz, duration ms).
pub const DENY_TONE: (u32, u64) = (500, 100);

/// Number of deny tones.
pub const DENY_TONE_COUNT: usize = 3;

/// Silence after each deny tone, in milliseconds.
pub const DENY_TONE_GAP_MS: u64 = 100;

/// How long the red indicator stays lit after the deny tones, in milliseconds.
pub const DENY_HOLD_MS: u64 = 500;

/// Tone closing the startup pattern: (frequency Hz, duration ms).
pub const STARTUP_TONE: (u32, u64) = (1_500, 100);

/// Green blinks in the startup pattern.
pub const STARTUP_BLINKS: usize = 3;

/// Red blinks in the fault pattern.
pub const FAULT_BLINKS: usize = 5;

/// On and off time of a single blink, in milliseconds.
pub const BLINK_INTERVAL_MS: u64 = 100;

// ============================================================================
// Outcome Labels
// ============================================================================

/// Reason shown when verification was skipped because the link is down.
pub const LABEL_NO_LINK: &str = "No WiFi";

/// Reason shown when the request could not complete.
pub const LABEL_CONNECTION_FAILED: &str = "Connection failed";

/// Reason shown when a 2xx body is not the expected JSON object.
pub const LABEL_PARSE_ERROR: &str = "Parse error";

/// Subject label used when the server omits `name`.
pub const LABEL_UNKNOWN_SUBJECT: &str = "Unknown";

/// Prefix of the reason shown for non-2xx responses (`"HTTP 500"`).
pub const LABEL_HTTP_PREFIX: &str = "HTTP";
