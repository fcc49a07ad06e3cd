//! Device configuration.
//!
//! All sections implement `Default` from [`constants`](crate::constants) and
//! deserialize with `#[serde(default)]`, so a configuration file only needs to
//! mention the values it changes:
//!
//! ```
//! use doorlock_core::DeviceConfig;
//!
//! let config = DeviceConfig::from_json_str(r#"{ "server": { "host": "10.0.0.5" } }"#).unwrap();
//! assert_eq!(config.server.verify_url(), "http://10.0.0.5:5000/verify");
//! assert_eq!(config.timing.unlock_duration_ms, 5000);
//! ```

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete device configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub server: ServerConfig,
    pub link: LinkConfig,
    pub capture: CaptureSettings,
    pub timing: TimingConfig,
}

impl DeviceConfig {
    /// Parse and validate a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed input and `Error::InvalidConfig`
    /// if a value fails [`validate`](Self::validate).
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, otherwise the same
    /// errors as [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check every section for values the device cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first `Error::InvalidConfig` found.
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.link.validate()?;
        self.capture.validate()?;
        self.timing.validate()
    }
}

/// Verification server location and request bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub verify_path: String,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ServerConfig {
    /// Full URL of the verification endpoint.
    #[must_use]
    pub fn verify_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.verify_path)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::invalid_config("server.host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(Error::invalid_config("server.port", "must not be 0"));
        }
        if !self.verify_path.starts_with('/') {
            return Err(Error::invalid_config(
                "server.verify_path",
                format!("must start with '/', got {:?}", self.verify_path),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::invalid_config(
                "server.request_timeout_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Link association parameters.
///
/// Credentials are handled by the platform's network stack; only the network
/// name is kept here for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub ssid: String,
    pub connect_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            connect_timeout_ms: DEFAULT_LINK_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_LINK_POLL_INTERVAL_MS,
        }
    }
}

impl LinkConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(Error::invalid_config(
                "link.connect_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::invalid_config(
                "link.poll_interval_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Sensor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSize {
    /// 320x240
    Qvga,
    /// 640x480
    #[default]
    Vga,
    /// 800x600
    Svga,
    /// 1024x768
    Xga,
    /// 1600x1200
    Uxga,
}

impl FrameSize {
    /// Width and height in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Qvga => (320, 240),
            Self::Vga => (640, 480),
            Self::Svga => (800, 600),
            Self::Xga => (1024, 768),
            Self::Uxga => (1600, 1200),
        }
    }
}

/// GPIO assignment for the control outputs and the flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub lock: u8,
    pub led_green: u8,
    pub led_red: u8,
    pub buzzer: u8,
    pub flash: u8,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            lock: DEFAULT_PIN_LOCK,
            led_green: DEFAULT_PIN_LED_GREEN,
            led_red: DEFAULT_PIN_LED_RED,
            buzzer: DEFAULT_PIN_BUZZER,
            flash: DEFAULT_PIN_FLASH,
        }
    }
}

impl PinMap {
    fn validate(&self) -> Result<()> {
        let mut pins = [self.lock, self.led_green, self.led_red, self.buzzer, self.flash];
        pins.sort_unstable();
        if pins.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(Error::invalid_config(
                "capture.pins",
                "each output needs its own pin",
            ));
        }
        Ok(())
    }
}

/// Settings handed to the image source at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub frame_size: FrameSize,
    pub jpeg_quality: u8,
    pub flash_pulse_ms: u64,
    pub pins: PinMap,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            frame_size: FrameSize::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            flash_pulse_ms: DEFAULT_FLASH_PULSE_MS,
            pins: PinMap::default(),
        }
    }
}

impl CaptureSettings {
    #[must_use]
    pub fn flash_pulse(&self) -> Duration {
        Duration::from_millis(self.flash_pulse_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.jpeg_quality > MAX_JPEG_QUALITY {
            return Err(Error::invalid_config(
                "capture.jpeg_quality",
                format!("must be 0-{MAX_JPEG_QUALITY}, got {}", self.jpeg_quality),
            ));
        }
        self.pins.validate()
    }
}

/// Cycle cadence and unlock hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub unlock_duration_ms: u64,
    pub check_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            unlock_duration_ms: DEFAULT_UNLOCK_DURATION_MS,
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn unlock_duration(&self) -> Duration {
        Duration::from_millis(self.unlock_duration_ms)
    }

    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.unlock_duration_ms == 0 {
            return Err(Error::invalid_config(
                "timing.unlock_duration_ms",
                "must be greater than 0",
            ));
        }
        if self.check_interval_ms == 0 {
            return Err(Error::invalid_config(
                "timing.check_interval_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.server.verify_url(), "http://192.168.1.100:5000/verify");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.link.connect_timeout(), Duration::from_secs(15));
        assert_eq!(config.link.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.capture.frame_size.dimensions(), (640, 480));
        assert_eq!(config.capture.jpeg_quality, 12);
        assert_eq!(config.capture.flash_pulse(), Duration::from_millis(50));
        assert_eq!(config.timing.unlock_duration(), Duration::from_secs(5));
        assert_eq!(config.timing.check_interval(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DeviceConfig::from_json_str(
            r#"{
                "server": { "port": 8080 },
                "capture": { "frame_size": "svga" },
                "timing": { "unlock_duration_ms": 2000 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.host, DEFAULT_SERVER_HOST);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.capture.frame_size, FrameSize::Svga);
        assert_eq!(config.capture.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(config.timing.unlock_duration_ms, 2000);
        assert_eq!(config.timing.check_interval_ms, DEFAULT_CHECK_INTERVAL_MS);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config = DeviceConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        let result = DeviceConfig::from_json_str("{ server: ");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[rstest]
    #[case(r#"{ "server": { "host": "" } }"#, "server.host")]
    #[case(r#"{ "server": { "port": 0 } }"#, "server.port")]
    #[case(r#"{ "server": { "verify_path": "verify" } }"#, "server.verify_path")]
    #[case(r#"{ "server": { "request_timeout_ms": 0 } }"#, "server.request_timeout_ms")]
    #[case(r#"{ "link": { "connect_timeout_ms": 0 } }"#, "link.connect_timeout_ms")]
    #[case(r#"{ "link": { "poll_interval_ms": 0 } }"#, "link.poll_interval_ms")]
    #[case(r#"{ "capture": { "jpeg_quality": 64 } }"#, "capture.jpeg_quality")]
    #[case(r#"{ "capture": { "pins": { "buzzer": 12 } } }"#, "capture.pins")]
    #[case(r#"{ "timing": { "unlock_duration_ms": 0 } }"#, "timing.unlock_duration_ms")]
    #[case(r#"{ "timing": { "check_interval_ms": 0 } }"#, "timing.check_interval_ms")]
    fn test_invalid_values(#[case] json: &str, #[case] expected_field: &str) {
        match DeviceConfig::from_json_str(json) {
            Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidConfig for {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "link": {{ "ssid": "lab" }} }}"#).unwrap();

        let config = DeviceConfig::load(file.path()).unwrap();
        assert_eq!(config.link.ssid, "lab");
    }

    #[test]
    fn test_load_missing_file() {
        let result = DeviceConfig::load("/nonexistent/doorlock.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_roundtrip_serialization() {
        let config = DeviceConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(DeviceConfig::from_json_str(&json).unwrap(), config);
    }
}
