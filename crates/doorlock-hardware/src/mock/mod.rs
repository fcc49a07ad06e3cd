//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware.

pub mod camera;
pub mod link;
pub mod pins;

// Re-export commonly used types
pub use camera::{MockCamera, MockCameraHandle};
pub use link::{ConnectBehavior, MockLink, MockLinkHandle};
pub use pins::{MockPins, MockPinsHandle, PinEvent};
