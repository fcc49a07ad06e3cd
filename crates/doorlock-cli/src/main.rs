//! Door lock device binary.
//!
//! Runs the access controller against the mock devices (emulator mode).
//!
//! ```text
//! doorlock [CONFIG.json] [FRAME.jpg]
//! ```
//!
//! Without a config file the built-in defaults are used. When a frame file is
//! given it is fed to the mock camera once per check interval, so every cycle
//! posts it to the verification server. Log level comes from `RUST_LOG`
//! (default `info`).

use anyhow::{Context, Result};
use doorlock_controller::AccessController;
use doorlock_core::DeviceConfig;
use doorlock_hardware::devices::{AnyControlPins, AnyImageSource, AnyLinkDevice};
use doorlock_hardware::mock::{MockCamera, MockCameraHandle, MockLink, MockPins};
use doorlock_network::VerificationClient;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => DeviceConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => DeviceConfig::default(),
    };

    let frame = match args.next() {
        Some(path) => {
            Some(std::fs::read(&path).with_context(|| format!("Failed to read frame {path}"))?)
        }
        None => None,
    };

    info!(
        version = doorlock_core::VERSION,
        server = %config.server.verify_url(),
        "doorlock starting in emulator mode"
    );

    let (camera, camera_handle) = MockCamera::new();
    let (link, _link_handle) = MockLink::new();
    let (pins, _pins_handle) = MockPins::new();
    let verifier =
        VerificationClient::new(&config.server).context("Failed to build verification client")?;

    match frame {
        Some(frame) => {
            tokio::spawn(feed_frames(
                camera_handle,
                frame,
                config.timing.check_interval(),
            ));
        }
        None => warn!("No frame file given, every capture will come back empty"),
    }

    let mut controller = AccessController::new(
        &config,
        AnyImageSource::Mock(camera),
        verifier,
        AnyLinkDevice::Mock(link),
        AnyControlPins::Mock(pins),
    );

    controller
        .start()
        .await
        .context("Startup failed, device halted")?;

    tokio::select! {
        result = controller.run() => result.context("Access loop stopped")?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

/// Queue the same frame for the mock camera once per interval.
async fn feed_frames(camera: MockCameraHandle, frame: Vec<u8>, interval: Duration) {
    loop {
        if camera.queue_frame(frame.clone()).await.is_err() {
            break;
        }
        tokio::time::sleep(interval).await;
    }
}
