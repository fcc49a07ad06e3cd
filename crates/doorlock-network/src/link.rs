//! Bounded-wait connectivity on top of a polled [`LinkDevice`].
//!
//! The interface offers no events, so the manager starts an association and
//! checks the status at a fixed interval until the link is up or the caller's
//! bound runs out. Failures are reported as `false` plus a log line with the
//! interface status and signal strength; nothing here returns an error.

use doorlock_core::LinkState;
use doorlock_hardware::LinkDevice;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Keeps a network interface connected.
///
/// # Example
///
/// ```
/// use doorlock_hardware::mock::MockLink;
/// use doorlock_network::LinkManager;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let (link, _handle) = MockLink::new();
/// let mut manager = LinkManager::new(link, Duration::from_millis(500));
///
/// assert!(manager.ensure_connected(Duration::from_secs(15)).await);
/// # }
/// ```
#[derive(Debug)]
pub struct LinkManager<L> {
    device: L,
    poll_interval: Duration,
    ssid: String,
}

impl<L: LinkDevice> LinkManager<L> {
    /// Wrap an interface, checking its status every `poll_interval` while
    /// waiting for it to come up.
    pub fn new(device: L, poll_interval: Duration) -> Self {
        Self {
            device,
            poll_interval,
            ssid: String::new(),
        }
    }

    /// Name of the network being joined, reported in connection logs.
    pub fn with_ssid(mut self, ssid: impl Into<String>) -> Self {
        self.ssid = ssid.into();
        self
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Make sure the link is up, waiting at most `timeout`.
    ///
    /// Returns `true` immediately when already connected. Otherwise starts
    /// (or restarts) an association and polls until connected (`true`) or
    /// `timeout` has elapsed (`false`). Safe to call repeatedly.
    pub async fn ensure_connected(&mut self, timeout: Duration) -> bool {
        if self.device.state().is_connected() {
            return true;
        }

        info!(
            ssid = %self.ssid,
            "Link down, connecting (timeout {}ms)",
            timeout.as_millis()
        );

        if let Err(e) = self.device.begin().await {
            warn!("Failed to start link association: {}", e);
        }

        let deadline = Instant::now() + timeout;
        loop {
            if self.device.state().is_connected() {
                info!(
                    ssid = %self.ssid,
                    addr = ?self.device.local_addr(),
                    rssi = self.device.signal_strength(),
                    "Link connected"
                );
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            debug!("Waiting for link ({}ms left)", (deadline - now).as_millis());
            sleep(self.poll_interval.min(deadline - now)).await;
        }

        warn!(
            ssid = %self.ssid,
            status = %self.device.state(),
            rssi = self.device.signal_strength(),
            "Link connection timed out after {}ms",
            timeout.as_millis()
        );
        false
    }

    /// Received signal strength in dBm. Best effort.
    pub fn signal_quality(&self) -> i32 {
        self.device.signal_strength()
    }

    /// Current link status, without trying to change it.
    pub fn state(&self) -> LinkState {
        self.device.state()
    }

    /// The wrapped interface.
    pub fn device(&self) -> &L {
        &self.device
    }
}
