//! Mock network interface.
//!
//! Association completes a configurable time after `begin()` (measured on the
//! tokio clock, so paused-time tests run instantly) or never completes at all.

use crate::{HardwareError, Result, traits::LinkDevice};
use doorlock_core::LinkState;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// How the mock reacts to `begin()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectBehavior {
    /// The link comes up this long after `begin()`.
    After(Duration),

    /// The access point is unreachable.
    Never,

    /// `begin()` itself fails.
    Refuse,
}

#[derive(Debug)]
struct LinkShared {
    behavior: ConnectBehavior,
    up_at: Option<Instant>,
    rssi: i32,
    begin_calls: usize,
}

fn lock(state: &Mutex<LinkShared>) -> MutexGuard<'_, LinkShared> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock network interface.
///
/// # Examples
///
/// ```
/// use doorlock_core::LinkState;
/// use doorlock_hardware::mock::MockLink;
/// use doorlock_hardware::traits::LinkDevice;
///
/// let (link, handle) = MockLink::new();
/// assert_eq!(link.state(), LinkState::Disconnected);
///
/// handle.set_connected();
/// assert_eq!(link.state(), LinkState::Connected);
/// ```
#[derive(Debug)]
pub struct MockLink {
    state: Arc<Mutex<LinkShared>>,
    addr: IpAddr,
}

impl MockLink {
    /// Disconnected interface that connects immediately on `begin()`.
    pub fn new() -> (Self, MockLinkHandle) {
        Self::with_behavior(ConnectBehavior::After(Duration::ZERO))
    }

    /// Disconnected interface with the given association behavior.
    pub fn with_behavior(behavior: ConnectBehavior) -> (Self, MockLinkHandle) {
        let state = Arc::new(Mutex::new(LinkShared {
            behavior,
            up_at: None,
            rssi: -60,
            begin_calls: 0,
        }));

        let link = Self {
            state: Arc::clone(&state),
            addr: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)),
        };

        (link, MockLinkHandle { state })
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new().0
    }
}

impl LinkDevice for MockLink {
    async fn begin(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.begin_calls += 1;

        match state.behavior {
            ConnectBehavior::Refuse => Err(HardwareError::disconnected("mock access point")),
            ConnectBehavior::Never => Ok(()),
            ConnectBehavior::After(delay) => {
                if state.up_at.is_none() {
                    state.up_at = Some(Instant::now() + delay);
                }
                Ok(())
            }
        }
    }

    fn state(&self) -> LinkState {
        let state = lock(&self.state);
        LinkState::from(state.up_at.is_some_and(|at| Instant::now() >= at))
    }

    fn signal_strength(&self) -> i32 {
        lock(&self.state).rssi
    }

    fn local_addr(&self) -> Option<IpAddr> {
        self.state().is_connected().then_some(self.addr)
    }
}

/// Handle for controlling a [`MockLink`].
#[derive(Debug, Clone)]
pub struct MockLinkHandle {
    state: Arc<Mutex<LinkShared>>,
}

impl MockLinkHandle {
    /// Bring the link up now.
    pub fn set_connected(&self) {
        lock(&self.state).up_at = Some(Instant::now());
    }

    /// Drop the link, as if the access point went away.
    pub fn drop_link(&self) {
        lock(&self.state).up_at = None;
    }

    /// Change how future `begin()` calls behave.
    pub fn set_behavior(&self, behavior: ConnectBehavior) {
        lock(&self.state).behavior = behavior;
    }

    /// Set the reported signal strength in dBm.
    pub fn set_signal_strength(&self, rssi: i32) {
        lock(&self.state).rssi = rssi;
    }

    /// Number of `begin()` calls so far.
    pub fn begin_calls(&self) -> usize {
        lock(&self.state).begin_calls
    }
}
