//! Mock camera implementation for testing and development.
//!
//! Frames are queued through a [`MockCameraHandle`]; an empty queue makes the
//! next capture report "no frame". The pool has a single slot, like the
//! sensor it stands in for, and the handle exposes counters so tests can
//! prove every captured frame went back exactly once.

use crate::{
    HardwareError, Result,
    traits::ImageSource,
    types::{DeviceInfo, ImageBuffer},
};
use doorlock_core::CaptureSettings;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::Instant;

/// Pool and usage counters shared between camera and handle.
#[derive(Debug, Default)]
struct CameraState {
    settings: Option<CaptureSettings>,
    fail_initialization: bool,
    outstanding: Option<u64>,
    next_sequence: u64,
    captures: usize,
    releases: usize,
    empty_captures: usize,
    capture_times: Vec<Instant>,
}

fn lock(state: &Mutex<CameraState>) -> MutexGuard<'_, CameraState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock camera with a one-slot frame pool.
///
/// # Examples
///
/// ```
/// use doorlock_core::CaptureSettings;
/// use doorlock_hardware::mock::MockCamera;
/// use doorlock_hardware::traits::ImageSource;
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut camera, handle) = MockCamera::new();
///     camera.initialize(&CaptureSettings::default()).await?;
///
///     handle.queue_frame(vec![0xFF, 0xD8, 0xFF, 0xD9]).await?;
///
///     let frame = camera.capture().await?.expect("frame queued");
///     assert_eq!(frame.len(), 4);
///     camera.release(frame)?;
///
///     assert_eq!(handle.releases(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCamera {
    frame_rx: mpsc::Receiver<Vec<u8>>,
    name: String,
    state: Arc<Mutex<CameraState>>,
}

impl MockCamera {
    /// Create a new mock camera with the default name.
    pub fn new() -> (Self, MockCameraHandle) {
        Self::with_name("Mock Camera".to_string())
    }

    /// Create a new mock camera with a custom name.
    pub fn with_name(name: String) -> (Self, MockCameraHandle) {
        let (frame_tx, frame_rx) = mpsc::channel(32);
        let state = Arc::new(Mutex::new(CameraState::default()));

        let camera = Self {
            frame_rx,
            name,
            state: Arc::clone(&state),
        };

        let handle = MockCameraHandle { frame_tx, state };

        (camera, handle)
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new().0
    }
}

impl ImageSource for MockCamera {
    async fn initialize(&mut self, settings: &CaptureSettings) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fail_initialization {
            return Err(HardwareError::initialization_failed(format!(
                "{}: sensor not detected",
                self.name
            )));
        }
        state.settings = Some(settings.clone());
        Ok(())
    }

    async fn capture(&mut self) -> Result<Option<ImageBuffer>> {
        let mut state = lock(&self.state);
        if let Some(outstanding) = state.outstanding {
            return Err(HardwareError::BufferExhausted { outstanding });
        }
        let (width, height) = state
            .settings
            .as_ref()
            .map(|settings| settings.frame_size.dimensions())
            .ok_or_else(|| HardwareError::capture_failed("camera not initialized"))?;
        state.capture_times.push(Instant::now());

        match self.frame_rx.try_recv() {
            Ok(data) => {
                let sequence = state.next_sequence;
                state.next_sequence += 1;
                state.outstanding = Some(sequence);
                state.captures += 1;

                Ok(Some(ImageBuffer::new(sequence, data, width, height)))
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                state.empty_captures += 1;
                Ok(None)
            }
        }
    }

    fn release(&mut self, buffer: ImageBuffer) -> Result<()> {
        let mut state = lock(&self.state);
        if state.outstanding != Some(buffer.sequence()) {
            return Err(HardwareError::UnknownBuffer {
                sequence: buffer.sequence(),
            });
        }
        state.outstanding = None;
        state.releases += 1;
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Camera v1.0").with_firmware_version("1.0.0"))
    }
}

/// Handle for feeding frames to a [`MockCamera`] and observing its pool.
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    frame_tx: mpsc::Sender<Vec<u8>>,
    state: Arc<Mutex<CameraState>>,
}

impl MockCameraHandle {
    /// Queue a frame for the next capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped.
    pub async fn queue_frame(&self, data: Vec<u8>) -> Result<()> {
        self.frame_tx
            .send(data)
            .await
            .map_err(|_| HardwareError::disconnected("Camera frame channel closed"))
    }

    /// Make the next `initialize` fail.
    pub fn fail_initialization(&self) {
        lock(&self.state).fail_initialization = true;
    }

    /// Whether `initialize` has succeeded.
    pub fn is_initialized(&self) -> bool {
        lock(&self.state).settings.is_some()
    }

    /// Settings passed to the last successful `initialize`.
    pub fn settings(&self) -> Option<CaptureSettings> {
        lock(&self.state).settings.clone()
    }

    /// Frames handed out.
    pub fn captures(&self) -> usize {
        lock(&self.state).captures
    }

    /// Frames returned.
    pub fn releases(&self) -> usize {
        lock(&self.state).releases
    }

    /// Capture attempts that found no frame.
    pub fn empty_captures(&self) -> usize {
        lock(&self.state).empty_captures
    }

    /// Whether a frame is currently checked out.
    pub fn has_outstanding(&self) -> bool {
        lock(&self.state).outstanding.is_some()
    }

    /// When each capture attempt grabbed (or failed to grab) its frame.
    pub fn capture_times(&self) -> Vec<Instant> {
        lock(&self.state).capture_times.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ready_camera() -> (MockCamera, MockCameraHandle) {
        let (mut camera, handle) = MockCamera::new();
        camera.initialize(&CaptureSettings::default()).await.unwrap();
        (camera, handle)
    }

    #[tokio::test]
    async fn test_capture_and_release() {
        let (mut camera, handle) = ready_camera().await;
        handle.queue_frame(vec![1, 2, 3]).await.unwrap();

        let frame = camera.capture().await.unwrap().unwrap();
        assert_eq!(frame.data(), &[1, 2, 3]);
        assert_eq!(frame.dimensions(), (640, 480));
        assert!(handle.has_outstanding());

        camera.release(frame).unwrap();
        assert!(!handle.has_outstanding());
        assert_eq!(handle.captures(), 1);
        assert_eq!(handle.releases(), 1);
    }

    #[tokio::test]
    async fn test_empty_queue_yields_no_frame() {
        let (mut camera, handle) = ready_camera().await;

        let frame = camera.capture().await.unwrap();
        assert!(frame.is_none());
        assert_eq!(handle.empty_captures(), 1);
        assert!(!handle.has_outstanding());
    }

    #[tokio::test]
    async fn test_pool_exhausted_without_release() {
        let (mut camera, handle) = ready_camera().await;
        handle.queue_frame(vec![1]).await.unwrap();
        handle.queue_frame(vec![2]).await.unwrap();

        let _held = camera.capture().await.unwrap().unwrap();
        let result = camera.capture().await;
        assert!(matches!(
            result,
            Err(HardwareError::BufferExhausted { outstanding: 0 })
        ));
    }

    #[tokio::test]
    async fn test_release_foreign_buffer_rejected() {
        let (mut camera, _handle) = ready_camera().await;

        let foreign = ImageBuffer::new(42, vec![0u8; 4], 640, 480);
        let result = camera.release(foreign);
        assert!(matches!(
            result,
            Err(HardwareError::UnknownBuffer { sequence: 42 })
        ));
    }

    #[tokio::test]
    async fn test_capture_before_initialize_fails() {
        let (mut camera, handle) = MockCamera::new();
        handle.queue_frame(vec![1]).await.unwrap();

        let result = camera.capture().await;
        assert!(matches!(result, Err(HardwareError::CaptureFailed { .. })));
    }

    #[tokio::test]
    async fn test_initialization_failure() {
        let (mut camera, handle) = MockCamera::new();
        handle.fail_initialization();

        let result = camera.initialize(&CaptureSettings::default()).await;
        assert!(matches!(
            result,
            Err(HardwareError::InitializationFailed { .. })
        ));
        assert!(!handle.is_initialized());
    }

    #[tokio::test]
    async fn test_sequences_increase() {
        let (mut camera, handle) = ready_camera().await;
        handle.queue_frame(vec![1]).await.unwrap();
        handle.queue_frame(vec![2]).await.unwrap();

        let first = camera.capture().await.unwrap().unwrap();
        let first_seq = first.sequence();
        camera.release(first).unwrap();

        let second = camera.capture().await.unwrap().unwrap();
        assert_eq!(second.sequence(), first_seq + 1);
        camera.release(second).unwrap();
    }

    #[tokio::test]
    async fn test_get_info() {
        let (camera, _handle) = MockCamera::with_name("Door Cam".to_string());

        let info = camera.get_info().await.unwrap();
        assert_eq!(info.name, "Door Cam");
        assert_eq!(info.model, "Mock Camera v1.0");
    }
}
