use std::sync::Arc;

use kanal::AsyncSender;
use scanlens_types::{AppEvent, Device};

use crate::decoder::Frame;
use crate::error::ScanError;

/// Camera facility the session runs against
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    /// Ordered list of video inputs, may be empty before permission is granted
    async fn list_video_input_devices(&self) -> Result<Vec<Device>, ScanError>;

    /// Open a camera, `None` picks the platform default
    async fn acquire_stream(&self, device_id: Option<&str>)
    -> Result<Box<dyn VideoStream>, ScanError>;
}

/// An acquired camera
#[async_trait::async_trait]
pub trait VideoStream: Send {
    fn device_id(&self) -> &str;

    /// Wait for the next captured frame
    async fn next_frame(&mut self) -> Result<Frame, ScanError>;

    /// Give the camera back. Called exactly once when the session ends.
    fn release(&mut self);
}

/// Enumerates cameras. Errors are never surfaced, an unavailable list is just empty.
#[derive(Clone)]
pub struct DeviceDirectory {
    media: Arc<dyn MediaDevices>,
}

impl DeviceDirectory {
    pub fn new(media: Arc<dyn MediaDevices>) -> Self {
        Self { media }
    }

    pub async fn enumerate(&self) -> Vec<Device> {
        match self.media.list_video_input_devices().await {
            Ok(devices) => {
                tracing::debug!("[DEVICES] found {} video inputs", devices.len());
                devices
            }
            Err(e) => {
                tracing::debug!("[DEVICES] enumeration unavailable: {e}");
                Vec::new()
            }
        }
    }

    /// Enumerate in the background and report the list on `events`
    pub fn spawn_enumeration(&self, events: AsyncSender<AppEvent>) {
        let directory = self.clone();
        tokio::spawn(async move {
            let devices = directory.enumerate().await;
            if let Err(e) = events.send(AppEvent::DevicesEnumerated(devices)).await {
                tracing::debug!("[DEVICES] dropping device list: {e}");
            }
        });
    }
}
