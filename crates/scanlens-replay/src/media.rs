use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use scanlens_core::{Frame, MediaDevices, ScanError, VideoStream};
use scanlens_types::{Device, DeviceId};

use crate::recording::Recording;

/// Camera facility backed by a recording
pub struct ReplayMedia {
    recording: Arc<Recording>,
    frame_interval: Duration,
    permission_granted: AtomicBool,
}

impl ReplayMedia {
    pub fn new(recording: Arc<Recording>, frame_interval: Duration) -> Self {
        Self {
            recording,
            frame_interval,
            permission_granted: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl MediaDevices for ReplayMedia {
    async fn list_video_input_devices(&self) -> Result<Vec<Device>, ScanError> {
        if self.recording.permission_denied {
            return Ok(Vec::new());
        }

        if self.recording.hide_devices_until_acquired
            && !self.permission_granted.load(Ordering::SeqCst)
        {
            return Ok(Vec::new());
        }

        Ok(self.recording.devices.clone())
    }

    async fn acquire_stream(
        &self,
        device_id: Option<&str>,
    ) -> Result<Box<dyn VideoStream>, ScanError> {
        if self.recording.permission_denied {
            return Err(ScanError::PermissionDenied);
        }

        let id = self
            .recording
            .resolve_device(device_id)
            .ok_or_else(|| ScanError::CameraUnavailable("no camera found".to_string()))?;

        let stream = self
            .recording
            .streams
            .get(&id)
            .ok_or_else(|| ScanError::CameraUnavailable(format!("unknown camera {id}")))?;

        tokio::time::sleep(stream.acquire_delay()).await;

        if let Some(reason) = &stream.unavailable {
            return Err(ScanError::CameraUnavailable(reason.clone()));
        }

        self.permission_granted.store(true, Ordering::SeqCst);
        tracing::info!("[REPLAY] opened camera {id} ({}x{})", stream.width, stream.height);

        Ok(Box::new(ReplayStream {
            recording: self.recording.clone(),
            device_id: id,
            frame_interval: self.frame_interval,
            sequence: 0,
            released: false,
        }))
    }
}

/// Plays one recorded stream frame by frame
pub struct ReplayStream {
    recording: Arc<Recording>,
    device_id: DeviceId,
    frame_interval: Duration,
    sequence: u64,
    released: bool,
}

#[async_trait::async_trait]
impl VideoStream for ReplayStream {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    async fn next_frame(&mut self) -> Result<Frame, ScanError> {
        if self.released {
            return Err(ScanError::StreamEnded);
        }

        let stream = self
            .recording
            .streams
            .get(&self.device_id)
            .ok_or(ScanError::StreamEnded)?;

        if !stream.looped && self.sequence >= stream.frames.len() as u64 {
            return Err(ScanError::StreamEnded);
        }

        tokio::time::sleep(self.frame_interval).await;
        self.sequence += 1;

        Ok(Frame {
            device_id: self.device_id.clone(),
            sequence: self.sequence,
            width: stream.width,
            height: stream.height,
            // ReplayDecoder looks frames up by sequence, no pixels needed
            luma: Vec::new(),
        })
    }

    fn release(&mut self) {
        if !self.released {
            tracing::debug!("[REPLAY] released camera {}", self.device_id);
            self.released = true;
        }
    }
}
