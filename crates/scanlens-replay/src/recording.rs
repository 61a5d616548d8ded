use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use scanlens_types::{CodeFormat, Device, DeviceId, Point};
use serde::Deserialize;

fn default_looped() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub devices: Vec<Device>,
    /// Camera opened when no device is requested
    #[serde(default)]
    pub default_device: Option<DeviceId>,
    /// Every acquisition fails with a permission error
    #[serde(default)]
    pub permission_denied: bool,
    /// Device list stays empty until a camera was opened once
    #[serde(default)]
    pub hide_devices_until_acquired: bool,
    #[serde(default)]
    pub streams: HashMap<DeviceId, StreamRecording>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamRecording {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub acquire_delay_ms: u64,
    /// Acquisition fails with this reason
    #[serde(default)]
    pub unavailable: Option<String>,
    #[serde(default)]
    pub frames: Vec<RecordedFrame>,
    /// Start over after the last frame instead of ending the stream
    #[serde(default = "default_looped")]
    pub looped: bool,
}

impl StreamRecording {
    pub fn acquire_delay(&self) -> Duration {
        Duration::from_millis(self.acquire_delay_ms)
    }

    /// Frame for a 1-based sequence number, wrapping when looped
    pub fn frame(&self, sequence: u64) -> Option<&RecordedFrame> {
        if self.frames.is_empty() || sequence == 0 {
            return None;
        }

        let index = (sequence - 1) as usize;
        if self.looped {
            self.frames.get(index % self.frames.len())
        } else {
            self.frames.get(index)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedFrame {
    Empty,
    Code {
        text: String,
        #[serde(default)]
        points: Vec<Point>,
        format: CodeFormat,
    },
    Error {
        message: String,
    },
}

impl Recording {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let recording: Recording =
            serde_json::from_str(json).context("Failed to parse recording")?;
        Ok(recording)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading recording from {}", path.display());
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording {}", path.display()))?;
        Self::from_json(&data)
    }

    /// Device opened for a request, falling back to the default then the first known camera
    pub fn resolve_device(&self, requested: Option<&str>) -> Option<DeviceId> {
        if let Some(id) = requested {
            return Some(id.to_string());
        }

        self.default_device
            .clone()
            .or_else(|| self.devices.first().map(|d| d.id.clone()))
            .or_else(|| {
                let mut ids: Vec<&DeviceId> = self.streams.keys().collect();
                ids.sort();
                ids.first().map(|id| (*id).clone())
            })
    }
}
