use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_recording_path() -> PathBuf {
    PathBuf::from("recording.json")
}

fn default_frame_interval_ms() -> u64 {
    33
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReplayConfig {
    /// Recording used as the camera and decoder backend
    #[serde(default = "default_recording_path")]
    pub recording_path: PathBuf,
    /// Simulated camera frame period
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            recording_path: default_recording_path(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}
