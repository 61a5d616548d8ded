use std::time::Duration;

use scanlens_types::CodeFormat;
use serde::{Deserialize, Serialize};

fn default_possible_formats() -> Vec<CodeFormat> {
    vec![CodeFormat::QrCode, CodeFormat::DataMatrix]
}

fn default_time_between_scans_ms() -> u64 {
    150
}

fn default_startup_delay_ms() -> u64 {
    200
}

fn default_switch_delay_ms() -> u64 {
    50
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// Formats passed to the decoder as hints, fewer means faster frames
    #[serde(default = "default_possible_formats")]
    pub possible_formats: Vec<CodeFormat>,
    /// Minimum spacing between two decode attempts
    #[serde(default = "default_time_between_scans_ms")]
    pub time_between_scans_ms: u64,
    /// Delay before the first default camera start
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
    /// Delay before starting the newly selected camera
    #[serde(default = "default_switch_delay_ms")]
    pub switch_delay_ms: u64,
}

impl ScannerConfig {
    pub fn time_between_scans(&self) -> Duration {
        Duration::from_millis(self.time_between_scans_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn switch_delay(&self) -> Duration {
        Duration::from_millis(self.switch_delay_ms)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            possible_formats: default_possible_formats(),
            time_between_scans_ms: default_time_between_scans_ms(),
            startup_delay_ms: default_startup_delay_ms(),
            switch_delay_ms: default_switch_delay_ms(),
        }
    }
}
