use std::time::Duration;

use scanlens_types::DisplaySize;
use serde::{Deserialize, Serialize};

fn default_decay_ms() -> u64 {
    100
}

fn default_min_rect() -> f64 {
    20.0
}

fn default_fallback_ratio() -> f64 {
    0.4
}

fn default_display_width() -> f64 {
    1280.0
}

fn default_display_height() -> f64 {
    720.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OverlayConfig {
    /// How long the highlight stays on screen
    #[serde(default = "default_decay_ms")]
    pub decay_ms: u64,
    /// Smallest visible highlight side, in display units
    #[serde(default = "default_min_rect")]
    pub min_rect: f64,
    /// Side of the centered fallback square relative to the smaller display side
    #[serde(default = "default_fallback_ratio")]
    pub fallback_ratio: f64,
    #[serde(default = "default_display_width")]
    pub display_width: f64,
    #[serde(default = "default_display_height")]
    pub display_height: f64,
}

impl OverlayConfig {
    pub fn decay(&self) -> Duration {
        Duration::from_millis(self.decay_ms)
    }

    pub fn display_size(&self) -> DisplaySize {
        DisplaySize::new(self.display_width, self.display_height)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            decay_ms: default_decay_ms(),
            min_rect: default_min_rect(),
            fallback_ratio: default_fallback_ratio(),
            display_width: default_display_width(),
            display_height: default_display_height(),
        }
    }
}
