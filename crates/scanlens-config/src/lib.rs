use std::env;

use serde::{Deserialize, Serialize};

use self::overlay::OverlayConfig;
use self::replay::ReplayConfig;
use self::scanner::ScannerConfig;

pub mod overlay;
pub mod replay;
pub mod scanner;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub overlay: OverlayConfig,
    pub replay: ReplayConfig,

    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            overlay: OverlayConfig::default(),
            replay: ReplayConfig::default(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply `SCAN_INTERVAL_MS`, `OVERLAY_DECAY_MS` and `LOG_LEVEL` as looked up by `var`.
    /// Unparsable numbers are ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var_u64 = |key: &str| var(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(ms) = var_u64("SCAN_INTERVAL_MS") {
            self.scanner.time_between_scans_ms = ms;
        }

        if let Some(ms) = var_u64("OVERLAY_DECAY_MS") {
            self.overlay.decay_ms = ms;
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use scanlens_types::CodeFormat;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scanner.time_between_scans_ms, 150);
        assert_eq!(
            config.scanner.possible_formats,
            vec![CodeFormat::QrCode, CodeFormat::DataMatrix]
        );
        assert_eq!(config.overlay.decay_ms, 100);
        assert_eq!(config.overlay.min_rect, 20.0);
        assert_eq!(config.overlay.fallback_ratio, 0.4);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "scanner": { "startup_delay_ms": 0 }, "overlay": { "decay_ms": 250 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.scanner.startup_delay_ms, 0);
        assert_eq!(config.scanner.switch_delay_ms, 50);
        assert_eq!(config.overlay.decay_ms, 250);
        assert_eq!(config.overlay.min_rect, 20.0);
        assert!(!config.log_json);
    }

    #[test]
    fn test_formats_parse_snake_case() {
        let json = r#"{ "possible_formats": ["data_matrix"] }"#;
        let scanner: ScannerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(scanner.possible_formats, vec![CodeFormat::DataMatrix]);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let vars = HashMap::from([
            ("SCAN_INTERVAL_MS", "40"),
            ("OVERLAY_DECAY_MS", "500"),
            ("LOG_LEVEL", "debug"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.scanner.time_between_scans_ms, 40);
        assert_eq!(config.overlay.decay_ms, 500);
        assert_eq!(config.log_level, "debug");
        // Untouched sections keep their defaults
        assert_eq!(config.scanner.startup_delay_ms, 200);
    }

    #[test]
    fn test_bad_numbers_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "SCAN_INTERVAL_MS" => Some("fast".to_string()),
            _ => None,
        });

        assert_eq!(config.scanner.time_between_scans_ms, 150);
        assert_eq!(config.overlay.decay_ms, 100);
        assert_eq!(config.log_level, "info");
    }
}
