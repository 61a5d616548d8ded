use serde::{Deserialize, Serialize};

/// Opaque camera identifier, stable only within one enumeration
pub type DeviceId = String;

/// Monotonic token identifying one decode session start
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub label: String,
}

impl Device {
    /// Label shown in the device selector, falls back to a short id
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            let short: String = self.id.chars().take(8).collect();
            format!("Camera {short}")
        } else {
            self.label.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Code families the decoder is allowed to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeFormat {
    QrCode,
    DataMatrix,
}

/// One successful decode, points are in source frame pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeResult {
    pub text: String,
    pub points: Vec<Point>,
    pub source_width: u32,
    pub source_height: u32,
    pub format: CodeFormat,
}

/// Raw geometry of the last accepted result, kept until the overlay decays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRegion {
    pub points: Option<Vec<Point>>,
    pub source_width: u32,
    pub source_height: u32,
}

impl From<&DecodeResult> for ScanRegion {
    fn from(result: &DecodeResult) -> Self {
        let points = if result.points.is_empty() {
            None
        } else {
            Some(result.points.clone())
        };

        Self {
            points,
            source_width: result.source_width,
            source_height: result.source_height,
        }
    }
}

/// Display space rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Snapshot handed to the display surface
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub scanned_text: Option<String>,
    pub error: Option<String>,
    pub scan_region: Option<ScanRegion>,
    pub devices: Vec<Device>,
    pub selected_device_id: Option<DeviceId>,
    pub is_scanning: bool,
    pub camera_requested: bool,
    pub display_size: DisplaySize,
    /// Highlight rect derived from `scan_region` and `display_size`
    pub overlay: Option<Rect>,
}

impl SessionState {
    /// The selector only makes sense with a choice to make
    pub fn show_device_selector(&self) -> bool {
        self.devices.len() > 1
    }

    pub fn is_selected(&self, device: &Device) -> bool {
        self.selected_device_id.as_deref() == Some(device.id.as_str())
    }

    pub fn hint(&self) -> Option<ScanHint> {
        if self.scanned_text.is_some() {
            return None;
        }

        if self.is_scanning {
            Some(ScanHint::PointCamera)
        } else if self.camera_requested && self.error.is_none() {
            Some(ScanHint::StartingCamera)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanHint {
    StartingCamera,
    PointCamera,
}

impl ScanHint {
    pub fn message(&self) -> &'static str {
        match self {
            ScanHint::StartingCamera => "Starting camera…",
            ScanHint::PointCamera => "Point the camera at a QR code or barcode",
        }
    }
}

/// Outcomes reported by a running decode session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started {
        generation: Generation,
        device_id: Option<DeviceId>,
    },
    Decoded {
        generation: Generation,
        result: DecodeResult,
    },
    FrameError {
        generation: Generation,
        message: String,
    },
    Failed {
        generation: Generation,
        message: String,
    },
}

impl SessionEvent {
    pub fn generation(&self) -> Generation {
        match self {
            SessionEvent::Started { generation, .. }
            | SessionEvent::Decoded { generation, .. }
            | SessionEvent::FrameError { generation, .. }
            | SessionEvent::Failed { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    // Commands from the display surface
    SwitchDevice(DeviceId),
    Reset,
    Resize(DisplaySize),
    RefreshDevices,
    Dispose,

    // Internal
    StartSession {
        generation: Generation,
        device_id: Option<DeviceId>,
    },
    DevicesEnumerated(Vec<Device>),
    Session(SessionEvent),
    OverlayExpired {
        token: u64,
    },
}
