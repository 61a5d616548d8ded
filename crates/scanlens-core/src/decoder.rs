use scanlens_types::{CodeFormat, DecodeResult, DeviceId};

use crate::error::DecodeError;

/// One captured frame.
///
/// `luma` holds 8-bit grayscale pixels, row-major, `width * height` long.
/// Backends that resolve outcomes by `sequence` (the replay decoder) leave it
/// empty.
#[derive(Debug, Clone)]
pub struct Frame {
    pub device_id: DeviceId,
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

/// Restricts what the decoder may report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeHints {
    pub possible_formats: Vec<CodeFormat>,
}

impl DecodeHints {
    pub fn new(possible_formats: Vec<CodeFormat>) -> Self {
        Self { possible_formats }
    }

    pub fn allows(&self, format: CodeFormat) -> bool {
        self.possible_formats.contains(&format)
    }
}

impl Default for DecodeHints {
    fn default() -> Self {
        Self::new(vec![CodeFormat::QrCode, CodeFormat::DataMatrix])
    }
}

/// Decode primitive, called once per frame from a blocking worker
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, frame: &Frame, hints: &DecodeHints) -> Result<DecodeResult, DecodeError>;
}
