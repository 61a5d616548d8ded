use std::sync::Arc;

use scanlens_core::{DecodeError, DecodeHints, Frame, FrameDecoder};
use scanlens_types::DecodeResult;

use crate::recording::{RecordedFrame, Recording};

/// Reports whatever the recording says was visible on a frame
pub struct ReplayDecoder {
    recording: Arc<Recording>,
}

impl ReplayDecoder {
    pub fn new(recording: Arc<Recording>) -> Self {
        Self { recording }
    }
}

impl FrameDecoder for ReplayDecoder {
    fn decode(&self, frame: &Frame, hints: &DecodeHints) -> Result<DecodeResult, DecodeError> {
        let recorded = self
            .recording
            .streams
            .get(&frame.device_id)
            .and_then(|stream| stream.frame(frame.sequence));

        match recorded {
            Some(RecordedFrame::Code {
                text,
                points,
                format,
            }) if hints.allows(*format) => Ok(DecodeResult {
                text: text.clone(),
                points: points.clone(),
                source_width: frame.width,
                source_height: frame.height,
                format: *format,
            }),
            Some(RecordedFrame::Error { message }) => Err(DecodeError::Failed(message.clone())),
            _ => Err(DecodeError::NotFound),
        }
    }
}
