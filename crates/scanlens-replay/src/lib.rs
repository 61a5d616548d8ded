//! Recorded camera backend.
//!
//! Plays back a JSON recording of camera sessions: which devices exist, how
//! each camera behaves when opened, and what the decoder saw on every frame.
//! Used by the `scanlens` binary and by the application tests.

mod decoder;
mod media;
mod recording;

pub use decoder::ReplayDecoder;
pub use media::{ReplayMedia, ReplayStream};
pub use recording::{RecordedFrame, Recording, StreamRecording};
