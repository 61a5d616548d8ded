pub mod decay;
pub mod decoder;
pub mod device;
pub mod error;
pub mod geometry;
pub mod session;

pub use decay::DecayTimer;
pub use decoder::{DecodeHints, Frame, FrameDecoder};
pub use device::{DeviceDirectory, MediaDevices, VideoStream};
pub use error::{DecodeError, ScanError};
pub use geometry::OverlayGeometry;
pub use session::{DecodeSession, SessionPhase};
