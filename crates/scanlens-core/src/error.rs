/// Failures at the camera and session boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera stream ended")]
    StreamEnded,

    #[error("Decode session cannot start while {0}")]
    NotIdle(&'static str),
}

impl ScanError {
    /// Text placed into the session snapshot
    pub fn user_message(&self) -> String {
        match self {
            ScanError::CameraUnavailable(reason) if reason.trim().is_empty() => {
                "Failed to start camera".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Per-frame decode outcomes other than a result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Expected for most frames, never surfaced
    #[error("No code found in frame")]
    NotFound,

    #[error("Decode failed: {0}")]
    Failed(String),
}
