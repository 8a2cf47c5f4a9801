//! # Session Error Types

use thiserror::Error;

/// Errors that can occur while driving a playback session.
///
/// Playback commands are fire-and-forget: these errors are never raised to
/// the caller synchronously. Start failures resolve to
/// `SessionState::Error` and are surfaced through a state-changed event.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The player engine could not be constructed or failed to start.
    #[error("Engine construction failed: {0}")]
    EngineConstructionFailed(String),

    /// The audio-focus request was denied by the operating environment.
    #[error("Audio focus denied")]
    FocusDenied,

    /// The session controller is no longer running.
    #[error("Session controller unavailable")]
    ControllerUnavailable,
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
