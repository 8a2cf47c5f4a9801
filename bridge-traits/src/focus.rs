//! Audio Focus Abstraction
//!
//! Wraps the operating environment's exclusive-audio-output arbitration. One
//! application at a time holds the right to produce audible output; the rest
//! are told to pause or duck through asynchronous focus-change callbacks.

use crate::error::Result;
use tokio::sync::mpsc;

/// Synchronous outcome of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusResponse {
    /// The caller may start or resume playback.
    Granted,
    /// The caller must remain paused/stopped.
    Denied,
}

/// Asynchronous focus-change signals delivered after a granted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// Focus regained after a transient loss.
    Gain,
    /// Focus lost for good. Treat as a stop-level pause; never auto-resume.
    Loss,
    /// Focus lost temporarily (e.g. an incoming call). Pause, and resume when
    /// [`FocusChange::Gain`] is subsequently delivered.
    LossTransient,
}

/// OS audio-focus primitive.
///
/// `request` returns a synchronous grant/deny result; later loss/gain signals
/// arrive on the channel registered with the request.
#[async_trait::async_trait]
pub trait AudioFocus: Send + Sync {
    /// Request exclusive output focus, registering `changes` as the listener
    /// for subsequent focus-change signals.
    async fn request(&self, changes: mpsc::UnboundedSender<FocusChange>) -> Result<FocusResponse>;

    /// Abandon previously granted focus. Implementations should tolerate
    /// abandon calls without a preceding grant.
    async fn abandon(&self) -> Result<()>;
}
