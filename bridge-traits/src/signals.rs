//! Headset plug signals.
//!
//! Optional capability: hosts that can observe wired/bluetooth headset
//! transitions surface them here so the session core can pause playback when
//! audio would otherwise switch to the loudspeaker.

/// A headset plug transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadsetEvent {
    /// Headset unplugged. Pause if playing; never auto-resume.
    Unplugged,
    /// Headset plugged in. No action required.
    Plugged,
}

/// Source of headset plug transitions.
pub trait HeadsetMonitor: Send + Sync {
    /// Subscribe to headset events. Each call returns an independent
    /// receiver; events observed before subscription are not replayed.
    fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<HeadsetEvent>;
}
