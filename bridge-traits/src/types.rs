//! Domain value types shared between the session core and host bridges.
//!
//! These are immutable descriptors: the controller owns the current instances
//! and hands read-only snapshots to the notification presenter and the event
//! bus. None of them carry behavior beyond simple accessors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Display placeholder used wherever no track metadata is known yet.
pub const PLACEHOLDER_TEXT: &str = "-";

/// Descriptor of what can be played.
///
/// At most one source is "current" at any time; setting a new one always
/// supersedes and invalidates the previous session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayableSource {
    /// A named live broadcast mount.
    LiveStream {
        /// Station name as registered with the streaming provider.
        broadcaster_name: String,
        /// Mount point identifying the stream on the provider side.
        mount_point: String,
    },
    /// A playable resource addressed by a direct URL.
    OnDemandStream { url: String },
}

impl PlayableSource {
    /// Create a live-stream source.
    pub fn live(broadcaster_name: impl Into<String>, mount_point: impl Into<String>) -> Self {
        Self::LiveStream {
            broadcaster_name: broadcaster_name.into(),
            mount_point: mount_point.into(),
        }
    }

    /// Create an on-demand source.
    pub fn on_demand(url: impl Into<String>) -> Self {
        Self::OnDemandStream { url: url.into() }
    }

    /// Returns `true` for live broadcast mounts.
    pub fn is_live(&self) -> bool {
        matches!(self, PlayableSource::LiveStream { .. })
    }

    /// The identifier published in stream-changed events: the mount point for
    /// live streams, the URL for on-demand resources.
    pub fn mount(&self) -> &str {
        match self {
            PlayableSource::LiveStream { mount_point, .. } => mount_point,
            PlayableSource::OnDemandStream { url } => url,
        }
    }
}

/// Track metadata produced by engine cue-point callbacks.
///
/// Replaced wholesale on every metadata cue; cleared whenever the source
/// changes or playback stops. `Option<Track>` represents "no track known yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub duration: Duration,
    pub is_advertisement: bool,
}

impl Track {
    /// Create a regular track from cue-point metadata.
    pub fn new(title: impl Into<String>, artist: impl Into<String>, duration: Duration) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            duration,
            is_advertisement: false,
        }
    }

    /// Create the marker track representing an advertisement break. Ad cues
    /// carry no title/artist metadata.
    pub fn advertisement() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            duration: Duration::ZERO,
            is_advertisement: true,
        }
    }
}

/// Top-level session state owned by the playback session controller.
///
/// Exactly one value at a time. The explicit discriminants are the integer
/// codes delivered to hosts in state-changed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Idle = 0,
    Connecting = 1,
    Playing = 2,
    Paused = 3,
    Stopped = 4,
    Completed = 5,
    Error = 6,
}

impl SessionState {
    /// Integer code of this state as published to hosts.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Returns `true` when a live engine instance is expected to exist and be
    /// producing (or about to produce) audio.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Connecting | SessionState::Playing | SessionState::Paused
        )
    }
}
