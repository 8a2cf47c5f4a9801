//! Player engine bridge traits and supporting types.
//!
//! The streaming/decoding engine is an opaque collaborator: the session core
//! constructs instances through [`EngineFactory`], drives them through the
//! [`PlayerEngine`] control surface, and consumes their asynchronous callback
//! families ([`EngineEvent`]) through a channel supplied at construction time.
//! Host applications provide concrete implementations backed by whatever
//! native playback stack their platform ships.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// What the engine should connect to: a named live broadcast mount or a
/// direct stream URL. Exactly one of the two, enforced by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSource {
    /// Live broadcast identified by provider-side station name and mount.
    Station { name: String, mount: String },
    /// Direct URL to an on-demand resource.
    Url(String),
}

/// Settings bundle handed to [`EngineFactory::create`].
///
/// Mirrors the configuration surface of provider playback SDKs: the station
/// identity (or stream URL), the service region, and targeting flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Broadcaster name registered with the streaming provider.
    pub broadcaster: String,
    /// The source to connect to.
    pub source: EngineSource,
    /// Provider service region (e.g. "EU").
    pub region: String,
    /// Whether location-based ad targeting is enabled.
    pub location_tracking_enabled: bool,
    /// Targeting tags forwarded verbatim to the provider.
    pub ttags: Vec<String>,
}

impl EngineSettings {
    /// Settings for a live broadcast mount.
    pub fn for_live_stream(
        broadcaster: impl Into<String>,
        name: impl Into<String>,
        mount: impl Into<String>,
    ) -> Self {
        Self {
            broadcaster: broadcaster.into(),
            source: EngineSource::Station {
                name: name.into(),
                mount: mount.into(),
            },
            region: String::new(),
            location_tracking_enabled: false,
            ttags: Vec::new(),
        }
    }

    /// Settings for an on-demand stream URL.
    pub fn for_on_demand(broadcaster: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            broadcaster: broadcaster.into(),
            source: EngineSource::Url(url.into()),
            region: String::new(),
            location_tracking_enabled: false,
            ttags: Vec::new(),
        }
    }

    /// Set the provider service region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Enable or disable location-based targeting.
    pub fn with_location_tracking(mut self, enabled: bool) -> Self {
        self.location_tracking_enabled = enabled;
        self
    }

    /// Set the targeting tags.
    pub fn with_ttags(mut self, ttags: Vec<String>) -> Self {
        self.ttags = ttags;
        self
    }
}

/// Engine-side playback state as reported by state-changed callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    Connecting,
    Playing,
    Paused,
    Stopped,
    Completed,
    Error,
}

/// In-stream metadata marker indicating a track or advertisement boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue_type", rename_all = "snake_case")]
pub enum CuePoint {
    /// A music track boundary with its metadata.
    Track {
        title: String,
        artist: String,
        duration: Duration,
    },
    /// An advertisement break. Ad cues carry no usable metadata.
    Ad,
}

/// Asynchronous callback families delivered by a running engine instance.
///
/// Events are pushed into the channel supplied to [`EngineFactory::create`];
/// the session controller tags them with the generation of the instance that
/// produced them before folding them into its command queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine transitioned to a new playback state.
    StateChanged(EngineState),
    /// An in-stream cue point was reached.
    CuePoint(CuePoint),
    /// Generic provider metadata. Ignored by the session core.
    Metadata,
}

/// Handle to a constructed engine instance.
///
/// Instances are exclusively owned by the session controller; the trait
/// therefore requires only `Send`. [`release`](PlayerEngine::release) must be
/// called exactly once per constructed instance - the controller enforces
/// this with its generation-tag discipline.
#[async_trait::async_trait]
pub trait PlayerEngine: Send {
    /// Begin or resume playback.
    async fn play(&mut self) -> Result<()>;

    /// Pause playback, preserving the position.
    async fn pause(&mut self) -> Result<()>;

    /// Stop playback.
    async fn stop(&mut self) -> Result<()>;

    /// Seek to an absolute position within the stream.
    async fn seek_to(&mut self, position: Duration) -> Result<()>;

    /// Current playback position from the start of the stream.
    async fn position(&self) -> Result<Duration>;

    /// The engine's current view of its own state.
    async fn state(&self) -> EngineState;

    /// Release all native resources held by this instance.
    async fn release(&mut self) -> Result<()>;
}

/// Constructs [`PlayerEngine`] instances.
///
/// Construction may take unbounded time (network negotiation, provider
/// handshakes); callers must not block command processing on it.
#[async_trait::async_trait]
pub trait EngineFactory: Send + Sync {
    /// Construct a new engine for the given settings. Callback events are
    /// delivered on `events` for the lifetime of the instance; senders may be
    /// dropped after `release`.
    async fn create(
        &self,
        settings: EngineSettings,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Box<dyn PlayerEngine>>;
}
