//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback session core and
//! platform-specific implementations. Each trait represents a capability that
//! the core requires but that must be provided differently per platform
//! (desktop, iOS, Android, embedded set-top).
//!
//! ## Traits
//!
//! ### Playback
//! - [`PlayerEngine`](engine::PlayerEngine) - Opaque streaming/decoding engine handle
//! - [`EngineFactory`](engine::EngineFactory) - Constructs engine instances from a settings bundle
//!
//! ### Platform Integration
//! - [`AudioFocus`](focus::AudioFocus) - Exclusive audio-output arbitration
//! - [`NotificationSurface`](notification::NotificationSurface) - Persistent playback notification
//! - [`HeadsetMonitor`](signals::HeadsetMonitor) - Headset plug/unplug signals
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError` and
//! provide actionable error messages.
//!
//! ## Thread Safety
//!
//! Capability traits require `Send + Sync` so adapters can be shared across
//! async tasks; [`PlayerEngine`](engine::PlayerEngine) requires only `Send`
//! because each instance is exclusively owned by the session controller.

pub mod engine;
pub mod error;
pub mod focus;
pub mod notification;
pub mod signals;
pub mod types;

pub use error::BridgeError;

// Re-export commonly used types
pub use engine::{CuePoint, EngineEvent, EngineFactory, EngineSettings, EngineSource, EngineState, PlayerEngine};
pub use focus::{AudioFocus, FocusChange, FocusResponse};
pub use notification::{ClickAction, NotificationLayout, NotificationSurface, PlaybackAffordance};
pub use signals::{HeadsetEvent, HeadsetMonitor};
pub use types::{PlayableSource, SessionState, Track, PLACEHOLDER_TEXT};
