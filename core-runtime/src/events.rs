//! # Event Bus System
//!
//! Provides the outward-facing notification channel of the session core using
//! `tokio::sync::broadcast`. The session controller is the only publisher;
//! host bridges subscribe and re-emit to their UI/scripting environment.
//!
//! Events are strongly typed: the original process-wide signal fan-out keyed
//! by string action names is replaced by the [`SessionEvent`] enum, and each
//! event kind is dispatched independently - a subscriber never observes one
//! kind cascading into another.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, SessionEvent};
//! use bridge_traits::SessionState;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(SessionEvent::StateChanged {
//!     state: SessionState::Playing,
//! })
//! .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert!(matches!(event, SessionEvent::StateChanged { .. }));
//! # }
//! ```
//!
//! ## Delivery Guarantees
//!
//! Delivery order equals publish order. Delivery is best effort to
//! currently-registered subscribers: a subscriber registered after an emit
//! misses it (no replay/backlog), and a subscriber that falls behind by more
//! than the buffer capacity receives `RecvError::Lagged`.

use bridge_traits::types::{SessionState, Track, PLACEHOLDER_TEXT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall behind by more than this many events receive
/// `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event Types
// ============================================================================

/// Outward notifications published by the session controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    /// The current playable source changed. `mount` is the mount point for
    /// live streams and the URL for on-demand resources.
    StreamChanged { mount: String },
    /// The current track changed. `None` means no track is known (source
    /// change, stop, or no cue point received yet).
    TrackChanged { track: Option<Track> },
    /// The session transitioned to a new state.
    StateChanged { state: SessionState },
    /// The playback position moved as the result of a seek.
    PlaybackPositionChanged { position: Duration },
}

impl SessionEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            SessionEvent::StreamChanged { .. } => "Playable source changed",
            SessionEvent::TrackChanged { .. } => "Track metadata changed",
            SessionEvent::StateChanged { .. } => "Session state changed",
            SessionEvent::PlaybackPositionChanged { .. } => "Playback position changed",
        }
    }
}

/// Wire shape of a track-changed event with absent-track defaults applied.
///
/// Host bridges deliver track fields with fixed fallbacks when no track is
/// known: `"-"` for text fields, `0` for the duration, `false` for the ad
/// flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackPayload {
    pub artist: String,
    pub title: String,
    pub duration_secs: u64,
    pub is_ad: bool,
}

impl From<Option<&Track>> for TrackPayload {
    fn from(track: Option<&Track>) -> Self {
        match track {
            Some(track) => Self {
                artist: track.artist.clone(),
                title: track.title.clone(),
                duration_secs: track.duration.as_secs(),
                is_ad: track.is_advertisement,
            },
            None => Self {
                artist: PLACEHOLDER_TEXT.to_string(),
                title: PLACEHOLDER_TEXT.to_string(),
                duration_secs: 0,
                is_ad: false,
            },
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to session events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: SessionEvent) -> Result<usize, SendError<SessionEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&SessionEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with predicate filtering.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, SessionEvent};
///
/// let bus = EventBus::new(100);
/// let state_stream = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, SessionEvent::StateChanged { .. }));
/// ```
pub struct EventStream {
    receiver: Receiver<SessionEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<SessionEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter predicate; only matching events are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SessionEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, `RecvError::Closed` once all senders are dropped.
    pub async fn recv(&mut self) -> Result<SessionEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<SessionEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
