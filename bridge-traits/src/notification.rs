//! Notification Surface Abstraction
//!
//! The session core keeps a persistent, user-facing notification synchronized
//! with playback state. This module defines the declarative layout the core
//! derives and the thin rendering surface hosts must implement on top of
//! their platform's notification primitives.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The action affordance the notification's primary button should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackAffordance {
    /// Indeterminate progress indicator while connecting.
    Progress,
    /// Pause button while playing.
    Pause,
    /// Play button otherwise.
    Play,
}

/// Click-action bindings the host wires to pending intents (or the platform
/// equivalent). The toggle action maps to pause while playing and resume
/// otherwise; the dismiss action always maps to quit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickAction {
    TogglePlayback,
    Dismiss,
}

/// Declarative notification description derived from session state.
///
/// Hosts render this idempotently: repeated submissions with an unchanged
/// layout must be cheap no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationLayout {
    /// Primary text line (track title, placeholder, or advertisement label).
    pub title: String,
    /// Secondary text line (artist or placeholder).
    pub subtitle: String,
    /// Affordance for the primary button.
    pub affordance: PlaybackAffordance,
    /// Brand layout identifier selecting the host-side view resources.
    pub layout: String,
    /// Brand icon identifier for the affordance button.
    pub icon: String,
    /// Brand icon identifier for the dismiss button.
    pub dismiss_icon: String,
    /// Actions the host must bind, in display order.
    pub actions: Vec<ClickAction>,
}

/// OS notification rendering primitive.
///
/// Must only ever be driven from the single task the presenter is confined
/// to; implementations are not required to be re-entrant.
#[async_trait::async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Construct and display the notification.
    async fn show(&self, layout: NotificationLayout) -> Result<()>;

    /// Update the already-displayed notification in place.
    async fn update(&self, layout: NotificationLayout) -> Result<()>;

    /// Tear the notification down.
    async fn dismiss(&self) -> Result<()>;
}
