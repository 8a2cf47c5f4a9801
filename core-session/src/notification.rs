//! # Notification Presenter
//!
//! Derives a declarative notification layout from current session state and
//! renders it idempotently through the host's
//! [`NotificationSurface`](bridge_traits::notification::NotificationSurface).
//!
//! The presenter is confined to the controller task: rendering is the only
//! path that talks to the OS notification surface, and it is never invoked
//! from anywhere else. A notification is "active" once it has been rendered
//! at least once and not explicitly torn down; that flag decides between
//! constructing a new notification and updating the existing one in place.
//! Surface failures are logged and swallowed - a broken notification must
//! never break playback.

use bridge_traits::notification::{
    ClickAction, NotificationLayout, NotificationSurface, PlaybackAffordance,
};
use bridge_traits::types::{SessionState, Track, PLACEHOLDER_TEXT};
use core_runtime::config::BrandTheme;
use std::sync::Arc;

/// Snapshot from which a notification layout is derived.
///
/// Recomputed on every state or track change; never stored authoritatively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationModel {
    pub track: Option<Track>,
    pub session_state: SessionState,
}

/// Renders the persistent playback notification.
pub struct NotificationPresenter {
    surface: Arc<dyn NotificationSurface>,
    theme: BrandTheme,
    enabled: bool,
    active: bool,
}

impl NotificationPresenter {
    /// Create a presenter over the host surface. The brand theme is fixed
    /// for the lifetime of the presenter.
    pub fn new(surface: Arc<dyn NotificationSurface>, theme: BrandTheme, enabled: bool) -> Self {
        Self {
            surface,
            theme,
            enabled,
            active: false,
        }
    }

    /// Whether a notification is currently displayed.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Derive the declarative layout for a model snapshot.
    pub fn layout(&self, model: &NotificationModel) -> NotificationLayout {
        let (title, subtitle) = match &model.track {
            Some(track) if track.is_advertisement => (
                self.theme.advertisement_label.clone(),
                self.theme.advertisement_label.clone(),
            ),
            Some(track) => (track.title.clone(), track.artist.clone()),
            None => (PLACEHOLDER_TEXT.to_string(), PLACEHOLDER_TEXT.to_string()),
        };

        let affordance = match model.session_state {
            SessionState::Connecting => PlaybackAffordance::Progress,
            SessionState::Playing => PlaybackAffordance::Pause,
            _ => PlaybackAffordance::Play,
        };

        let icon = match affordance {
            PlaybackAffordance::Pause => self.theme.icon_pause.clone(),
            _ => self.theme.icon_play.clone(),
        };

        NotificationLayout {
            title,
            subtitle,
            affordance,
            layout: self.theme.layout.clone(),
            icon,
            dismiss_icon: self.theme.icon_dismiss.clone(),
            actions: vec![ClickAction::TogglePlayback, ClickAction::Dismiss],
        }
    }

    /// Render the model: construct the notification if none is active,
    /// update it in place otherwise.
    pub async fn render(&mut self, model: &NotificationModel) {
        if !self.enabled {
            return;
        }

        let layout = self.layout(model);
        let result = if self.active {
            self.surface.update(layout).await
        } else {
            self.surface.show(layout).await
        };

        match result {
            Ok(()) => self.active = true,
            Err(err) => tracing::warn!(error = %err, "notification render failed"),
        }
    }

    /// Update the notification in place, but only if one is active.
    pub async fn refresh(&mut self, model: &NotificationModel) {
        if !self.enabled || !self.active {
            return;
        }

        if let Err(err) = self.surface.update(self.layout(model)).await {
            tracing::warn!(error = %err, "notification refresh failed");
        }
    }

    /// Tear the notification down.
    pub async fn dismiss(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Err(err) = self.surface.dismiss().await {
            tracing::warn!(error = %err, "notification dismiss failed");
        }
    }

    /// Enable or disable presentation. Disabling tears down an active
    /// notification; re-enabling lets the next render reconstruct it.
    pub async fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.dismiss().await;
        }
        self.enabled = enabled;
    }
}
