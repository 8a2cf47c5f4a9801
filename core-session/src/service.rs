//! # Player Service Façade
//!
//! Wires host-provided bridge implementations (engine factory, audio focus,
//! notification surface, optional headset monitor) into the session
//! controller and exposes the fire-and-forget command surface host bridges
//! call into.
//!
//! Commands never fail synchronously: start failures surface as a
//! `SessionState::Error` state-changed event on the bus, and invalid
//! commands for the current state are silent no-ops.

use crate::controller::{SessionCommand, SessionController};
use crate::focus::FocusArbiter;
use crate::notification::NotificationPresenter;
use bridge_traits::engine::EngineFactory;
use bridge_traits::focus::AudioFocus;
use bridge_traits::notification::NotificationSurface;
use bridge_traits::signals::{HeadsetEvent, HeadsetMonitor};
use bridge_traits::types::PlayableSource;
use core_runtime::config::SessionConfig;
use core_runtime::events::{EventBus, Receiver, SessionEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Aggregated handle to all bridge dependencies the session core requires.
pub struct SessionDependencies {
    pub engine_factory: Arc<dyn EngineFactory>,
    pub audio_focus: Arc<dyn AudioFocus>,
    pub notification_surface: Arc<dyn NotificationSurface>,
    pub headset_monitor: Option<Arc<dyn HeadsetMonitor>>,
}

impl SessionDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        engine_factory: Arc<dyn EngineFactory>,
        audio_focus: Arc<dyn AudioFocus>,
        notification_surface: Arc<dyn NotificationSurface>,
    ) -> Self {
        Self {
            engine_factory,
            audio_focus,
            notification_surface,
            headset_monitor: None,
        }
    }

    /// Attach an optional headset monitor.
    pub fn with_headset_monitor(mut self, monitor: Arc<dyn HeadsetMonitor>) -> Self {
        self.headset_monitor = Some(monitor);
        self
    }
}

/// Primary façade exposed to host applications.
///
/// Cloneable; every clone commands the same underlying session. Dropping the
/// last clone shuts the session down and releases everything it owns - the
/// orderly way to end a session is still [`quit`](PlayerService::quit).
///
/// Must be spawned inside a Tokio runtime.
#[derive(Clone)]
pub struct PlayerService {
    commands: mpsc::UnboundedSender<SessionCommand>,
    bus: EventBus,
}

impl PlayerService {
    /// Spawn the session controller and its signal forwarders.
    pub fn spawn(config: SessionConfig, deps: SessionDependencies) -> Self {
        let bus = EventBus::new(config.event_buffer);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let weak = commands_tx.downgrade();

        // Focus-change signals fold into the command queue alongside
        // everything else; the arbiter hands this sender to the primitive on
        // every request.
        let (focus_tx, mut focus_rx) = mpsc::unbounded_channel();
        let focus = Arc::new(FocusArbiter::new(Arc::clone(&deps.audio_focus), focus_tx));
        {
            let forward = weak.clone();
            tokio::spawn(async move {
                while let Some(change) = focus_rx.recv().await {
                    let Some(tx) = forward.upgrade() else { break };
                    if tx.send(SessionCommand::Focus(change)).is_err() {
                        break;
                    }
                }
            });
        }

        if let Some(monitor) = &deps.headset_monitor {
            let mut headset_rx = monitor.subscribe();
            let forward = weak.clone();
            tokio::spawn(async move {
                while let Some(event) = headset_rx.recv().await {
                    let Some(tx) = forward.upgrade() else { break };
                    if tx.send(SessionCommand::Headset(event)).is_err() {
                        break;
                    }
                }
            });
        }

        let presenter = NotificationPresenter::new(
            Arc::clone(&deps.notification_surface),
            config.brand_theme.clone(),
            config.notification_enabled,
        );

        let controller = SessionController::new(
            config,
            Arc::clone(&deps.engine_factory),
            focus,
            presenter,
            bus.clone(),
            commands_rx,
            weak,
        );
        tokio::spawn(controller.run());

        Self {
            commands: commands_tx,
            bus,
        }
    }

    /// Play a named live broadcast mount, superseding any current session.
    pub fn play(&self, broadcaster_name: impl Into<String>, mount_point: impl Into<String>) {
        self.send(SessionCommand::SetSource(PlayableSource::live(
            broadcaster_name,
            mount_point,
        )));
        self.send(SessionCommand::Play);
    }

    /// Play an on-demand stream URL, superseding any current session.
    pub fn play_on_demand(&self, url: impl Into<String>) {
        self.send(SessionCommand::SetSource(PlayableSource::on_demand(url)));
        self.send(SessionCommand::Play);
    }

    /// Pause playback. No-op unless currently playing.
    pub fn pause(&self) {
        self.send(SessionCommand::Pause);
    }

    /// Resume paused playback. Focus is re-requested first; when denied the
    /// session stays paused.
    pub fn resume(&self) {
        self.send(SessionCommand::Resume);
    }

    /// Stop playback, keeping the source so a later `play` can restart it.
    pub fn stop(&self) {
        self.send(SessionCommand::Stop);
    }

    /// Seek by a relative offset in milliseconds (negative seeks backwards,
    /// clamped at the stream start). No-op without an active session.
    pub fn seek(&self, offset_ms: i64) {
        self.send(SessionCommand::Seek(offset_ms));
    }

    /// Seek to an absolute position in milliseconds. No-op without an active
    /// session.
    pub fn seek_to(&self, position_ms: u64) {
        self.send(SessionCommand::SeekTo(Duration::from_millis(position_ms)));
    }

    /// End the session: stop, tear down the notification, and release the
    /// engine entirely.
    pub fn quit(&self) {
        self.send(SessionCommand::Quit);
    }

    /// Enable or disable the persistent notification.
    pub fn set_notification_enabled(&self, enabled: bool) {
        self.send(SessionCommand::SetNotificationEnabled(enabled));
    }

    /// Inject a headset plug transition. Hosts without a
    /// [`HeadsetMonitor`](bridge_traits::signals::HeadsetMonitor) bridge can
    /// forward their platform signal here directly.
    pub fn headset_changed(&self, event: HeadsetEvent) {
        self.send(SessionCommand::Headset(event));
    }

    /// Current playback position in milliseconds, `-1` when no session
    /// exists.
    pub async fn current_position_ms(&self) -> i64 {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::GetPosition(reply_tx))
            .is_err()
        {
            return -1;
        }

        match reply_rx.await {
            Ok(Some(position)) => position.as_millis() as i64,
            _ => -1,
        }
    }

    /// Subscribe to session events. Events published before the subscription
    /// are not replayed.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    fn send(&self, command: SessionCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("session controller is no longer running");
        }
    }
}
