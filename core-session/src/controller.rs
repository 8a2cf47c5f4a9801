//! # Playback Session Controller
//!
//! The concurrent state machine at the center of the session core. The
//! controller owns the player engine handle, the current playable source and
//! track, and the session state; it serializes every mutation by funneling
//! all event sources - host commands, engine callbacks, audio-focus signals,
//! headset signals - through a single command queue drained by one task.
//!
//! ## Serialization model
//!
//! No handler blocks waiting on another command. Engine construction and the
//! initial focus request may take unbounded time, so they run on spawned
//! tasks and report back through the same queue; the controller keeps
//! accepting `Stop`/`Quit` in the meantime.
//!
//! ## Generation tags
//!
//! Engine callbacks may arrive after the instance that produced them has been
//! superseded or torn down. Every construction bumps a generation counter and
//! every callback carries the generation of its instance; callbacks whose
//! generation does not match the currently owned instance are discarded
//! without touching state. The same rule hands a late-arriving engine from a
//! superseded start straight to `release()`, which keeps the
//! exactly-one-release invariant even when `Quit` races construction.

use crate::error::SessionError;
use crate::focus::{FocusArbiter, FocusDirective};
use crate::notification::{NotificationModel, NotificationPresenter};
use bridge_traits::engine::{
    CuePoint, EngineEvent, EngineFactory, EngineSettings, EngineState, PlayerEngine,
};
use bridge_traits::focus::{FocusChange, FocusResponse};
use bridge_traits::signals::HeadsetEvent;
use bridge_traits::types::{PlayableSource, SessionState, Track};
use core_runtime::config::SessionConfig;
use core_runtime::events::{EventBus, SessionEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Commands accepted by the controller queue. Host-facing commands are
/// fire-and-forget; the remaining variants are internal deliveries from
/// spawned tasks and signal forwarders.
pub(crate) enum SessionCommand {
    SetSource(PlayableSource),
    Play,
    Pause,
    Resume,
    Stop,
    Quit,
    /// Relative seek in milliseconds (negative seeks backwards).
    Seek(i64),
    /// Absolute seek.
    SeekTo(Duration),
    SetNotificationEnabled(bool),
    GetPosition(oneshot::Sender<Option<Duration>>),
    /// Callback from the engine instance tagged `generation`.
    Engine {
        generation: u64,
        event: EngineEvent,
    },
    /// Outcome of an off-task engine start tagged with its generation.
    EngineReady {
        generation: u64,
        outcome: Result<Box<dyn PlayerEngine>, SessionError>,
    },
    /// Outcome of an off-task focus re-request for a resume.
    ResumeFocus {
        generation: u64,
        response: FocusResponse,
    },
    Focus(FocusChange),
    Headset(HeadsetEvent),
}

/// Why the session is currently paused. Gates auto-resume on focus gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PauseCause {
    /// Host command or headset unplug. Never auto-resumed.
    Explicit,
    /// Permanent focus loss. Never auto-resumed.
    FocusLoss,
    /// Transient focus loss. Auto-resumed on the next focus gain.
    FocusLossTransient,
}

pub(crate) struct SessionController {
    config: SessionConfig,
    engine_factory: Arc<dyn EngineFactory>,
    focus: Arc<FocusArbiter>,
    presenter: NotificationPresenter,
    bus: EventBus,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    /// Weak handle to our own queue, used by spawned tasks. Weak so the
    /// queue closes once the host drops every service handle.
    commands_tx: mpsc::WeakUnboundedSender<SessionCommand>,
    state: SessionState,
    source: Option<PlayableSource>,
    track: Option<Track>,
    engine: Option<Box<dyn PlayerEngine>>,
    generation: u64,
    pause_cause: Option<PauseCause>,
}

impl SessionController {
    pub(crate) fn new(
        config: SessionConfig,
        engine_factory: Arc<dyn EngineFactory>,
        focus: Arc<FocusArbiter>,
        presenter: NotificationPresenter,
        bus: EventBus,
        commands: mpsc::UnboundedReceiver<SessionCommand>,
        commands_tx: mpsc::WeakUnboundedSender<SessionCommand>,
    ) -> Self {
        Self {
            config,
            engine_factory,
            focus,
            presenter,
            bus,
            commands,
            commands_tx,
            state: SessionState::Idle,
            source: None,
            track: None,
            engine: None,
            generation: 0,
            pause_cause: None,
        }
    }

    /// Drain the command queue until every sender is gone, then release
    /// whatever the session still owns (the `onDestroy` path).
    pub(crate) async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.handle(command).await;
        }

        self.teardown_engine().await;
        self.presenter.dismiss().await;
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SetSource(source) => self.set_source(source).await,
            SessionCommand::Play => self.play().await,
            SessionCommand::Pause => self.pause(PauseCause::Explicit).await,
            SessionCommand::Resume => self.resume(),
            SessionCommand::Stop => self.stop().await,
            SessionCommand::Quit => self.quit().await,
            SessionCommand::Seek(delta_ms) => self.seek_relative(delta_ms).await,
            SessionCommand::SeekTo(position) => self.seek_absolute(position).await,
            SessionCommand::SetNotificationEnabled(enabled) => {
                self.set_notification_enabled(enabled).await
            }
            SessionCommand::GetPosition(reply) => {
                let position = match &self.engine {
                    Some(engine) => engine.position().await.ok(),
                    None => None,
                };
                let _ = reply.send(position);
            }
            SessionCommand::Engine { generation, event } => {
                self.on_engine_event(generation, event).await
            }
            SessionCommand::EngineReady {
                generation,
                outcome,
            } => self.on_engine_ready(generation, outcome).await,
            SessionCommand::ResumeFocus {
                generation,
                response,
            } => self.on_resume_focus(generation, response).await,
            SessionCommand::Focus(change) => self.on_focus_change(change).await,
            SessionCommand::Headset(event) => self.on_headset(event).await,
        }
    }

    // ========================================================================
    // Host commands
    // ========================================================================

    async fn set_source(&mut self, source: PlayableSource) {
        self.teardown_engine().await;

        self.publish(SessionEvent::StreamChanged {
            mount: source.mount().to_string(),
        });
        self.source = Some(source);

        self.track = None;
        self.publish(SessionEvent::TrackChanged { track: None });

        self.set_state(SessionState::Idle);
        self.presenter.refresh(&self.model()).await;
    }

    async fn play(&mut self) {
        let Some(source) = self.source.clone() else {
            tracing::debug!("play ignored: no playable source set");
            return;
        };

        // Stop-then-start: the engine does not support source hot-swap, so
        // any previous instance is fully released before a new one exists.
        self.teardown_engine().await;
        let generation = self.generation;

        self.set_state(SessionState::Connecting);
        self.presenter.render(&self.model()).await;

        let Some(commands) = self.commands_tx.upgrade() else {
            return;
        };

        let (engine_events_tx, mut engine_events_rx) = mpsc::unbounded_channel();

        // Engine callbacks fold into the command queue tagged with the
        // generation of the instance that produced them.
        let forward = self.commands_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = engine_events_rx.recv().await {
                let Some(tx) = forward.upgrade() else { break };
                if tx
                    .send(SessionCommand::Engine { generation, event })
                    .is_err()
                {
                    break;
                }
            }
        });

        let settings = self.engine_settings(&source);
        let factory = Arc::clone(&self.engine_factory);
        let focus = Arc::clone(&self.focus);

        // Construction and the initial focus request may take unbounded
        // time; they must not stall the queue, so the outcome comes back as
        // an EngineReady command.
        tokio::spawn(async move {
            let outcome = start_engine(factory, focus, settings, engine_events_tx).await;

            if commands
                .send(SessionCommand::EngineReady {
                    generation,
                    outcome,
                })
                .is_err()
            {
                tracing::debug!("controller gone before engine start completed");
            }
        });
    }

    async fn pause(&mut self, cause: PauseCause) {
        if self.state != SessionState::Playing {
            tracing::debug!(state = ?self.state, "pause ignored: not playing");
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if let Err(err) = engine.pause().await {
            tracing::warn!(error = %err, "engine pause failed");
        }

        self.pause_cause = Some(cause);
        self.set_state(SessionState::Paused);
        self.focus.abandon().await;
        self.presenter.refresh(&self.model()).await;
    }

    fn resume(&mut self) {
        if self.state != SessionState::Paused || self.engine.is_none() {
            tracing::debug!(state = ?self.state, "resume ignored: no paused session");
            return;
        }

        let generation = self.generation;
        let focus = Arc::clone(&self.focus);
        let Some(commands) = self.commands_tx.upgrade() else {
            return;
        };

        // Focus must be granted again before audio restarts; the request
        // runs off-task like the one during start.
        tokio::spawn(async move {
            let response = focus.request().await;
            let _ = commands.send(SessionCommand::ResumeFocus {
                generation,
                response,
            });
        });
    }

    async fn stop(&mut self) {
        let session_active = self.engine.is_some() || self.state == SessionState::Connecting;
        if !session_active {
            tracing::debug!("stop ignored: no session");
            return;
        }

        if self.engine.is_some() {
            if matches!(self.state, SessionState::Playing | SessionState::Connecting) {
                if let Some(engine) = self.engine.as_mut() {
                    if let Err(err) = engine.stop().await {
                        tracing::warn!(error = %err, "engine stop failed");
                    }
                }
            }
        } else {
            // Construction still in flight; superseding the generation makes
            // the eventual hand-off release the instance on arrival.
            self.generation = self.generation.wrapping_add(1);
        }

        self.track = None;
        self.pause_cause = None;
        self.focus.abandon().await;
        self.set_state(SessionState::Stopped);
        self.presenter.refresh(&self.model()).await;
    }

    async fn quit(&mut self) {
        self.teardown_engine().await;
        self.presenter.dismiss().await;
        self.track = None;
        self.source = None;
        self.set_state(SessionState::Idle);
    }

    async fn seek_relative(&mut self, delta_ms: i64) {
        let Some(engine) = self.engine.as_mut() else {
            tracing::debug!("seek ignored: no session");
            return;
        };

        let current = match engine.position().await {
            Ok(position) => position,
            Err(err) => {
                tracing::warn!(error = %err, "position query failed, seek dropped");
                return;
            }
        };

        let target_ms = (current.as_millis() as i64 + delta_ms).max(0) as u64;
        self.seek_engine(Duration::from_millis(target_ms)).await;
    }

    async fn seek_absolute(&mut self, position: Duration) {
        if self.engine.is_none() {
            tracing::debug!("seek ignored: no session");
            return;
        }
        self.seek_engine(position).await;
    }

    async fn seek_engine(&mut self, position: Duration) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        match engine.seek_to(position).await {
            Ok(()) => self.publish(SessionEvent::PlaybackPositionChanged { position }),
            Err(err) => tracing::warn!(error = %err, "engine seek failed"),
        }
    }

    async fn set_notification_enabled(&mut self, enabled: bool) {
        self.presenter.set_enabled(enabled).await;
        if enabled && self.state.is_active() {
            self.presenter.render(&self.model()).await;
        }
    }

    // ========================================================================
    // Engine deliveries
    // ========================================================================

    async fn on_engine_ready(
        &mut self,
        generation: u64,
        outcome: Result<Box<dyn PlayerEngine>, SessionError>,
    ) {
        if generation != self.generation {
            match outcome {
                Ok(engine) => {
                    tracing::debug!(generation, "releasing engine from a superseded start");
                    release_engine(engine).await;
                    // The superseded start may have secured focus after the
                    // teardown abandoned it; give it back unless a newer
                    // session owns it now.
                    if self.engine.is_none() && !self.state.is_active() {
                        self.focus.abandon().await;
                    }
                }
                Err(err) => {
                    tracing::debug!(generation, error = %err, "superseded start had failed anyway")
                }
            }
            return;
        }

        match outcome {
            Ok(engine) => {
                // Connecting until the engine reports otherwise.
                self.engine = Some(engine);
            }
            Err(err) => {
                tracing::warn!(error = %err, "session start failed");
                self.focus.abandon().await;
                self.set_state(SessionState::Error);
                self.presenter.refresh(&self.model()).await;
            }
        }
    }

    async fn on_engine_event(&mut self, generation: u64, event: EngineEvent) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding late engine callback"
            );
            return;
        }

        match event {
            EngineEvent::StateChanged(engine_state) => self.on_engine_state(engine_state).await,
            EngineEvent::CuePoint(cue) => self.on_cue_point(cue).await,
            EngineEvent::Metadata => {}
        }
    }

    async fn on_engine_state(&mut self, engine_state: EngineState) {
        let next = match engine_state {
            EngineState::Connecting => SessionState::Connecting,
            EngineState::Playing => SessionState::Playing,
            EngineState::Paused => SessionState::Paused,
            EngineState::Stopped => SessionState::Stopped,
            EngineState::Completed => SessionState::Completed,
            EngineState::Error => SessionState::Error,
        };

        if next == self.state {
            return;
        }

        if matches!(
            next,
            SessionState::Stopped | SessionState::Completed | SessionState::Error
        ) {
            self.focus.abandon().await;
        }

        if next == SessionState::Playing {
            self.pause_cause = None;
        }

        self.set_state(next);
        self.presenter.refresh(&self.model()).await;
    }

    async fn on_cue_point(&mut self, cue: CuePoint) {
        let track = match cue {
            CuePoint::Track {
                title,
                artist,
                duration,
            } => Track::new(title, artist, duration),
            CuePoint::Ad => Track::advertisement(),
        };

        self.track = Some(track.clone());
        self.presenter.refresh(&self.model()).await;
        self.publish(SessionEvent::TrackChanged { track: Some(track) });
    }

    // ========================================================================
    // Focus and headset deliveries
    // ========================================================================

    async fn on_resume_focus(&mut self, generation: u64, response: FocusResponse) {
        if generation != self.generation || self.state != SessionState::Paused {
            tracing::debug!(generation, "discarding stale resume grant");
            return;
        }

        match response {
            FocusResponse::Granted => {
                let Some(engine) = self.engine.as_mut() else {
                    return;
                };
                if let Err(err) = engine.play().await {
                    tracing::warn!(error = %err, "engine resume failed");
                    return;
                }
                self.pause_cause = None;
                self.set_state(SessionState::Connecting);
                self.presenter.render(&self.model()).await;
            }
            FocusResponse::Denied => {
                tracing::info!("resume denied: audio focus not granted");
            }
        }
    }

    async fn on_focus_change(&mut self, change: FocusChange) {
        match self.focus.observe(change) {
            FocusDirective::PauseForGood => self.pause(PauseCause::FocusLoss).await,
            FocusDirective::PauseTransient => self.pause(PauseCause::FocusLossTransient).await,
            FocusDirective::Resume => {
                if self.state == SessionState::Paused
                    && self.pause_cause == Some(PauseCause::FocusLossTransient)
                {
                    self.resume();
                }
            }
            FocusDirective::NoAction => {}
        }
    }

    async fn on_headset(&mut self, event: HeadsetEvent) {
        match event {
            HeadsetEvent::Unplugged => self.pause(PauseCause::Explicit).await,
            HeadsetEvent::Plugged => {}
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Release the current engine (stopping it first when it is live) and
    /// abandon focus. Bumps the generation so anything still in flight for
    /// the old instance is discarded on arrival.
    async fn teardown_engine(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pause_cause = None;

        if let Some(engine) = self.engine.take() {
            release_engine(engine).await;
        }

        self.focus.abandon().await;
    }

    fn set_state(&mut self, next: SessionState) {
        if next == self.state {
            return;
        }
        tracing::debug!(from = ?self.state, to = ?next, "session state transition");
        self.state = next;
        self.publish(SessionEvent::StateChanged { state: next });
    }

    fn publish(&self, event: SessionEvent) {
        if self.bus.emit(event).is_err() {
            tracing::trace!("no event subscribers registered");
        }
    }

    fn model(&self) -> NotificationModel {
        NotificationModel {
            track: self.track.clone(),
            session_state: self.state,
        }
    }

    fn engine_settings(&self, source: &PlayableSource) -> EngineSettings {
        engine_settings(&self.config, source)
    }
}

/// Resolve the engine settings bundle for a source from the session
/// configuration.
fn engine_settings(config: &SessionConfig, source: &PlayableSource) -> EngineSettings {
    let settings = match source {
        PlayableSource::LiveStream {
            broadcaster_name,
            mount_point,
        } => EngineSettings::for_live_stream(
            config.broadcaster.as_str(),
            broadcaster_name.as_str(),
            mount_point.as_str(),
        ),
        PlayableSource::OnDemandStream { url } => {
            EngineSettings::for_on_demand(config.broadcaster.as_str(), url.as_str())
        }
    };

    settings
        .with_region(config.region.as_str())
        .with_location_tracking(config.location_tracking_enabled)
        .with_ttags(config.ttags.clone())
}

/// Stop a live engine and release it, swallowing bridge failures. Both steps
/// are attempted even if the first fails (best-effort teardown).
async fn release_engine(mut engine: Box<dyn PlayerEngine>) {
    let engine_state = engine.state().await;
    if matches!(
        engine_state,
        EngineState::Connecting | EngineState::Playing | EngineState::Paused
    ) {
        if let Err(err) = engine.stop().await {
            tracing::warn!(error = %err, "engine stop failed during teardown");
        }
    }
    if let Err(err) = engine.release().await {
        tracing::warn!(error = %err, "engine release failed during teardown");
    }
}

/// Construct an engine, secure focus, and start playback. Every failure path
/// releases the instance it constructed, preserving exactly-one-release.
async fn start_engine(
    factory: Arc<dyn EngineFactory>,
    focus: Arc<FocusArbiter>,
    settings: EngineSettings,
    events: mpsc::UnboundedSender<EngineEvent>,
) -> Result<Box<dyn PlayerEngine>, SessionError> {
    let mut engine = factory
        .create(settings, events)
        .await
        .map_err(|err| SessionError::EngineConstructionFailed(err.to_string()))?;

    match focus.request().await {
        FocusResponse::Granted => match engine.play().await {
            Ok(()) => Ok(engine),
            Err(err) => {
                if let Err(release_err) = engine.release().await {
                    tracing::warn!(error = %release_err, "failed to release engine after start failure");
                }
                Err(SessionError::EngineConstructionFailed(err.to_string()))
            }
        },
        FocusResponse::Denied => {
            if let Err(release_err) = engine.release().await {
                tracing::warn!(error = %release_err, "failed to release engine after focus denial");
            }
            Err(SessionError::FocusDenied)
        }
    }
}
