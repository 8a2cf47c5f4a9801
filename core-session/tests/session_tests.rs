//! End-to-end tests for the playback session controller, driven through the
//! public service façade against mock engine, focus, and notification
//! bridges.

use bridge_traits::engine::{
    CuePoint, EngineEvent, EngineFactory, EngineSettings, EngineState, PlayerEngine,
};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::focus::{AudioFocus, FocusChange, FocusResponse};
use bridge_traits::notification::{NotificationLayout, NotificationSurface, PlaybackAffordance};
use bridge_traits::signals::{HeadsetEvent, HeadsetMonitor};
use bridge_traits::types::SessionState;
use core_runtime::config::SessionConfig;
use core_runtime::events::{Receiver, SessionEvent};
use core_session::service::{PlayerService, SessionDependencies};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Mock Player Engine
// ============================================================================

struct EngineProbe {
    plays: AtomicUsize,
    pauses: AtomicUsize,
    stops: AtomicUsize,
    releases: AtomicUsize,
    position: Mutex<Duration>,
    seeks: Mutex<Vec<Duration>>,
    state: Mutex<EngineState>,
}

impl EngineProbe {
    fn new() -> Self {
        Self {
            plays: AtomicUsize::new(0),
            pauses: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            position: Mutex::new(Duration::ZERO),
            seeks: Mutex::new(Vec::new()),
            state: Mutex::new(EngineState::Connecting),
        }
    }

    fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    fn set_position(&self, position: Duration) {
        *self.position.lock() = position;
    }
}

struct TestEngine {
    probe: Arc<EngineProbe>,
}

#[async_trait::async_trait]
impl PlayerEngine for TestEngine {
    async fn play(&mut self) -> BridgeResult<()> {
        self.probe.plays.fetch_add(1, Ordering::SeqCst);
        *self.probe.state.lock() = EngineState::Connecting;
        Ok(())
    }

    async fn pause(&mut self) -> BridgeResult<()> {
        self.probe.pauses.fetch_add(1, Ordering::SeqCst);
        *self.probe.state.lock() = EngineState::Paused;
        Ok(())
    }

    async fn stop(&mut self) -> BridgeResult<()> {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        *self.probe.state.lock() = EngineState::Stopped;
        Ok(())
    }

    async fn seek_to(&mut self, position: Duration) -> BridgeResult<()> {
        self.probe.seeks.lock().push(position);
        *self.probe.position.lock() = position;
        Ok(())
    }

    async fn position(&self) -> BridgeResult<Duration> {
        Ok(*self.probe.position.lock())
    }

    async fn state(&self) -> EngineState {
        *self.probe.state.lock()
    }

    async fn release(&mut self) -> BridgeResult<()> {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone)]
struct CreatedEngine {
    probe: Arc<EngineProbe>,
    events: mpsc::UnboundedSender<EngineEvent>,
    settings: EngineSettings,
}

impl CreatedEngine {
    fn emit_state(&self, state: EngineState) {
        let _ = self.events.send(EngineEvent::StateChanged(state));
    }

    fn emit_cue(&self, cue: CuePoint) {
        let _ = self.events.send(EngineEvent::CuePoint(cue));
    }

    fn plays(&self) -> usize {
        self.probe.plays()
    }
}

struct TestEngineFactory {
    created: Mutex<Vec<CreatedEngine>>,
    fail_message: Mutex<Option<String>>,
    construction_delay: Mutex<Option<Duration>>,
    /// Set when a new engine is constructed while a previous instance has
    /// not been released yet.
    overlap: AtomicBool,
}

impl TestEngineFactory {
    fn new() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            fail_message: Mutex::new(None),
            construction_delay: Mutex::new(None),
            overlap: AtomicBool::new(false),
        }
    }

    fn fail_with(&self, message: &str) {
        *self.fail_message.lock() = Some(message.to_string());
    }

    fn delay_construction(&self, delay: Duration) {
        *self.construction_delay.lock() = Some(delay);
    }

    fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    fn engine(&self, index: usize) -> Option<CreatedEngine> {
        self.created.lock().get(index).cloned()
    }

    fn engines_overlapped(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EngineFactory for TestEngineFactory {
    async fn create(
        &self,
        settings: EngineSettings,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> BridgeResult<Box<dyn PlayerEngine>> {
        let delay = *self.construction_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.fail_message.lock().clone() {
            return Err(BridgeError::Engine(message));
        }

        let probe = Arc::new(EngineProbe::new());
        {
            let mut created = self.created.lock();
            if created.iter().any(|prior| prior.probe.releases() == 0) {
                self.overlap.store(true, Ordering::SeqCst);
            }
            created.push(CreatedEngine {
                probe: Arc::clone(&probe),
                events,
                settings,
            });
        }

        Ok(Box::new(TestEngine { probe }))
    }
}

// ============================================================================
// Mock Audio Focus
// ============================================================================

struct TestFocus {
    response: Mutex<FocusResponse>,
    requests: AtomicUsize,
    abandons: AtomicUsize,
    listener: Mutex<Option<mpsc::UnboundedSender<FocusChange>>>,
}

impl TestFocus {
    fn granting() -> Self {
        Self {
            response: Mutex::new(FocusResponse::Granted),
            requests: AtomicUsize::new(0),
            abandons: AtomicUsize::new(0),
            listener: Mutex::new(None),
        }
    }

    fn respond_with(&self, response: FocusResponse) {
        *self.response.lock() = response;
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn abandons(&self) -> usize {
        self.abandons.load(Ordering::SeqCst)
    }

    fn deliver(&self, change: FocusChange) {
        let listener = self.listener.lock();
        listener
            .as_ref()
            .expect("no focus listener registered")
            .send(change)
            .expect("focus listener dropped");
    }
}

#[async_trait::async_trait]
impl AudioFocus for TestFocus {
    async fn request(
        &self,
        changes: mpsc::UnboundedSender<FocusChange>,
    ) -> BridgeResult<FocusResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.listener.lock() = Some(changes);
        Ok(*self.response.lock())
    }

    async fn abandon(&self) -> BridgeResult<()> {
        self.abandons.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Mock Notification Surface
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum SurfaceCall {
    Show(NotificationLayout),
    Update(NotificationLayout),
    Dismiss,
}

#[derive(Default)]
struct TestSurface {
    calls: Mutex<Vec<SurfaceCall>>,
}

impl TestSurface {
    fn last_layout(&self) -> Option<NotificationLayout> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            SurfaceCall::Show(layout) | SurfaceCall::Update(layout) => Some(layout.clone()),
            SurfaceCall::Dismiss => None,
        })
    }

    fn show_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Show(_)))
            .count()
    }

    fn dismiss_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Dismiss))
            .count()
    }
}

#[async_trait::async_trait]
impl NotificationSurface for TestSurface {
    async fn show(&self, layout: NotificationLayout) -> BridgeResult<()> {
        self.calls.lock().push(SurfaceCall::Show(layout));
        Ok(())
    }

    async fn update(&self, layout: NotificationLayout) -> BridgeResult<()> {
        self.calls.lock().push(SurfaceCall::Update(layout));
        Ok(())
    }

    async fn dismiss(&self) -> BridgeResult<()> {
        self.calls.lock().push(SurfaceCall::Dismiss);
        Ok(())
    }
}

// ============================================================================
// Mock Headset Monitor
// ============================================================================

struct TestHeadsetMonitor {
    sender: Mutex<Option<mpsc::UnboundedSender<HeadsetEvent>>>,
}

impl TestHeadsetMonitor {
    fn new() -> Self {
        Self {
            sender: Mutex::new(None),
        }
    }

    fn unplug(&self) {
        self.sender
            .lock()
            .as_ref()
            .expect("monitor not subscribed")
            .send(HeadsetEvent::Unplugged)
            .expect("headset receiver dropped");
    }
}

impl HeadsetMonitor for TestHeadsetMonitor {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<HeadsetEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock() = Some(tx);
        rx
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    service: PlayerService,
    factory: Arc<TestEngineFactory>,
    focus: Arc<TestFocus>,
    surface: Arc<TestSurface>,
    events: Receiver<SessionEvent>,
}

fn spawn_harness() -> Harness {
    spawn_harness_with(|deps| deps)
}

fn spawn_harness_with(
    customize: impl FnOnce(SessionDependencies) -> SessionDependencies,
) -> Harness {
    let factory = Arc::new(TestEngineFactory::new());
    let focus = Arc::new(TestFocus::granting());
    let surface = Arc::new(TestSurface::default());

    let deps = customize(SessionDependencies::new(
        Arc::clone(&factory) as Arc<dyn EngineFactory>,
        Arc::clone(&focus) as Arc<dyn AudioFocus>,
        Arc::clone(&surface) as Arc<dyn NotificationSurface>,
    ));

    let config = SessionConfig::builder().build().unwrap();
    let service = PlayerService::spawn(config, deps);
    let events = service.subscribe();

    Harness {
        service,
        factory,
        focus,
        surface,
        events,
    }
}

impl Harness {
    /// Start a live session and drive the engine into `Playing`, consuming
    /// the events produced along the way.
    async fn start_playing(&mut self) -> CreatedEngine {
        self.service.play("Radio X", "RADIOX_AAC");
        assert_eq!(
            self.next_event().await,
            SessionEvent::StreamChanged {
                mount: "RADIOX_AAC".to_string()
            }
        );
        assert_eq!(
            self.next_event().await,
            SessionEvent::TrackChanged { track: None }
        );
        assert_eq!(
            self.next_event().await,
            SessionEvent::StateChanged {
                state: SessionState::Connecting
            }
        );

        let engine = self.engine(0).await;
        engine.emit_state(EngineState::Playing);
        assert_eq!(
            self.next_event().await,
            SessionEvent::StateChanged {
                state: SessionState::Playing
            }
        );
        engine
    }

    async fn next_event(&mut self) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(2), self.events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event bus closed")
    }

    async fn expect_no_event(&mut self) {
        if let Ok(Ok(event)) =
            tokio::time::timeout(Duration::from_millis(200), self.events.recv()).await
        {
            panic!("unexpected event: {event:?}");
        }
    }

    async fn engine(&self, index: usize) -> CreatedEngine {
        let factory = Arc::clone(&self.factory);
        wait_until("engine construction", move || {
            factory.created_count() > index
        })
        .await;
        self.factory.engine(index).unwrap()
    }
}

async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ============================================================================
// Tests: command no-ops
// ============================================================================

#[tokio::test]
async fn pause_on_idle_is_a_silent_no_op() {
    let mut harness = spawn_harness();

    harness.service.pause();
    harness.expect_no_event().await;
}

#[tokio::test]
async fn seek_without_session_is_a_silent_no_op() {
    let mut harness = spawn_harness();

    harness.service.seek(5_000);
    harness.service.seek_to(10_000);
    harness.expect_no_event().await;
    assert_eq!(harness.factory.created_count(), 0);
}

#[tokio::test]
async fn position_without_session_is_sentinel() {
    let harness = spawn_harness();
    assert_eq!(harness.service.current_position_ms().await, -1);
}

#[tokio::test]
async fn stop_and_resume_without_session_are_no_ops() {
    let mut harness = spawn_harness();

    harness.service.stop();
    harness.service.resume();
    harness.expect_no_event().await;
    assert_eq!(harness.factory.created_count(), 0);
}

// ============================================================================
// Tests: live playback start
// ============================================================================

#[tokio::test]
async fn live_play_publishes_stream_then_state() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    assert_eq!(engine.plays(), 1);
    assert_eq!(harness.focus.requests(), 1);
    assert_eq!(engine.settings.broadcaster, "Triton Digital");
    assert_eq!(engine.settings.region, "EU");

    let surface = Arc::clone(&harness.surface);
    wait_until("pause affordance on notification", move || {
        surface
            .last_layout()
            .is_some_and(|layout| layout.affordance == PlaybackAffordance::Pause)
    })
    .await;
}

// ============================================================================
// Tests: stop-then-start
// ============================================================================

#[tokio::test]
async fn play_releases_prior_engine_before_constructing_the_next() {
    let mut harness = spawn_harness();
    let first = harness.start_playing().await;

    harness.service.play("Radio X", "RADIOX_MP3");
    let _second = harness.engine(1).await;

    assert_eq!(first.probe.releases(), 1);
    assert_eq!(first.probe.stops.load(Ordering::SeqCst), 1);
    assert!(!harness.factory.engines_overlapped());
}

#[tokio::test]
async fn stop_then_play_restarts_the_same_source() {
    let mut harness = spawn_harness();
    let first = harness.start_playing().await;

    harness.service.stop();
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Stopped
        }
    );
    assert_eq!(first.probe.stops.load(Ordering::SeqCst), 1);
    let focus = Arc::clone(&harness.focus);
    wait_until("focus abandoned after stop", move || focus.abandons() > 0).await;

    // The source survives a stop; play constructs a fresh engine for it.
    harness.service.play("Radio X", "RADIOX_AAC");
    let second = harness.engine(1).await;
    assert_eq!(first.probe.releases(), 1);
    assert_eq!(second.settings, first.settings);
}

// ============================================================================
// Tests: start failures
// ============================================================================

#[tokio::test]
async fn focus_denial_during_start_publishes_error() {
    let mut harness = spawn_harness();
    harness.focus.respond_with(FocusResponse::Denied);

    harness.service.play("Radio X", "RADIOX_AAC");
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StreamChanged {
            mount: "RADIOX_AAC".to_string()
        }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::TrackChanged { track: None }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Connecting
        }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Error
        }
    );

    // The constructed engine is released on the denial path, exactly once.
    let engine = harness.engine(0).await;
    let probe = Arc::clone(&engine.probe);
    wait_until("engine released after denial", move || {
        probe.releases() == 1
    })
    .await;
    assert_eq!(engine.plays(), 0);
}

#[tokio::test]
async fn engine_construction_failure_publishes_error() {
    let mut harness = spawn_harness();
    harness.factory.fail_with("no codec");

    harness.service.play_on_demand("https://cdn.example.com/show.mp3");
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StreamChanged {
            mount: "https://cdn.example.com/show.mp3".to_string()
        }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::TrackChanged { track: None }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Connecting
        }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Error
        }
    );
}

// ============================================================================
// Tests: focus loss and regain
// ============================================================================

#[tokio::test]
async fn transient_focus_loss_pauses_and_gain_resumes() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    harness.focus.deliver(FocusChange::LossTransient);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Paused
        }
    );
    assert_eq!(engine.probe.pauses.load(Ordering::SeqCst), 1);

    harness.focus.deliver(FocusChange::Gain);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Connecting
        }
    );

    engine.emit_state(EngineState::Playing);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Playing
        }
    );

    // The gain restored the grant; the resume did not hit the primitive again.
    assert_eq!(harness.focus.requests(), 1);
    assert_eq!(engine.plays(), 2);
}

#[tokio::test]
async fn permanent_focus_loss_never_auto_resumes() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    harness.focus.deliver(FocusChange::Loss);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Paused
        }
    );

    harness.focus.deliver(FocusChange::Gain);
    harness.expect_no_event().await;
    assert_eq!(engine.plays(), 1);
}

#[tokio::test]
async fn resume_denied_by_focus_stays_paused() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    harness.service.pause();
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Paused
        }
    );

    harness.focus.respond_with(FocusResponse::Denied);
    harness.service.resume();

    harness.expect_no_event().await;
    assert_eq!(engine.plays(), 1);
    assert_eq!(harness.focus.requests(), 2);
}

// ============================================================================
// Tests: quit racing engine construction
// ============================================================================

#[tokio::test]
async fn quit_during_construction_still_releases_the_engine() {
    let mut harness = spawn_harness();
    harness.factory.delay_construction(Duration::from_millis(150));

    harness.service.play_on_demand("https://cdn.example.com/show.mp3");
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StreamChanged {
            mount: "https://cdn.example.com/show.mp3".to_string()
        }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::TrackChanged { track: None }
    );
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Connecting
        }
    );

    harness.service.quit();
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Idle
        }
    );

    // The engine finishes constructing after the teardown and is handed
    // straight to release, exactly once.
    let engine = harness.engine(0).await;
    let probe = Arc::clone(&engine.probe);
    wait_until("superseded engine released", move || probe.releases() == 1).await;

    // The focus the superseded start secured is given back as well.
    let focus = Arc::clone(&harness.focus);
    wait_until("focus abandoned after superseded start", move || {
        focus.abandons() >= 1
    })
    .await;

    // No stale events escape the torn-down generation.
    engine.emit_cue(CuePoint::Ad);
    engine.emit_state(EngineState::Playing);
    harness.expect_no_event().await;
    assert_eq!(engine.probe.releases(), 1);
}

#[tokio::test]
async fn late_callbacks_after_quit_are_discarded() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    harness.service.quit();
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Idle
        }
    );
    assert_eq!(engine.probe.releases(), 1);

    engine.emit_state(EngineState::Error);
    engine.emit_cue(CuePoint::Track {
        title: "Ghost".to_string(),
        artist: "Nobody".to_string(),
        duration: Duration::from_secs(100),
    });
    harness.expect_no_event().await;
}

#[tokio::test]
async fn quit_tears_down_the_notification() {
    let mut harness = spawn_harness();
    harness.start_playing().await;

    harness.service.quit();
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Idle
        }
    );

    let surface = Arc::clone(&harness.surface);
    wait_until("notification dismissed", move || {
        surface.dismiss_count() == 1
    })
    .await;
}

// ============================================================================
// Tests: cue points
// ============================================================================

#[tokio::test]
async fn ad_cue_produces_advertisement_track_and_label() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    engine.emit_cue(CuePoint::Ad);
    let event = harness.next_event().await;
    let SessionEvent::TrackChanged { track: Some(track) } = event else {
        panic!("expected track-changed, got {event:?}");
    };
    assert!(track.is_advertisement);

    let surface = Arc::clone(&harness.surface);
    wait_until("advertisement label on notification", move || {
        surface
            .last_layout()
            .is_some_and(|layout| layout.title == "Advertisement")
    })
    .await;
}

#[tokio::test]
async fn track_cue_replaces_metadata_wholesale() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    engine.emit_cue(CuePoint::Track {
        title: "Nightcall".to_string(),
        artist: "Kavinsky".to_string(),
        duration: Duration::from_secs(258),
    });
    let event = harness.next_event().await;
    let SessionEvent::TrackChanged { track: Some(track) } = event else {
        panic!("expected track-changed, got {event:?}");
    };
    assert_eq!(track.title, "Nightcall");
    assert_eq!(track.artist, "Kavinsky");
    assert!(!track.is_advertisement);

    let surface = Arc::clone(&harness.surface);
    wait_until("track title on notification", move || {
        surface
            .last_layout()
            .is_some_and(|layout| layout.title == "Nightcall" && layout.subtitle == "Kavinsky")
    })
    .await;
}

// ============================================================================
// Tests: engine state callbacks
// ============================================================================

#[tokio::test]
async fn duplicate_engine_states_publish_no_duplicate_events() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    engine.emit_state(EngineState::Playing);
    harness.expect_no_event().await;
}

#[tokio::test]
async fn engine_completion_abandons_focus() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    engine.emit_state(EngineState::Completed);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Completed
        }
    );

    let focus = Arc::clone(&harness.focus);
    wait_until("focus abandoned on completion", move || {
        focus.abandons() == 1
    })
    .await;
}

// ============================================================================
// Tests: seeking and position
// ============================================================================

#[tokio::test]
async fn relative_seek_clamps_at_stream_start() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;
    engine.probe.set_position(Duration::from_secs(10));

    harness.service.seek(-20_000);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::PlaybackPositionChanged {
            position: Duration::ZERO
        }
    );

    harness.service.seek(30_000);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::PlaybackPositionChanged {
            position: Duration::from_secs(30)
        }
    );
    assert_eq!(
        *engine.probe.seeks.lock(),
        vec![Duration::ZERO, Duration::from_secs(30)]
    );
}

#[tokio::test]
async fn absolute_seek_forwards_and_publishes() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;

    harness.service.seek_to(45_000);
    assert_eq!(
        harness.next_event().await,
        SessionEvent::PlaybackPositionChanged {
            position: Duration::from_secs(45)
        }
    );
    assert_eq!(*engine.probe.seeks.lock(), vec![Duration::from_secs(45)]);
}

#[tokio::test]
async fn position_reports_engine_position_in_millis() {
    let mut harness = spawn_harness();
    let engine = harness.start_playing().await;
    engine.probe.set_position(Duration::from_secs(42));

    assert_eq!(harness.service.current_position_ms().await, 42_000);
}

// ============================================================================
// Tests: headset signals
// ============================================================================

#[tokio::test]
async fn headset_unplug_pauses_without_auto_resume() {
    let monitor = Arc::new(TestHeadsetMonitor::new());
    let monitor_handle = Arc::clone(&monitor);
    let mut harness =
        spawn_harness_with(move |deps| deps.with_headset_monitor(monitor_handle as Arc<dyn HeadsetMonitor>));
    let engine = harness.start_playing().await;

    monitor.unplug();
    assert_eq!(
        harness.next_event().await,
        SessionEvent::StateChanged {
            state: SessionState::Paused
        }
    );

    // A later focus gain must not restart an explicitly paused session.
    harness.focus.deliver(FocusChange::Gain);
    harness.expect_no_event().await;
    assert_eq!(engine.plays(), 1);
}

// ============================================================================
// Tests: notification toggling
// ============================================================================

#[tokio::test]
async fn disabling_notifications_dismisses_and_reenabling_rerenders() {
    let mut harness = spawn_harness();
    harness.start_playing().await;

    harness.service.set_notification_enabled(false);
    let surface = Arc::clone(&harness.surface);
    wait_until("notification dismissed on disable", move || {
        surface.dismiss_count() == 1
    })
    .await;

    harness.service.set_notification_enabled(true);
    let surface = Arc::clone(&harness.surface);
    wait_until("notification reconstructed on enable", move || {
        surface.show_count() == 2
    })
    .await;
}
