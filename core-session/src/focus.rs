//! # Audio Focus Manager
//!
//! Arbitrates the session's hold on the operating environment's exclusive
//! audio output. The [`FocusArbiter`] wraps the host's
//! [`AudioFocus`](bridge_traits::focus::AudioFocus) primitive and makes the
//! request/abandon pair idempotent: focus is requested at most once per
//! successful transition into playback and abandoned at most once per
//! transition out of it, regardless of how callbacks interleave.

use bridge_traits::focus::{AudioFocus, FocusChange, FocusResponse};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outcome of the last audio-focus request.
///
/// Independent of the session state but causally coupled to it: the
/// controller consults this to decide whether playback may start or resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    /// No outstanding request or grant.
    None,
    /// A request is in flight.
    Requested,
    /// Focus is held; playback may produce audio.
    Granted,
    /// Focus was taken away for good.
    Lost,
    /// Focus was taken away temporarily; a `Gain` signal may follow.
    LostTransient,
}

/// What the controller should do in response to a focus-change signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirective {
    /// Pause; never auto-resume.
    PauseForGood,
    /// Pause; auto-resume once focus is regained.
    PauseTransient,
    /// Focus regained after a transient loss; resume if the pause was
    /// focus-induced.
    Resume,
    /// Nothing to do.
    NoAction,
}

struct Inner {
    state: FocusState,
    /// Whether this arbiter currently holds a registration with the
    /// primitive that a future abandon must undo.
    held: bool,
}

/// Tracks focus ownership on behalf of the session controller.
///
/// Shared between the controller task and the start/resume tasks it spawns;
/// all transitions run under one short-lived lock with no awaits inside it.
pub struct FocusArbiter {
    primitive: Arc<dyn AudioFocus>,
    changes: mpsc::UnboundedSender<FocusChange>,
    inner: Mutex<Inner>,
}

impl FocusArbiter {
    /// Create an arbiter over the host focus primitive. Focus-change signals
    /// are delivered on `changes` for every registration this arbiter makes.
    pub fn new(primitive: Arc<dyn AudioFocus>, changes: mpsc::UnboundedSender<FocusChange>) -> Self {
        Self {
            primitive,
            changes,
            inner: Mutex::new(Inner {
                state: FocusState::None,
                held: false,
            }),
        }
    }

    /// The outcome of the last focus request.
    pub fn state(&self) -> FocusState {
        self.inner.lock().state
    }

    /// Request exclusive output focus.
    ///
    /// Idempotent: when focus is already granted the primitive is not asked
    /// again. A failed bridge call is reported as a denial.
    pub async fn request(&self) -> FocusResponse {
        {
            let mut inner = self.inner.lock();
            if inner.held && inner.state == FocusState::Granted {
                return FocusResponse::Granted;
            }
            inner.state = FocusState::Requested;
        }

        match self.primitive.request(self.changes.clone()).await {
            Ok(FocusResponse::Granted) => {
                let mut inner = self.inner.lock();
                inner.state = FocusState::Granted;
                inner.held = true;
                FocusResponse::Granted
            }
            Ok(FocusResponse::Denied) => {
                let mut inner = self.inner.lock();
                inner.state = FocusState::None;
                inner.held = false;
                FocusResponse::Denied
            }
            Err(err) => {
                tracing::warn!(error = %err, "audio focus request failed");
                let mut inner = self.inner.lock();
                inner.state = FocusState::None;
                inner.held = false;
                FocusResponse::Denied
            }
        }
    }

    /// Abandon previously requested focus.
    ///
    /// Idempotent: the primitive is told at most once per grant. Loss markers
    /// survive the abandon so a subsequent `Gain` can still be classified.
    /// Abandon failures are swallowed (best effort).
    pub async fn abandon(&self) {
        {
            let mut inner = self.inner.lock();
            if !inner.held {
                return;
            }
            inner.held = false;
            if matches!(inner.state, FocusState::Granted | FocusState::Requested) {
                inner.state = FocusState::None;
            }
        }

        if let Err(err) = self.primitive.abandon().await {
            tracing::warn!(error = %err, "failed to abandon audio focus");
        }
    }

    /// Fold an asynchronous focus-change signal into the arbiter state and
    /// return the action the controller should take.
    pub fn observe(&self, change: FocusChange) -> FocusDirective {
        let mut inner = self.inner.lock();
        match change {
            FocusChange::Loss => {
                inner.state = FocusState::Lost;
                FocusDirective::PauseForGood
            }
            FocusChange::LossTransient => {
                inner.state = FocusState::LostTransient;
                FocusDirective::PauseTransient
            }
            FocusChange::Gain => {
                if inner.state == FocusState::LostTransient {
                    inner.state = FocusState::Granted;
                    inner.held = true;
                    FocusDirective::Resume
                } else {
                    FocusDirective::NoAction
                }
            }
        }
    }
}
