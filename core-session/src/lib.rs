//! # Playback Session Core
//!
//! Coordinates playback of a single live audio stream or on-demand resource
//! on behalf of a host application, keeps a persistent notification
//! synchronized with playback state, and cooperates with the operating
//! environment's audio-focus arbitration.
//!
//! ## Overview
//!
//! - [`service::PlayerService`] - host-facing command surface and event
//!   subscription point
//! - [`controller`] - the session state machine (internal)
//! - [`focus::FocusArbiter`] - idempotent audio-focus arbitration
//! - [`notification::NotificationPresenter`] - idempotent notification
//!   rendering
//!
//! Exactly one stream/session is active at a time; starting a new one always
//! supersedes and fully releases the previous engine instance. All outcomes
//! are observable through the event bus - the command surface is
//! fire-and-forget.

mod controller;
pub mod error;
pub mod focus;
pub mod notification;
pub mod service;

pub use error::{Result, SessionError};
pub use focus::{FocusArbiter, FocusDirective, FocusState};
pub use notification::{NotificationModel, NotificationPresenter};
pub use service::{PlayerService, SessionDependencies};
