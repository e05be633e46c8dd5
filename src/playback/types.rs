//! Playback state, session, events and scheduled task kinds.

use std::time::Duration;

use crate::error::PlaybackError;
use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// The single currently-loaded track. Owned by `Player`; every mutation
/// goes through its methods, observers only see events.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub track: Option<Track>,
    pub state: PlaybackState,
}

/// Everything observers can learn from the core.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Progress {
        elapsed: Duration,
        total: Duration,
        /// The total came from a heuristic; displays may mark it.
        estimated: bool,
    },
    StateChanged(PlaybackState),
    TrackChanged(Track),
    /// Overlay opacity during a transition, `0.0..=1.0`.
    TransitionProgress(f32),
    Error(PlaybackError),
}

/// Deferred work dispatched by `Player::tick`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Task {
    /// Periodic progress update plus end-of-track checks.
    Progress,
    /// Repeat-or-advance after the end-of-track settle delay.
    Advance,
    /// One fade step of the active transition.
    TransitionStep,
    /// Deadline for a transition to have completed on its own.
    TransitionWatchdog,
}
