//! Elapsed-time inference for an engine with no position read-back.

use std::time::{Duration, Instant};

/// Reconciles wall-clock time against the engine's binary play/pause
/// signal. The engine cannot report a position, so elapsed time is
/// inferred from `Instant`s and treated as authoritative, both for
/// progress display and for end-of-track decisions.
///
/// Keeps the instant playback (re)started plus the time accumulated
/// before it; pausing folds the running span into `accumulated`.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    running: bool,
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            running: false,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    /// Begin counting from `offset`.
    pub fn start_at(&mut self, now: Instant, offset: Duration) {
        self.started_at = Some(now);
        self.accumulated = offset;
        self.running = true;
    }

    /// Freeze the elapsed value. A second pause is a no-op.
    pub fn pause_at(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        self.accumulated = self.elapsed_at(now);
        self.started_at = None;
        self.running = false;
    }

    /// Continue counting from the frozen value.
    pub fn resume_at(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.started_at = Some(now);
        self.running = true;
    }

    /// Re-seed the clock at `offset`, preserving the running/paused state.
    pub fn seek_at(&mut self, now: Instant, offset: Duration) {
        self.accumulated = offset;
        if self.running {
            self.started_at = Some(now);
        }
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
