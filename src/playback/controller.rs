//! The playback state machine.
//!
//! `Player` owns the engine handle, the clock, the sequence and every
//! scheduled callback. The underlying engine can only start, pause and
//! stop a file; the elapsed tracking, seeking, end-of-track detection,
//! auto-advance and animated hand-offs a real player needs are all driven
//! from here by the host pumping `tick`.
//!
//! All session mutation goes through these methods. Observers only read
//! the event stream.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::clock::PlaybackClock;
use crate::config::{PlaybackSettings, Settings, TransitionSettings};
use crate::duration::DurationResolver;
use crate::engine::AudioEngine;
use crate::error::{EngineError, PlaybackError};
use crate::library::Track;
use crate::sequence::Sequencer;
use crate::timer::{Scheduler, TimerId};

use super::transition::{StepOutcome, Transition};
use super::types::{PlaybackState, PlayerEvent, Session, Task};

pub struct Player {
    engine: Box<dyn AudioEngine>,
    clock: PlaybackClock,
    durations: DurationResolver,
    sequence: Sequencer,
    timers: Scheduler<Task>,
    session: Session,
    transition: Option<Transition>,
    progress_timer: Option<TimerId>,
    advance_timer: Option<TimerId>,
    volume: f32,
    muted_from: Option<f32>,
    events: Sender<PlayerEvent>,
    playback_cfg: PlaybackSettings,
    transition_cfg: TransitionSettings,
}

impl Player {
    pub fn new(
        mut engine: Box<dyn AudioEngine>,
        tracks: Vec<Track>,
        settings: &Settings,
        events: Sender<PlayerEvent>,
    ) -> Self {
        let volume = settings.audio.volume.clamp(0.0, 1.0);
        engine.set_volume(volume);

        let mut sequence = Sequencer::new(tracks);
        sequence.set_shuffle(settings.playback.shuffle);
        sequence.set_repeat_one(settings.playback.repeat_one);

        Self {
            engine,
            clock: PlaybackClock::new(),
            durations: DurationResolver::new(),
            sequence,
            timers: Scheduler::new(),
            session: Session::default(),
            transition: None,
            progress_timer: None,
            advance_timer: None,
            volume,
            muted_from: None,
            events,
            playback_cfg: settings.playback.clone(),
            transition_cfg: settings.transition.clone(),
        }
    }

    // ---- session operations -------------------------------------------

    /// Start (or hand off to) the track at `index` in the sequence.
    pub fn play(&mut self, index: usize) {
        self.play_index(index, Instant::now());
    }

    pub(crate) fn play_index(&mut self, index: usize, now: Instant) {
        let Some(target) = self.sequence.get(index).cloned() else {
            return;
        };
        let same = self
            .session
            .track
            .as_ref()
            .map(|t| t.path == target.path)
            .unwrap_or(false);

        match self.session.state {
            PlaybackState::Paused if same => self.resume_at(now),
            PlaybackState::Playing if !same && self.session.track.is_some() => {
                self.begin_transition(index, now);
            }
            _ => self.start_track(index, Duration::ZERO, now),
        }
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub(crate) fn pause_at(&mut self, now: Instant) {
        if self.session.state != PlaybackState::Playing {
            return;
        }
        self.engine.pause();
        self.clock.pause_at(now);
        self.cancel_progress();
        self.set_state(PlaybackState::Paused);
    }

    pub fn resume(&mut self) {
        self.resume_at(Instant::now());
    }

    pub(crate) fn resume_at(&mut self, now: Instant) {
        if self.session.state != PlaybackState::Paused {
            return;
        }
        debug_assert!(!self.clock.is_running());
        self.engine.resume();
        self.clock.resume_at(now);
        self.schedule_progress(now);
        self.set_state(PlaybackState::Playing);
    }

    pub fn toggle_pause(&mut self) {
        match self.session.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => {}
        }
    }

    /// Stop the engine and drop the session. Cancels every outstanding
    /// callback; progress is reset to zero for observers.
    pub fn stop(&mut self) {
        self.cancel_progress();
        self.cancel_advance();
        self.cancel_transition();
        self.engine.stop();
        self.clock.reset();
        self.session.track = None;
        self.set_state(PlaybackState::Stopped);
    }

    /// Jump to `fraction` of the current track. Out-of-range fractions are
    /// clamped, not errors.
    ///
    /// The engine cannot seek in place, so this reloads the track and
    /// skips into it; if the engine rejects the offset start, playback
    /// restarts at zero rather than failing. A paused session is re-paused
    /// afterwards so the user-visible state does not change.
    pub fn seek(&mut self, fraction: f64) {
        self.seek_at(fraction, Instant::now());
    }

    pub(crate) fn seek_at(&mut self, fraction: f64, now: Instant) {
        let Some(track) = self.session.track.clone() else {
            return;
        };
        let fraction = fraction.clamp(0.0, 1.0);
        let resolved = self.durations.resolve(&track.path);
        let target = resolved.duration.mul_f64(fraction);
        let was_paused = self.session.state == PlaybackState::Paused;

        self.cancel_progress();
        self.cancel_advance();

        self.engine.stop();
        let offset = match self.engine.play(&track.path, target) {
            Ok(()) => target,
            Err(e) => {
                debug!("offset start rejected for {:?}: {e}; restarting at zero", track.path);
                match self.engine.play(&track.path, Duration::ZERO) {
                    Ok(()) => Duration::ZERO,
                    Err(e) => {
                        self.fail_load(&track, e);
                        return;
                    }
                }
            }
        };

        self.clock.seek_at(now, offset);
        if was_paused {
            self.engine.pause();
        } else {
            self.schedule_progress(now);
        }
        self.emit(PlayerEvent::Progress {
            elapsed: offset,
            total: resolved.duration,
            estimated: resolved.estimated,
        });
    }

    pub fn next(&mut self) {
        self.next_at(Instant::now());
    }

    pub(crate) fn next_at(&mut self, now: Instant) {
        match self.sequence.next() {
            Ok(index) => self.play_index(index, now),
            Err(e) => self.emit(PlayerEvent::Error(e)),
        }
    }

    pub fn previous(&mut self) {
        self.previous_at(Instant::now());
    }

    pub(crate) fn previous_at(&mut self, now: Instant) {
        match self.sequence.previous() {
            Ok(index) => self.play_index(index, now),
            Err(e) => self.emit(PlayerEvent::Error(e)),
        }
    }

    // ---- modes, volume, sequence --------------------------------------

    pub fn toggle_shuffle(&mut self) -> bool {
        let on = !self.sequence.shuffle();
        self.sequence.set_shuffle(on);
        on
    }

    pub fn toggle_repeat_one(&mut self) -> bool {
        let on = !self.sequence.repeat_one();
        self.sequence.set_repeat_one(on);
        on
    }

    /// Volume operations never depend on the playback state and never
    /// fail. Setting a volume drops any active mute.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.muted_from = None;
        self.engine.set_volume(self.volume);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn toggle_mute(&mut self) {
        match self.muted_from.take() {
            Some(previous) => {
                self.volume = previous;
                self.engine.set_volume(previous);
            }
            None => {
                self.muted_from = Some(self.volume);
                self.volume = 0.0;
                self.engine.set_volume(0.0);
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted_from.is_some()
    }

    /// Replace the sequence (e.g. after a new mood lookup). The playing
    /// session is untouched; the current index re-resolves by path.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.sequence.set_tracks(tracks);
    }

    pub fn tracks(&self) -> &[Track] {
        self.sequence.tracks()
    }

    // ---- observation ---------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.session.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session.track.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.sequence.current()
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn transition_active(&self) -> bool {
        self.transition.is_some()
    }

    // ---- the tick pump --------------------------------------------------

    /// Run every task that has come due. The host calls this on its own
    /// cadence; the cadence only bounds UI latency.
    pub fn tick(&mut self, now: Instant) {
        while let Some(task) = self.timers.pop_due(now) {
            self.dispatch(task, now);
        }
    }

    /// Cancel every outstanding callback and silence the engine.
    pub fn shutdown(&mut self) {
        self.stop();
        debug!("shut down with {} stray callback(s)", self.timers.len());
        self.timers.clear();
    }

    pub(crate) fn dispatch(&mut self, task: Task, now: Instant) {
        match task {
            Task::Progress => self.on_progress(now),
            Task::Advance => self.on_advance(now),
            Task::TransitionStep => self.on_transition_step(now),
            Task::TransitionWatchdog => self.on_transition_watchdog(now),
        }
    }

    // ---- internals ------------------------------------------------------

    /// The one place a track actually enters the engine.
    fn start_track(&mut self, index: usize, offset: Duration, now: Instant) {
        let Some(track) = self.sequence.get(index).cloned() else {
            return;
        };
        self.cancel_progress();
        self.cancel_advance();

        self.engine.stop();
        if let Err(e) = self.engine.play(&track.path, offset) {
            self.fail_load(&track, e);
            return;
        }

        self.sequence.set_current(index);
        self.session.track = Some(track.clone());
        self.clock.start_at(now, offset);
        self.set_state(PlaybackState::Playing);
        self.schedule_progress(now);

        let resolved = self.durations.resolve(&track.path);
        self.emit(PlayerEvent::TrackChanged(track));
        self.emit(PlayerEvent::Progress {
            elapsed: offset,
            total: resolved.duration,
            estimated: resolved.estimated,
        });
    }

    /// Engine failures never leave the machine stuck: report, go Stopped.
    fn fail_load(&mut self, track: &Track, err: EngineError) {
        self.cancel_progress();
        self.cancel_advance();
        self.cancel_transition();
        self.engine.stop();
        self.clock.reset();
        self.session.track = None;
        self.set_state(PlaybackState::Stopped);
        self.emit(PlayerEvent::Error(PlaybackError::EngineLoad {
            track: track.display.clone(),
            reason: err.to_string(),
        }));
    }

    fn on_progress(&mut self, now: Instant) {
        self.progress_timer = None;
        if self.session.state != PlaybackState::Playing {
            return;
        }
        let Some(track) = self.session.track.clone() else {
            return;
        };

        let resolved = self.durations.resolve(&track.path);
        let elapsed = self.clock.elapsed_at(now);
        self.emit(PlayerEvent::Progress {
            elapsed,
            total: resolved.duration,
            estimated: resolved.estimated,
        });

        // Two independent finished signals feed one routine: the inferred
        // position crossing the threshold (double-checked, estimates lie)
        // and the engine itself running out of audio.
        let threshold = self.playback_cfg.end_threshold;
        let total = resolved.duration.as_secs_f64();
        let percentage = if total > 0.0 {
            elapsed.as_secs_f64() / total
        } else {
            0.0
        };
        let threshold_hit =
            percentage >= threshold && elapsed.as_secs_f64() >= total * threshold;
        let engine_idle = !self.engine.busy();

        if threshold_hit || engine_idle {
            self.finish_track(now);
        } else {
            self.schedule_progress(now);
        }
    }

    /// Single authoritative end-of-track routine. The progress chain is
    /// cancelled before the advance is queued, so the two detection paths
    /// cannot both fire it; a pending advance or a live transition
    /// suppresses re-entry.
    fn finish_track(&mut self, now: Instant) {
        if self.advance_timer.is_some() || self.transition.is_some() {
            return;
        }
        self.cancel_progress();
        debug!("track finished at {:?}", self.clock.elapsed_at(now));
        self.advance_timer = Some(self.timers.schedule_after(
            now,
            self.playback_cfg.advance_delay(),
            Task::Advance,
        ));
    }

    fn on_advance(&mut self, now: Instant) {
        self.advance_timer = None;
        if self.session.state != PlaybackState::Playing {
            return;
        }
        match self.sequence.next() {
            Ok(index) => self.play_index(index, now),
            Err(e) => {
                self.emit(PlayerEvent::Error(e));
                self.stop();
            }
        }
    }

    fn begin_transition(&mut self, index: usize, now: Instant) {
        let Some(pending) = self.sequence.get(index).cloned() else {
            return;
        };
        // A new request cancels any in-flight hand-off; transitions never
        // queue.
        self.cancel_transition();

        let mut transition = Transition::new(pending, index);
        transition.step_timer = Some(self.timers.schedule_after(
            now,
            self.transition_cfg.tick(),
            Task::TransitionStep,
        ));
        transition.watchdog = Some(self.timers.schedule_after(
            now,
            self.transition_cfg.watchdog(),
            Task::TransitionWatchdog,
        ));
        self.transition = Some(transition);
        self.emit(PlayerEvent::TransitionProgress(0.0));
    }

    fn cancel_transition(&mut self) {
        if let Some(transition) = self.transition.take() {
            if let Some(id) = transition.step_timer {
                self.timers.cancel(id);
            }
            if let Some(id) = transition.watchdog {
                self.timers.cancel(id);
            }
        }
    }

    fn on_transition_step(&mut self, now: Instant) {
        let Some(mut transition) = self.transition.take() else {
            return;
        };
        transition.step_timer = None;

        match transition.step(self.transition_cfg.alpha_step) {
            StepOutcome::Continue => {
                self.emit(PlayerEvent::TransitionProgress(transition.alpha));
                transition.step_timer = Some(self.timers.schedule_after(
                    now,
                    self.transition_cfg.tick(),
                    Task::TransitionStep,
                ));
                self.transition = Some(transition);
            }
            StepOutcome::Swap => {
                self.emit(PlayerEvent::TransitionProgress(transition.alpha));
                let index = transition.pending_index;
                transition.swapped();
                self.transition = Some(transition);

                // On failure start_track tears the transition down too.
                self.start_track(index, Duration::ZERO, now);

                if let Some(t) = self.transition.as_mut() {
                    t.step_timer = Some(self.timers.schedule_after(
                        now,
                        self.transition_cfg.tick(),
                        Task::TransitionStep,
                    ));
                }
            }
            StepOutcome::Finished => {
                if let Some(id) = transition.watchdog {
                    self.timers.cancel(id);
                }
                self.emit(PlayerEvent::TransitionProgress(0.0));
                // Dropping the transition releases the overlay: Idle.
            }
        }
    }

    /// The transition stalled (suspended UI, starved pump). Force the
    /// swap through and release everything so playback can never be stuck
    /// behind an overlay.
    fn on_transition_watchdog(&mut self, now: Instant) {
        let Some(mut transition) = self.transition.take() else {
            return;
        };
        transition.watchdog = None;
        warn!(
            "transition watchdog fired; forcing hand-off to {:?}",
            transition.pending.path
        );
        if let Some(id) = transition.step_timer.take() {
            self.timers.cancel(id);
        }

        let index = transition.pending_index;
        let pending_path = transition.pending.path.clone();

        if transition.swap_pending() {
            self.start_track(index, Duration::ZERO, now);
        } else {
            // The swap happened; make sure the target is actually sounding
            // before declaring the hand-off done.
            let playing_target = self
                .session
                .track
                .as_ref()
                .map(|t| t.path == pending_path)
                .unwrap_or(false);
            if self.session.state == PlaybackState::Playing
                && (!playing_target || !self.engine.busy())
            {
                self.start_track(index, Duration::ZERO, now);
            }
        }
        self.emit(PlayerEvent::TransitionProgress(0.0));
    }

    fn schedule_progress(&mut self, now: Instant) {
        self.cancel_progress();
        self.progress_timer = Some(self.timers.schedule_after(
            now,
            self.playback_cfg.tick(),
            Task::Progress,
        ));
    }

    fn cancel_progress(&mut self) {
        if let Some(id) = self.progress_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn cancel_advance(&mut self) {
        if let Some(id) = self.advance_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.session.state != state {
            self.session.state = state;
            self.emit(PlayerEvent::StateChanged(state));
        }
    }

    fn emit(&self, event: PlayerEvent) {
        // The receiver may be gone during shutdown; that is fine.
        let _ = self.events.send(event);
    }

    #[cfg(test)]
    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
