//! Recording engine double for controller and transition tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::AudioEngine;
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Play(PathBuf, Duration),
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Default)]
pub(crate) struct MockEngine {
    pub calls: Vec<Call>,
    pub loaded: Option<PathBuf>,
    pub paused: bool,
    /// Simulates the source running out of audio.
    pub drained: bool,
    pub volume: f32,
    /// Offset starts are unsupported, as some engines have it.
    pub reject_offsets: bool,
    /// Every load fails.
    pub fail_loads: bool,
}

impl AudioEngine for MockEngine {
    fn play(&mut self, path: &Path, start_at: Duration) -> Result<(), EngineError> {
        self.calls.push(Call::Play(path.to_path_buf(), start_at));
        if self.fail_loads {
            self.loaded = None;
            return Err(EngineError::new("mock load failure"));
        }
        if self.reject_offsets && start_at > Duration::ZERO {
            return Err(EngineError::new("offset start unsupported"));
        }
        self.loaded = Some(path.to_path_buf());
        self.paused = false;
        self.drained = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
        self.paused = true;
    }

    fn resume(&mut self) {
        self.calls.push(Call::Resume);
        self.paused = false;
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
        self.loaded = None;
        self.drained = false;
    }

    fn busy(&self) -> bool {
        self.loaded.is_some() && !self.drained
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

/// Shared handle so tests can keep inspecting the engine after handing it
/// to the player.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedMockEngine(pub Arc<Mutex<MockEngine>>);

impl SharedMockEngine {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn finish_current(&self) {
        self.0.lock().unwrap().drained = true;
    }

    pub fn reject_offsets(&self) {
        self.0.lock().unwrap().reject_offsets = true;
    }

    pub fn fail_loads(&self) {
        self.0.lock().unwrap().fail_loads = true;
    }

    pub fn volume(&self) -> f32 {
        self.0.lock().unwrap().volume
    }

    pub fn loaded(&self) -> Option<PathBuf> {
        self.0.lock().unwrap().loaded.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.0.lock().unwrap().paused
    }
}

impl AudioEngine for SharedMockEngine {
    fn play(&mut self, path: &Path, start_at: Duration) -> Result<(), EngineError> {
        self.0.lock().unwrap().play(path, start_at)
    }

    fn pause(&mut self) {
        self.0.lock().unwrap().pause();
    }

    fn resume(&mut self) {
        self.0.lock().unwrap().resume();
    }

    fn stop(&mut self) {
        self.0.lock().unwrap().stop();
    }

    fn busy(&self) -> bool {
        self.0.lock().unwrap().busy()
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.lock().unwrap().set_volume(volume);
    }
}
