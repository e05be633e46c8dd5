//! The audio engine boundary.
//!
//! The underlying primitive is fire-and-forget: it can start a file
//! (optionally skipping into it), pause, stop, and report whether it still
//! has sound queued. It cannot report a position and it cannot seek in
//! place. Everything richer (elapsed time, seeking, end-of-track) is
//! built above this trait in `playback`.

use std::path::Path;
use std::time::Duration;

use crate::error::EngineError;

mod sink;

pub use sink::RodioEngine;

#[cfg(test)]
pub(crate) mod mock;

pub trait AudioEngine {
    /// Load `path` and start playback `start_at` into the file. Replaces
    /// whatever was loaded before. The engine may reject a nonzero offset;
    /// callers fall back to starting at zero.
    fn play(&mut self, path: &Path, start_at: Duration) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Stop and unload the current track.
    fn stop(&mut self);

    /// True while the current load still has sound queued. Pausing does
    /// not clear it; running out of audio or stopping does.
    fn busy(&self) -> bool;

    /// Applies to the current and any future loads. Clamped to `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
}
