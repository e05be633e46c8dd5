//! rodio-backed engine: one `OutputStream`, one `Sink` at a time.
//!
//! rodio cannot seek a live sink, so "seeking" means rebuilding the sink
//! with `Source::skip_duration`. Audio keeps flowing on rodio's own mixer
//! thread; nothing here blocks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::AudioEngine;
use crate::error::EngineError;

pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioEngine {
    pub fn new() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::new(format!("no audio output device: {e}")))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful
        // in debugging, but noisy for an interactive app.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            volume: 1.0,
        })
    }
}

impl AudioEngine for RodioEngine {
    fn play(&mut self, path: &Path, start_at: Duration) -> Result<(), EngineError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let file = File::open(path)
            .map_err(|e| EngineError::new(format!("failed to open {path:?}: {e}")))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| EngineError::new(format!("failed to decode {path:?}: {e}")))?
            // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
            .skip_duration(start_at);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn busy(&self) -> bool {
        self.sink.as_ref().map(|s| !s.empty()).unwrap_or(false)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }
}
