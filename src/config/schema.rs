use std::time::Duration;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/moodplay/config.toml` or
/// `~/.config/moodplay/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MOODPLAY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub transition: TransitionSettings,
    pub audio: AudioSettings,
    pub library: LibrarySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playback: PlaybackSettings::default(),
            transition: TransitionSettings::default(),
            audio: AudioSettings::default(),
            library: LibrarySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Progress tick cadence (milliseconds).
    pub tick_ms: u64,
    /// Fraction of the resolved duration that counts as "finished".
    pub end_threshold: f64,
    /// Settle delay between detecting the end of a track and starting the
    /// next one (milliseconds).
    pub advance_delay_ms: u64,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Whether repeat-one starts enabled.
    pub repeat_one: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            end_threshold: 0.98,
            advance_delay_ms: 100,
            shuffle: false,
            repeat_one: false,
        }
    }
}

impl PlaybackSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Overlay opacity added per fade step.
    pub alpha_step: f32,
    /// Fade step cadence (milliseconds).
    pub tick_ms: u64,
    /// Deadline for a transition to complete on its own before it is
    /// forced through (milliseconds).
    pub watchdog_ms: u64,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            alpha_step: 0.1,
            tick_ms: 50,
            watchdog_ms: 3000,
        }
    }
}

impl TransitionSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_millis(self.watchdog_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial volume, clamped to `[0, 1]` at use.
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { volume: 0.7 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Root directory holding `<language>/<emotion>/` song folders.
    pub songs_dir: String,
    /// Song language folder to use for mood lookups.
    pub language: String,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            songs_dir: "songs".to_string(),
            language: "english".to_string(),
            extensions: vec!["mp3".into(), "wav".into(), "ogg".into()],
            follow_links: true,
        }
    }
}
