//! Mood → track list lookup.
//!
//! Songs live under `<songs_dir>/<language>/<emotion>/`. When a mood
//! folder has no audio files, the whole language tree is searched for
//! filenames mentioning the label, so a flat folder of
//! `happy_summer_song.mp3`-style files still works.

use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;
use super::scan::{is_audio_file, read_track};

/// Labels the emotion classifier can produce.
pub const EMOTIONS: [&str; 7] = [
    "angry",
    "disgust",
    "scared",
    "happy",
    "sad",
    "surprised",
    "neutral",
];

pub fn tracks_for_emotion(settings: &LibrarySettings, emotion: &str) -> Vec<Track> {
    let emotion = emotion.to_ascii_lowercase();
    let base = Path::new(&settings.songs_dir).join(&settings.language);
    let folder = base.join(&emotion);

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&folder)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_audio_file(p, settings))
        .collect();

    if paths.is_empty() {
        debug!("no songs under {folder:?}, searching filenames for {emotion:?}");
        paths = WalkDir::new(&base)
            .follow_links(settings.follow_links)
            .into_iter()
            .filter_map(Result::ok)
            .map(|entry| entry.into_path())
            .filter(|p| {
                p.is_file()
                    && is_audio_file(p, settings)
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.to_ascii_lowercase().contains(&emotion))
                        .unwrap_or(false)
            })
            .collect();
    }

    paths.sort();
    paths.iter().map(|p| read_track(p)).collect()
}
