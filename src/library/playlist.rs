//! Playlist persistence.
//!
//! Format: first line `name:<playlist name>`, then one absolute track
//! path per line. Files written before the header existed are plain path
//! lists; the loader accepts both.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<PathBuf>,
}

impl Playlist {
    /// Write the playlist to `path`, overwriting.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = format!("name:{}\n", self.name);
        for track in &self.tracks {
            out.push_str(&format!("{}\n", track.display()));
        }
        fs::write(path, out)
    }

    /// Read a playlist from `path`. Entries whose files no longer exist
    /// are skipped; a missing `name:` header falls back to the file stem.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("My Playlist")
            .to_string();
        let mut tracks = Vec::new();
        let mut first = true;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if first {
                first = false;
                if let Some(n) = line.strip_prefix("name:") {
                    name = n.trim().to_string();
                    continue;
                }
            }
            let track = PathBuf::from(line);
            if track.exists() {
                tracks.push(track);
            } else {
                warn!("skipping missing playlist entry {track:?}");
            }
        }

        Ok(Self { name, tracks })
    }
}

/// Turn a playlist name into something safe for a filename.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
