//! Best-effort track duration discovery.
//!
//! The engine cannot report a total duration any more than a position, so
//! durations come from the file itself: embedded metadata when readable,
//! then a trailing MP3 frame header, then a size heuristic, then a fixed
//! default. Only the first method counts as exact; everything else is
//! flagged as an estimate so the display can mark it.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::AudioFile;
use log::debug;

/// Floor applied to every resolved duration.
const MIN_DURATION: Duration = Duration::from_secs(30);
/// Last-resort duration for unreadable files.
const DEFAULT_DURATION: Duration = Duration::from_secs(180);
/// MPEG-1 Layer III bitrate table, kbps, indexed by the header nibble.
const MP3_BITRATES: [u64; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Resolved {
    pub duration: Duration,
    /// True when the duration came from a heuristic rather than metadata.
    pub estimated: bool,
}

/// Resolves a usable total duration for a track, caching per path.
///
/// Never fails: each non-final method's failure is swallowed and the next
/// one attempted, down to a fixed default.
pub struct DurationResolver {
    cache: HashMap<PathBuf, Resolved>,
}

impl DurationResolver {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, path: &Path) -> Resolved {
        if let Some(hit) = self.cache.get(path) {
            return *hit;
        }
        let resolved = apply_floor(resolve_uncached(path));
        self.cache.insert(path.to_path_buf(), resolved);
        resolved
    }
}

impl Default for DurationResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// A value raised to the floor no longer matches what the file said, so it
/// is re-marked as an estimate.
fn apply_floor(resolved: Resolved) -> Resolved {
    if resolved.duration >= MIN_DURATION {
        resolved
    } else {
        Resolved {
            duration: MIN_DURATION,
            estimated: true,
        }
    }
}

fn resolve_uncached(path: &Path) -> Resolved {
    if let Some(duration) = from_metadata(path) {
        return Resolved {
            duration,
            estimated: false,
        };
    }
    if let Some(duration) = from_mp3_frame_header(path) {
        return Resolved {
            duration,
            estimated: true,
        };
    }
    if let Some(duration) = from_file_size(path) {
        return Resolved {
            duration,
            estimated: true,
        };
    }
    debug!("all duration methods failed for {path:?}, using default");
    Resolved {
        duration: DEFAULT_DURATION,
        estimated: true,
    }
}

fn from_metadata(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let duration = tagged.properties().duration();
            if duration > Duration::ZERO {
                Some(duration)
            } else {
                None
            }
        }
        Err(e) => {
            debug!("metadata duration failed for {path:?}: {e}");
            None
        }
    }
}

/// Recover the bitrate from a trailing MPEG frame header and derive
/// `duration = file_size_bits / bitrate`.
fn from_mp3_frame_header(path: &Path) -> Option<Duration> {
    if extension(path).as_deref() != Some("mp3") {
        return None;
    }

    let read = || -> std::io::Result<Option<Duration>> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        // An ID3v1 tag occupies the final 128 bytes; look behind it.
        file.seek(SeekFrom::End(-128))?;
        let mut tag = [0u8; 3];
        file.read_exact(&mut tag)?;
        if &tag == b"TAG" {
            file.seek(SeekFrom::End(-192))?;
        } else {
            file.seek(SeekFrom::End(-64))?;
        }

        let mut window = [0u8; 64];
        let n = file.read(&mut window)?;
        let window = &window[..n];

        for i in 0..window.len().saturating_sub(4) {
            if window[i] == 0xFF && (window[i + 1] & 0xE0) == 0xE0 {
                let bitrate_index = (window[i + 2] & 0xF0) >> 4;
                let bitrate = MP3_BITRATES[bitrate_index as usize] * 1000;
                if bitrate > 0 {
                    let secs = (size * 8) as f64 / bitrate as f64;
                    return Ok(Some(Duration::from_secs_f64(secs)));
                }
                break;
            }
        }
        Ok(None)
    };

    match read() {
        Ok(duration) => duration,
        Err(e) => {
            debug!("frame-header duration failed for {path:?}: {e}");
            None
        }
    }
}

/// Size heuristic: uncompressed WAV runs about 6 seconds per MB at CD
/// quality, OGG far longer, everything else is treated as ~128 kbps.
fn from_file_size(path: &Path) -> Option<Duration> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            debug!("size heuristic failed for {path:?}: {e}");
            return None;
        }
    };

    let size_mb = size as f64 / (1024.0 * 1024.0);
    let seconds_per_mb = match extension(path).as_deref() {
        Some("wav") => 6.0,
        Some("ogg") => 120.0,
        _ => 60.0,
    };
    Some(Duration::from_secs_f64(size_mb * seconds_per_mb))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}
