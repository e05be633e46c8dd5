//! Track ordering: current index plus shuffle and repeat-one policies.

use rand::RngExt;

use crate::error::PlaybackError;
use crate::library::Track;

/// Owns the ordered track list (supplied by the library collaborators) and
/// the index of whatever is current. Resolving "next" and "previous" never
/// starts playback; the controller does that with the returned index.
pub struct Sequencer {
    tracks: Vec<Track>,
    current: Option<usize>,
    shuffle: bool,
    repeat_one: bool,
}

impl Sequencer {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            current: None,
            shuffle: false,
            repeat_one: false,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn set_current(&mut self, index: usize) {
        self.current = if index < self.tracks.len() {
            Some(index)
        } else {
            None
        };
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.shuffle = on;
    }

    pub fn repeat_one(&self) -> bool {
        self.repeat_one
    }

    pub fn set_repeat_one(&mut self, on: bool) {
        self.repeat_one = on;
    }

    /// Resolve the index to play after the current one.
    ///
    /// Repeat-one wins over shuffle and repeats the current index. Shuffle
    /// picks uniformly over the whole list; an immediate repeat is allowed.
    /// Sequential play wraps, and starts at 0 when nothing has played yet.
    pub fn next(&self) -> Result<usize, PlaybackError> {
        let len = self.tracks.len();
        if len == 0 {
            return Err(PlaybackError::EmptySequence);
        }
        if self.repeat_one {
            if let Some(current) = self.current {
                return Ok(current);
            }
        }
        if self.shuffle {
            return Ok(rand::rng().random_range(0..len));
        }
        let current = self.current.map(|c| c as i64).unwrap_or(-1);
        Ok(((current + 1).rem_euclid(len as i64)) as usize)
    }

    /// Resolve the index to play before the current one. Going back is
    /// always sequential, regardless of shuffle or repeat-one.
    pub fn previous(&self) -> Result<usize, PlaybackError> {
        let len = self.tracks.len();
        if len == 0 {
            return Err(PlaybackError::EmptySequence);
        }
        match self.current {
            None => Ok(0),
            Some(current) => Ok(((current as i64 - 1).rem_euclid(len as i64)) as usize),
        }
    }

    /// Replace the track list. The current index follows the same track
    /// path when it is still present, otherwise it is invalidated.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        let current_path = self
            .current
            .and_then(|i| self.tracks.get(i))
            .map(|t| t.path.clone());
        self.tracks = tracks;
        self.current =
            current_path.and_then(|p| self.tracks.iter().position(|t| t.path == p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn track(name: &str) -> Track {
        Track {
            path: PathBuf::from(format!("/music/{name}.mp3")),
            title: name.to_string(),
            artist: None,
            album: None,
            display: name.to_string(),
        }
    }

    fn seq(names: &[&str]) -> Sequencer {
        Sequencer::new(names.iter().map(|n| track(n)).collect())
    }

    #[test]
    fn sequential_next_wraps_and_starts_at_zero() {
        let mut s = seq(&["a", "b", "c"]);
        assert_eq!(s.next().unwrap(), 0);

        s.set_current(0);
        assert_eq!(s.next().unwrap(), 1);

        s.set_current(2);
        assert_eq!(s.next().unwrap(), 0);
    }

    #[test]
    fn previous_wraps_and_defaults_to_zero() {
        let mut s = seq(&["a", "b", "c"]);
        assert_eq!(s.previous().unwrap(), 0);

        s.set_current(0);
        assert_eq!(s.previous().unwrap(), 2);

        s.set_current(2);
        assert_eq!(s.previous().unwrap(), 1);
    }

    #[test]
    fn repeat_one_repeats_regardless_of_shuffle() {
        let mut s = seq(&["a", "b", "c"]);
        s.set_current(1);
        s.set_repeat_one(true);
        assert_eq!(s.next().unwrap(), 1);

        s.set_shuffle(true);
        for _ in 0..20 {
            assert_eq!(s.next().unwrap(), 1);
        }
    }

    #[test]
    fn repeat_one_with_nothing_playing_starts_at_zero() {
        let mut s = seq(&["a", "b"]);
        s.set_repeat_one(true);
        assert_eq!(s.next().unwrap(), 0);
    }

    #[test]
    fn shuffle_stays_in_range() {
        let mut s = seq(&["a", "b", "c", "d"]);
        s.set_current(0);
        s.set_shuffle(true);
        for _ in 0..50 {
            assert!(s.next().unwrap() < 4);
        }
    }

    #[test]
    fn single_track_always_resolves_to_zero() {
        let mut s = seq(&["only"]);
        s.set_current(0);
        assert_eq!(s.next().unwrap(), 0);
        assert_eq!(s.previous().unwrap(), 0);

        s.set_shuffle(true);
        assert_eq!(s.next().unwrap(), 0);
    }

    #[test]
    fn empty_sequence_is_an_error() {
        let s = seq(&[]);
        assert_eq!(s.next(), Err(PlaybackError::EmptySequence));
        assert_eq!(s.previous(), Err(PlaybackError::EmptySequence));
    }

    #[test]
    fn replacing_tracks_follows_the_current_path() {
        let mut s = seq(&["a", "b", "c"]);
        s.set_current(1);

        // "b" moves to the front: the index follows it.
        s.set_tracks(vec![track("b"), track("c")]);
        assert_eq!(s.current(), Some(0));

        // "b" disappears: the index is invalidated.
        s.set_tracks(vec![track("x"), track("y")]);
        assert_eq!(s.current(), None);
    }

    #[test]
    fn out_of_range_current_is_invalidated() {
        let mut s = seq(&["a", "b"]);
        s.set_current(5);
        assert_eq!(s.current(), None);
    }
}
