use std::path::PathBuf;

/// A playable entry in the library. The path is the identifier; duration
/// discovery and caching live with `duration::DurationResolver`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub display: String,
}
