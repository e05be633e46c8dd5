//! Library collaborators: the track model, directory scanning, mood
//! lookup and playlist persistence.
//!
//! The playback core treats all of this as the source of an ordered track
//! list; nothing here touches the session.

mod lookup;
mod model;
mod playlist;
mod scan;

pub use lookup::{EMOTIONS, tracks_for_emotion};
pub use model::Track;
pub use playlist::{Playlist, sanitize_name};
pub use scan::{read_track, scan};
