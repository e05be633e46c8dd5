//! Host driver: wires settings, library and player together and pumps the
//! core from a line-command loop. It stands in for the graphical
//! frontends, which observe the same event stream.

mod event_loop;

use std::env;
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{info, warn};

use crate::config::Settings;
use crate::engine::RodioEngine;
use crate::library;
use crate::playback::Player;

fn load_settings() -> Settings {
    match Settings::load() {
        Ok(settings) => match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                warn!("invalid configuration ({e}), using defaults");
                Settings::default()
            }
        },
        Err(e) => {
            warn!("could not load configuration ({e}), using defaults");
            Settings::default()
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings();

    // Positional argument: a directory to scan or a saved .playlist file.
    // Without one, the configured songs directory is scanned.
    let tracks = match env::args().nth(1) {
        Some(arg) if arg.ends_with(".playlist") => {
            let playlist = library::Playlist::load(Path::new(&arg))?;
            info!(
                "loaded playlist {:?} ({} tracks)",
                playlist.name,
                playlist.tracks.len()
            );
            playlist
                .tracks
                .iter()
                .map(|p| library::read_track(p))
                .collect()
        }
        Some(dir) => library::scan(Path::new(&dir), &settings.library),
        None => library::scan(Path::new(&settings.library.songs_dir), &settings.library),
    };

    let engine = RodioEngine::new()?;
    let (event_tx, event_rx) = mpsc::channel();
    let mut player = Player::new(Box::new(engine), tracks, &settings, event_tx);

    // Reading stdin blocks, so it lives on its own thread; the pump loop
    // stays free to tick the player.
    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    event_loop::run(&mut player, &settings, &line_rx, &event_rx)
}
