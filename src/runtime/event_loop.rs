//! Command parsing and the tick pump.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use log::debug;

use crate::config::Settings;
use crate::library::{self, EMOTIONS, Track};
use crate::playback::{PlaybackState, Player, PlayerEvent};

#[derive(Debug, PartialEq)]
enum Cmd {
    Play(usize),
    Pause,
    Stop,
    Next,
    Prev,
    Seek(f64),
    Shuffle,
    Repeat,
    Volume(f32),
    Mute,
    Mood(String),
    Save(String),
    List,
    Help,
    Quit,
}

fn parse(line: &str) -> Option<Cmd> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "play" | "p" => parts.next()?.parse().ok().map(Cmd::Play),
        "pause" | "space" => Some(Cmd::Pause),
        "stop" => Some(Cmd::Stop),
        "next" | "n" => Some(Cmd::Next),
        "prev" | "b" => Some(Cmd::Prev),
        "seek" => parts.next()?.parse().ok().map(Cmd::Seek),
        "shuffle" | "s" => Some(Cmd::Shuffle),
        "repeat" | "r" => Some(Cmd::Repeat),
        "vol" | "volume" => parts.next()?.parse().ok().map(Cmd::Volume),
        "mute" | "m" => Some(Cmd::Mute),
        "mood" => {
            let label = parts.next()?;
            Some(Cmd::Mood(label.to_string()))
        }
        "save" => {
            let name = parts.collect::<Vec<_>>().join(" ");
            if name.is_empty() { None } else { Some(Cmd::Save(name)) }
        }
        "list" | "ls" => Some(Cmd::List),
        "help" | "h" | "?" => Some(Cmd::Help),
        "quit" | "q" => Some(Cmd::Quit),
        _ => None,
    }
}

pub(super) fn run(
    player: &mut Player,
    settings: &Settings,
    lines: &Receiver<String>,
    events: &Receiver<PlayerEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    print_tracks(player.tracks());
    println!("type `help` for commands");

    loop {
        player.tick(Instant::now());

        while let Ok(event) = events.try_recv() {
            print_event(&event);
        }

        match lines.recv_timeout(Duration::from_millis(50)) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse(line) {
                    Some(Cmd::Quit) => break,
                    Some(cmd) => apply(player, settings, cmd),
                    None => println!("unknown command: {line}"),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // stdin closed: finish whatever is queued and leave.
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    player.shutdown();
    Ok(())
}

fn apply(player: &mut Player, settings: &Settings, cmd: Cmd) {
    match cmd {
        Cmd::Play(index) => {
            if index < player.tracks().len() {
                player.play(index);
            } else {
                println!("no track #{index}");
            }
        }
        Cmd::Pause => player.toggle_pause(),
        Cmd::Stop => player.stop(),
        Cmd::Next => player.next(),
        Cmd::Prev => player.previous(),
        Cmd::Seek(fraction) => player.seek(fraction),
        Cmd::Shuffle => {
            let on = player.toggle_shuffle();
            println!("shuffle {}", if on { "on" } else { "off" });
        }
        Cmd::Repeat => {
            let on = player.toggle_repeat_one();
            println!("repeat-one {}", if on { "on" } else { "off" });
        }
        Cmd::Volume(v) => {
            player.set_volume(v);
            println!("volume {:.0}%", player.volume() * 100.0);
        }
        Cmd::Mute => {
            player.toggle_mute();
            println!("{}", if player.is_muted() { "muted" } else { "unmuted" });
        }
        Cmd::Mood(label) => {
            let label = label.to_ascii_lowercase();
            if !EMOTIONS.contains(&label.as_str()) {
                println!("unknown mood {label}; one of: {}", EMOTIONS.join(", "));
                return;
            }
            let tracks = library::tracks_for_emotion(&settings.library, &label);
            println!("{} track(s) for mood {label}", tracks.len());
            print_tracks(&tracks);
            player.set_tracks(tracks);
        }
        Cmd::Save(name) => {
            let playlist = library::Playlist {
                name: name.clone(),
                tracks: player.tracks().iter().map(|t| t.path.clone()).collect(),
            };
            let dir = Path::new("playlists");
            let file = dir.join(format!("{}.playlist", library::sanitize_name(&name)));
            let saved = fs::create_dir_all(dir).and_then(|_| playlist.save(&file));
            match saved {
                Ok(()) => println!(
                    "saved {} track(s) to {}",
                    playlist.tracks.len(),
                    file.display()
                ),
                Err(e) => eprintln!("could not save playlist: {e}"),
            }
        }
        Cmd::List => {
            if let Some(track) = player.current_track() {
                println!(
                    "[{}] {} ({})",
                    state_label(player.state()),
                    track.display,
                    fmt_time(player.elapsed())
                );
            }
            if player.transition_active() {
                println!("(switching tracks...)");
            }
            print_tracks_with_current(player.tracks(), player.current_index());
        }
        Cmd::Help => print_help(),
        Cmd::Quit => {}
    }
}

fn print_event(event: &PlayerEvent) {
    match event {
        PlayerEvent::Progress {
            elapsed,
            total,
            estimated,
        } => {
            // Estimated totals get the asterisk, like the displays do.
            let mark = if *estimated { "*" } else { "" };
            print!("\r  {} / {}{mark}    ", fmt_time(*elapsed), fmt_time(*total));
            let _ = std::io::stdout().flush();
        }
        PlayerEvent::StateChanged(state) => println!("\n[{}]", state_label(*state)),
        PlayerEvent::TrackChanged(track) => println!("\nnow playing: {}", track.display),
        PlayerEvent::TransitionProgress(alpha) => debug!("transition overlay at {alpha:.1}"),
        PlayerEvent::Error(e) => eprintln!("\nerror: {e}"),
    }
}

fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Stopped => "stopped",
        PlaybackState::Playing => "playing",
        PlaybackState::Paused => "paused",
    }
}

fn fmt_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn print_tracks(tracks: &[Track]) {
    print_tracks_with_current(tracks, None);
}

fn print_tracks_with_current(tracks: &[Track], current: Option<usize>) {
    if tracks.is_empty() {
        println!("no tracks");
        return;
    }
    for (i, track) in tracks.iter().enumerate() {
        let marker = if current == Some(i) { ">" } else { " " };
        println!("{marker}{i:>3}  {}", track.display);
    }
}

fn print_help() {
    println!("commands:");
    println!("  play <n>        start track n");
    println!("  pause           toggle pause");
    println!("  stop            stop playback");
    println!("  next / prev     change track");
    println!("  seek <0..1>     jump to a fraction of the track");
    println!("  shuffle         toggle shuffle");
    println!("  repeat          toggle repeat-one");
    println!("  vol <0..1>      set volume");
    println!("  mute            toggle mute");
    println!("  mood <label>    load tracks for a mood");
    println!("  save <name>     save the current list as a playlist");
    println!("  list            show the current tracks");
    println!("  quit            exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_commands_and_arguments() {
        assert_eq!(parse("play 3"), Some(Cmd::Play(3)));
        assert_eq!(parse("p 0"), Some(Cmd::Play(0)));
        assert_eq!(parse("seek 0.5"), Some(Cmd::Seek(0.5)));
        assert_eq!(parse("vol 0.3"), Some(Cmd::Volume(0.3)));
        assert_eq!(parse("mood happy"), Some(Cmd::Mood("happy".into())));
        assert_eq!(parse("save My Mix"), Some(Cmd::Save("My Mix".into())));
        assert_eq!(parse("next"), Some(Cmd::Next));
        assert_eq!(parse("q"), Some(Cmd::Quit));
    }

    #[test]
    fn parse_rejects_garbage_and_missing_arguments() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("blargh"), None);
        assert_eq!(parse("play"), None);
        assert_eq!(parse("play x"), None);
        assert_eq!(parse("seek"), None);
        assert_eq!(parse("save"), None);
    }

    #[test]
    fn fmt_time_renders_minutes_and_padded_seconds() {
        assert_eq!(fmt_time(Duration::ZERO), "0:00");
        assert_eq!(fmt_time(Duration::from_secs(9)), "0:09");
        assert_eq!(fmt_time(Duration::from_secs(192)), "3:12");
    }
}
