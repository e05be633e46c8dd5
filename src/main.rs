mod clock;
mod config;
mod duration;
mod engine;
mod error;
mod library;
mod playback;
mod runtime;
mod sequence;
mod timer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = runtime::run() {
        eprintln!("moodplay: {e}");
        std::process::exit(1);
    }
}
