use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_moodplay_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("MOODPLAY_CONFIG_PATH", "/tmp/moodplay-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/moodplay-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("moodplay")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("moodplay")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
tick_ms = 500
end_threshold = 0.95
advance_delay_ms = 250
shuffle = true
repeat_one = true

[transition]
alpha_step = 0.2
tick_ms = 40
watchdog_ms = 5000

[audio]
volume = 0.4

[library]
songs_dir = "/srv/music"
language = "spanish"
extensions = ["mp3"]
follow_links = false
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MOODPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("MOODPLAY__PLAYBACK__TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.tick_ms, 500);
    assert_eq!(s.playback.end_threshold, 0.95);
    assert_eq!(s.playback.advance_delay_ms, 250);
    assert!(s.playback.shuffle);
    assert!(s.playback.repeat_one);
    assert_eq!(s.transition.alpha_step, 0.2);
    assert_eq!(s.transition.tick_ms, 40);
    assert_eq!(s.transition.watchdog_ms, 5000);
    assert_eq!(s.audio.volume, 0.4);
    assert_eq!(s.library.songs_dir, "/srv/music");
    assert_eq!(s.library.language, "spanish");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.follow_links);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[transition]
watchdog_ms = 3000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MOODPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("MOODPLAY__TRANSITION__WATCHDOG_MS", "9000");

    let s = Settings::load().unwrap();
    assert_eq!(s.transition.watchdog_ms, 9000);
}

#[test]
fn validate_rejects_unusable_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.playback.end_threshold = 0.0;
    assert!(s.validate().is_err());

    s = Settings::default();
    s.transition.alpha_step = 0.0;
    assert!(s.validate().is_err());

    s = Settings::default();
    s.playback.tick_ms = 0;
    assert!(s.validate().is_err());
}

#[test]
fn helper_durations_match_the_millisecond_fields() {
    let s = Settings::default();
    assert_eq!(s.playback.tick(), std::time::Duration::from_millis(1000));
    assert_eq!(
        s.playback.advance_delay(),
        std::time::Duration::from_millis(100)
    );
    assert_eq!(s.transition.tick(), std::time::Duration::from_millis(50));
    assert_eq!(
        s.transition.watchdog(),
        std::time::Duration::from_millis(3000)
    );
}
