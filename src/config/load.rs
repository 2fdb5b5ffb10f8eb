use std::{env, path::PathBuf};

use super::schema::Settings;
use crate::library::SUPPORTED_EXTENSIONS;
use crate::schedule::parse_duration;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `FERMATA__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("FERMATA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.initial_volume > 100 {
            return Err("audio.initial_volume must be <= 100".to_string());
        }
        if self.audio.volume_step == 0 {
            return Err("audio.volume_step must be >= 1".to_string());
        }
        if self.session.poll_interval_ms == 0 {
            return Err("session.poll_interval_ms must be >= 1".to_string());
        }
        if self.scheduler.tick_interval_ms == 0 {
            return Err("scheduler.tick_interval_ms must be >= 1".to_string());
        }
        if let Err(e) = parse_duration(&self.session.default_duration) {
            return Err(format!("session.default_duration: {e}"));
        }
        if let Some(ext) = self.library.extensions.iter().find(|e| {
            let e = e.trim().trim_start_matches('.').to_ascii_lowercase();
            !SUPPORTED_EXTENSIONS.contains(&e.as_str())
        }) {
            return Err(format!(
                "library.extensions: {ext:?} is not one of {}",
                SUPPORTED_EXTENSIONS.join("/")
            ));
        }
        Ok(())
    }
}

/// Resolve the config path from `FERMATA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("FERMATA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/fermata/config.toml`
/// or `~/.config/fermata/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("fermata").join("config.toml"))
}

/// Compute the default log path under `$XDG_STATE_HOME/fermata/fermata.log`
/// or `~/.local/state/fermata/fermata.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("fermata").join("fermata.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
