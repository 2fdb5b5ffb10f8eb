use crate::config;

/// Load the settings, falling back to defaults when the config cannot be
/// read or fails validation.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("fermata: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("fermata: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
