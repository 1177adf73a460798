use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "diary-insights";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Read an environment variable, treating unset and blank values alike
pub fn read_env_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    })
}

/// Platform config location, e.g. `~/.config/diary-insights/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
