//! Startup configuration: defaults live in `~/.config/userctl/config.json`
//! and are loaded once, then passed explicitly to call sites.

use std::io::IsTerminal;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_LINES: u32 = 50;

/// When to emit ANSI colors on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a concrete on/off decision. `Auto` honors the NO_COLOR
    /// convention and whether stdout is a terminal.
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default `-n` for the logs command and the TUI log popup.
    pub log_lines: u32,
    pub color: ColorMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_lines: DEFAULT_LOG_LINES,
            color: ColorMode::Auto,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("userctl").join("config.json"))
}

/// Load the config file, falling back to defaults when it is absent. A
/// malformed file is reported as a warning rather than aborting startup.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(raw) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            eprintln!(
                "warning: ignoring malformed config {}: {err}",
                path.display()
            );
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.log_lines, 50);
        assert_eq!(config.color, ColorMode::Auto);
    }

    #[test]
    fn parses_full_config() {
        let config: Config =
            serde_json::from_str(r#"{"log_lines": 200, "color": "never"}"#).unwrap();
        assert_eq!(config.log_lines, 200);
        assert_eq!(config.color, ColorMode::Never);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"color": "always"}"#).unwrap();
        assert_eq!(config.log_lines, DEFAULT_LOG_LINES);
        assert_eq!(config.color, ColorMode::Always);

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.color, ColorMode::Auto);
    }

    #[test]
    fn explicit_modes_ignore_environment() {
        assert!(ColorMode::Always.enabled());
        assert!(!ColorMode::Never.enabled());
    }
}
