//! Configuration loading.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Event file read when `--input` is not given.
    pub events_path: PathBuf,
    /// `tracing` filter used when `RUST_LOG` is unset and `--verbose` is off.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            events_path: PathBuf::from("events.json"),
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load defaults, then the user config file, then `config_path`, then
    /// `SLOTS_*` environment variables. Later sources win.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(dir) = config_dir() {
            figment = figment.merge(Toml::file(dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("SLOTS_")).extract()
    }
}

/// Platform config directory for `slots`, e.g. `~/.config/slots` on Linux.
fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("slots"))
}
