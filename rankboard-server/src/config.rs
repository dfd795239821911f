//! Server configuration using Figment
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. `rankboard.toml`, `rankboard.yaml`/`.yml` and `rankboard.json` in the working directory,
//!    or the single file passed with `--config`
//! 3. `RANKBOARD_` environment variables (`RANKBOARD_PORT=8080`)
//! 4. Command line flags

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use rankboard_kanban::KanbanSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "RANKBOARD_";

/// Base name of configuration files discovered in the working directory
pub const CONFIG_FILE_STEM: &str = "rankboard";

/// Everything the server reads at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite database file
    pub database: PathBuf,
    /// Read-plan-apply cycles a move gets before the server gives up
    pub move_retry_attempts: u32,
    /// Lifetime of issued session tokens, in hours
    pub session_ttl_hours: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database: PathBuf::from(rankboard_kanban::ledger::DEFAULT_DB_FILENAME),
            move_retry_attempts: KanbanSettings::default().move_retry_attempts,
            session_ttl_hours: 24,
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, files and the environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(explicit)?.extract().map_err(ConfigError::from)
    }

    /// Build the layered figment without extracting it
    ///
    /// Callers that want CLI flags on top merge them into the result.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::Missing(path.to_path_buf()));
                }
                figment = figment.merge(file_provider(path)?);
            }
            None => {
                for path in discover(Path::new(".")) {
                    figment = figment.merge(file_provider(&path)?);
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// The engine settings this configuration implies
    pub fn kanban_settings(&self) -> KanbanSettings {
        KanbanSettings {
            move_retry_attempts: self.move_retry_attempts,
            session_ttl: chrono::Duration::hours(self.session_ttl_hours),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration files present in `dir`, lowest precedence first
pub fn discover(dir: &Path) -> Vec<PathBuf> {
    ["toml", "yaml", "yml", "json"]
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .filter(|path| {
            let found = path.is_file();
            trace!(path = %path.display(), found, "checking for config file");
            found
        })
        .collect()
}

fn file_provider(path: &Path) -> Result<Figment, ConfigError> {
    debug!(path = %path.display(), "loading config file");
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(Figment::from(Yaml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}
