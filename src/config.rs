//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/strstat.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:3001"
//!
//! [logging]
//! filter = "info"
//! ```
//!
//! `[logging]` is optional. `RUST_LOG`, when set, takes precedence over
//! `logging.filter`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// A `tracing_subscriber::EnvFilter` directive, e.g. `"info"` or
    /// `"strstat=debug,sqlx=warn"`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults for commands that never touch the database or network.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/strstat.sqlite"),
            },
            server: ServerConfig {
                bind: default_bind(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    config
        .server
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("server.bind is not a socket address: '{}'", config.server.bind))?;

    if config.logging.filter.trim().is_empty() {
        anyhow::bail!("logging.filter must not be empty");
    }

    Ok(())
}
