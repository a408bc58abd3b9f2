use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: Option<String>,
    /// Directory of a front-end build served at `/`.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `env_logger` filter, e.g. `info` or `taskboard=debug`.
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub path: Option<String>,
}

/// `~/.taskboard`, or `./.taskboard` without a HOME.
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".taskboard")
}

impl Config {
    /// Load `~/.taskboard/config.toml`, or defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&data_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(bind) = &self.server.bind {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                bail!(
                    "failed to parse {}: server.bind '{bind}' is not a socket address",
                    path.display()
                );
            }
        }
        if let Some(dir) = &self.server.static_dir {
            if !dir.is_dir() {
                bail!(
                    "failed to parse {}: server.static_dir {} is not a directory",
                    path.display(),
                    dir.display()
                );
            }
        }
        Ok(())
    }

    pub fn bind(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or("info")
    }
}
