pub mod file;
pub mod runtime;

use file::{AnnounceSection, FileConfig};
use herald_core::poll::ClassifyConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads the config file, remembering enough to reload it on SIGHUP.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: PathBuf, listen_override: Option<SocketAddr>) -> Self {
        ConfigLoader {
            config_path,
            listen_override,
        }
    }

    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let raw = std::fs::read_to_string(&self.config_path)?;
        let mut config: FileConfig = toml::from_str(&raw)?;
        if let Some(listen) = self.listen_override {
            config.server.listen = listen;
        }
        Ok(config)
    }

    pub fn reload(&self) -> Result<FileConfig, ConfigError> {
        self.load()
    }
}

/// The database URL comes from the environment, not the file. Absence
/// means webhook-only mode, not an error.
pub fn get_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

pub fn classify_config(section: &AnnounceSection) -> ClassifyConfig {
    ClassifyConfig {
        min_winner_prize: section.min_winner_prize,
        min_pool_prize: section.min_pool_prize,
        prize_unit: section.prize_unit.clone(),
    }
}
