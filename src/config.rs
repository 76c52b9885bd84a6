use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Suggestions cycled through in the genre field.
    #[serde(default = "default_genres")]
    pub genres: Vec<String>,

    /// Suggestions cycled through in the status field.
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tale-keeper");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("stories.db").to_string_lossy().to_string()
}

fn default_genres() -> Vec<String> {
    [
        "Romance",
        "Drama",
        "Fantasy",
        "Mystery",
        "Horror",
        "Adventure",
        "Comedy",
        "Sci-Fi",
        "Historical",
        "Others",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_statuses() -> Vec<String> {
    ["Ongoing", "Completed", "Hiatus"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            genres: default_genres(),
            statuses: default_statuses(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads the config at `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tale-keeper")
            .join("config.toml")
    }
}
