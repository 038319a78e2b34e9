//! # Application Configuration
//!
//! Settings live in a YAML file next to the data they describe:
//!
//! ```yaml
//! data_directory: "/home/me/.local/share/Receipt Tracker"
//! database_file: "receipts.db"
//! photo_quality: 90
//! write_mode: optimistic
//! log_filter: "info"
//! ```
//!
//! Every field is optional; a missing file means "all defaults".

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::DEFAULT_PHOTO_QUALITY;
use crate::storage::WriteMode;

pub const CONFIG_FILE_NAME: &str = "receipt_tracker.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory for the preference database and photos
    pub data_directory: PathBuf,
    /// Preference database file name inside `data_directory`
    pub database_file: String,
    /// JPEG quality hint passed to the photo provider (1..=100)
    pub photo_quality: u8,
    pub write_mode: WriteMode,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: Self::default_data_directory(),
            database_file: "receipts.db".to_string(),
            photo_quality: DEFAULT_PHOTO_QUALITY,
            write_mode: WriteMode::Optimistic,
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Photo quality must be between 1 and 100, got {0}")]
    InvalidPhotoQuality(u8),
    #[error("Database file name cannot be empty")]
    EmptyDatabaseFile,
}

impl AppConfig {
    /// Platform data directory, or the temp directory when there is none
    pub fn default_data_directory() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("Receipt Tracker")
    }

    /// Config rooted at `data_directory` with every other field defaulted
    pub fn with_data_directory<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            data_directory: data_directory.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load the config file, falling back to defaults when it doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&yaml_content)?;
        config.validate()?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save the config, writing a temp file and renaming it into place
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yaml::to_string(self)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, path)?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.photo_quality) {
            return Err(ConfigError::InvalidPhotoQuality(self.photo_quality));
        }
        if self.database_file.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseFile);
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_directory.join(&self.database_file)
    }
}
