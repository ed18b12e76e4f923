//! # Store Configuration
//!
//! A single YAML file `shelter_config.yaml` at the root of the data directory
//! names the record files.
//!
//! ```text
//! data/
//! ├── shelter_config.yaml    ← This module manages this file
//! ├── animals.json
//! └── adoptions.json
//! ```
//!
//! ## YAML Format
//!
//! ```yaml
//! animals_file: animals.json
//! adoptions_file: adoptions.json
//! created_at: "2025-01-21T19:30:00+00:00"
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::connection::DataConnection;

pub const CONFIG_FILE_NAME: &str = "shelter_config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// File name of the animal collection, relative to the data directory
    #[serde(default = "default_animals_file")]
    pub animals_file: String,
    /// File name of the adoption collection, relative to the data directory
    #[serde(default = "default_adoptions_file")]
    pub adoptions_file: String,
    /// When the data directory was first set up
    #[serde(default)]
    pub created_at: String,
}

fn default_animals_file() -> String {
    "animals.json".to_string()
}

fn default_adoptions_file() -> String {
    "adoptions.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            animals_file: default_animals_file(),
            adoptions_file: default_adoptions_file(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

impl StoreConfig {
    fn config_path(connection: &DataConnection) -> PathBuf {
        connection.file_path(CONFIG_FILE_NAME)
    }

    /// Load the config, writing the defaults on first run.
    ///
    /// A config file that cannot be parsed is replaced by the defaults in
    /// memory only; the broken file is left on disk for inspection.
    pub fn load_or_create(connection: &DataConnection) -> Result<Self> {
        let config_path = Self::config_path(connection);

        if !config_path.exists() {
            let config = StoreConfig::default();
            config.save(connection)?;
            info!("Created default store config at {:?}", config_path);
            return Ok(config);
        }

        let yaml_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {:?}", config_path))?;
        match serde_yaml::from_str::<StoreConfig>(&yaml_content) {
            Ok(config) => {
                debug!("Loaded store config from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Store config {:?} is malformed ({}), using defaults", config_path, e);
                Ok(StoreConfig::default())
            }
        }
    }

    /// Persist the config with an atomic temp-file write
    pub fn save(&self, connection: &DataConnection) -> Result<()> {
        let config_path = Self::config_path(connection);
        let yaml_content = serde_yaml::to_string(self)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved store config to {:?}", config_path);
        Ok(())
    }

    pub fn animals_path(&self, connection: &DataConnection) -> PathBuf {
        connection.file_path(&self.animals_file)
    }

    pub fn adoptions_path(&self, connection: &DataConnection) -> PathBuf {
        connection.file_path(&self.adoptions_file)
    }
}
