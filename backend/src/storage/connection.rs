use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "SHELTER_DATA_DIR";

/// DataConnection owns the data directory all shelter files live in
#[derive(Debug, Clone)]
pub struct DataConnection {
    base_directory: PathBuf,
}

impl DataConnection {
    /// Create a new connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the default data directory.
    ///
    /// `SHELTER_DATA_DIR` wins; otherwise the platform data directory is
    /// used, falling back to `./shelter_data`.
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_directory())
    }

    fn default_directory() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                debug!("Using data directory from {}: {}", DATA_DIR_ENV, dir);
                return PathBuf::from(dir.trim());
            }
        }
        match dirs::data_dir() {
            Some(data_dir) => data_dir.join("Shelter"),
            None => PathBuf::from("shelter_data"),
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of a file inside the data directory
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }
}
