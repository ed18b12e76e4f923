//! Test utilities: throwaway data directories cleaned up on drop, even if a
//! test panics, plus fixture builders for records.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::DataConnection;
use super::record_store::RecordStore;
use crate::domain::models::{Adoption, Animal, Species};
use crate::domain::{AdoptionService, AnimalService, ReportService, TransferService};

/// Route `log` output through env_logger once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Temporary data directory with a connection, removed when dropped
pub struct TestEnvironment {
    pub connection: DataConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        init_logging();
        let temp_dir = TempDir::new()?;
        let connection = DataConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    /// Open a fresh record store on this environment's data directory
    pub fn open_store(&self) -> Result<RecordStore> {
        RecordStore::open(&self.connection)
    }

    /// Write a file into the data directory and return its path
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.base_path.join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Services wired to a shared store in a temporary data directory
pub struct TestHelper {
    pub env: TestEnvironment,
    pub store: Arc<RecordStore>,
    pub animals: AnimalService,
    pub adoptions: AdoptionService,
    pub transfer: TransferService,
    pub reports: ReportService,
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        Self::from_env(TestEnvironment::new()?)
    }

    /// Build services on an existing environment (e.g. after seeding files)
    pub fn from_env(env: TestEnvironment) -> Result<Self> {
        let store = Arc::new(env.open_store()?);
        Ok(Self {
            animals: AnimalService::new(store.clone()),
            adoptions: AdoptionService::new(store.clone()),
            transfer: TransferService::new(store.clone()),
            reports: ReportService::new(store.clone()),
            store,
            env,
        })
    }

    /// Reopen the store from disk, as a restarted process would
    pub fn reopen_store(&self) -> Result<RecordStore> {
        self.env.open_store()
    }
}

pub fn sample_animal(id: &str, name: &str, species: Species) -> Animal {
    Animal {
        id: id.to_string(),
        name: name.to_string(),
        age: 3,
        species,
        is_adopted: false,
        is_vaccinated: false,
        last_fed: None,
        admission_date: Some("2025-06-20 02:00:00".to_string()),
    }
}

pub fn sample_adoption(id: &str, animal_id: &str) -> Adoption {
    Adoption {
        id: id.to_string(),
        animal_id: animal_id.to_string(),
        surname: "Kowalski".to_string(),
        pesel: "90010112345".to_string(),
        phone_number: "600700800".to_string(),
        adoption_date: "2025-06-21 10:15:00".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_path.clone();
            assert!(base_path.exists());
        }
        assert!(!base_path.exists());
        Ok(())
    }

    #[test]
    fn test_helper_starts_empty() -> Result<()> {
        let helper = TestHelper::new()?;
        assert!(helper.store.animals().is_empty());
        assert!(helper.store.adoptions().is_empty());
        assert_eq!(helper.store.counters().next_id(), 1);
        Ok(())
    }
}
