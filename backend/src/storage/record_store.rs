//! # Record Store
//!
//! Durable load/save of the animal and adoption collections. The store is
//! the single owner of both in-memory maps and of the id counters; callers
//! get copies and hand back complete new maps to commit.
//!
//! ## File Formats
//!
//! ```json
//! {
//!     "animals": {
//!         "1": { "species": "Dog", "name": "Rex", "age": 5, "is_adopted": false,
//!                "is_vaccinated": true, "last_fed": null,
//!                "admission_date": "2025-06-20 02:00:00" }
//!     },
//!     "next_id": 2,
//!     "next_adoption_id": 1
//! }
//! ```
//!
//! ```json
//! {
//!     "adoptions": {
//!         "1": { "animal_id": "1", "surname": "Kowalski", "pesel": "90010112345",
//!                "phone_number": "600700800", "adoption_date": "2025-06-21 10:15:00" }
//!     }
//! }
//! ```
//!
//! Loading never fails: a missing, unreadable or malformed file is treated
//! as "no prior data" with both counters reset to 1. Saving writes a temp
//! file next to the target and renames it into place; the in-memory state
//! only changes once that succeeded.

use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::config::StoreConfig;
use super::connection::DataConnection;
use crate::domain::id_allocator::IdAllocator;
use crate::domain::models::{Adoption, Animal, Species};

pub type AnimalMap = BTreeMap<String, Animal>;
pub type AdoptionMap = BTreeMap<String, Adoption>;

/// On-disk shape of one animal; the id is the map key
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnimalRecord {
    species: Species,
    name: String,
    age: u32,
    is_adopted: bool,
    is_vaccinated: bool,
    last_fed: Option<String>,
    admission_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnimalsFile {
    animals: BTreeMap<String, AnimalRecord>,
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default = "first_id")]
    next_adoption_id: u64,
}

/// On-disk shape of one adoption; the id is the map key
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdoptionRecord {
    animal_id: String,
    surname: String,
    pesel: String,
    phone_number: String,
    adoption_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AdoptionsFile {
    #[serde(default)]
    adoptions: BTreeMap<String, AdoptionRecord>,
}

fn first_id() -> u64 {
    1
}

impl AnimalRecord {
    fn into_animal(self, id: String) -> Animal {
        Animal {
            id,
            name: self.name,
            age: self.age,
            species: self.species,
            is_adopted: self.is_adopted,
            is_vaccinated: self.is_vaccinated,
            last_fed: self.last_fed,
            admission_date: self.admission_date,
        }
    }

    fn from_animal(animal: &Animal) -> Self {
        Self {
            species: animal.species,
            name: animal.name.clone(),
            age: animal.age,
            is_adopted: animal.is_adopted,
            is_vaccinated: animal.is_vaccinated,
            last_fed: animal.last_fed.clone(),
            admission_date: animal.admission_date.clone(),
        }
    }
}

impl AdoptionRecord {
    fn into_adoption(self, id: String) -> Adoption {
        Adoption {
            id,
            animal_id: self.animal_id,
            surname: self.surname,
            pesel: self.pesel,
            phone_number: self.phone_number,
            adoption_date: self.adoption_date,
        }
    }

    fn from_adoption(adoption: &Adoption) -> Self {
        Self {
            animal_id: adoption.animal_id.clone(),
            surname: adoption.surname.clone(),
            pesel: adoption.pesel.clone(),
            phone_number: adoption.phone_number.clone(),
            adoption_date: adoption.adoption_date.clone(),
        }
    }
}

/// A structured file could not be written
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to persist {path}: {reason}")]
    Persistence { path: String, reason: String },
}

impl StoreError {
    fn persistence(path: &Path, reason: impl ToString) -> Self {
        StoreError::Persistence {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result of loading the animal file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedAnimals {
    pub animals: AnimalMap,
    pub counters: IdAllocator,
}

#[derive(Debug, Default)]
struct StoreState {
    animals: AnimalMap,
    adoptions: AdoptionMap,
    counters: IdAllocator,
}

/// File-backed owner of both record collections
#[derive(Debug)]
pub struct RecordStore {
    animals_path: PathBuf,
    adoptions_path: PathBuf,
    state: Mutex<StoreState>,
}

impl RecordStore {
    /// Open the store in a data directory, using the file names from its config
    pub fn open(connection: &DataConnection) -> Result<Self> {
        let config = StoreConfig::load_or_create(connection)?;
        Ok(Self::with_paths(
            config.animals_path(connection),
            config.adoptions_path(connection),
        ))
    }

    /// Open the store on explicit file paths
    pub fn with_paths<P: Into<PathBuf>, Q: Into<PathBuf>>(animals_path: P, adoptions_path: Q) -> Self {
        let animals_path = animals_path.into();
        let adoptions_path = adoptions_path.into();

        let LoadedAnimals { animals, mut counters } = Self::load_animals(&animals_path);
        let adoptions = Self::load_adoptions(&adoptions_path);
        for id in adoptions.keys() {
            if let Ok(numeric) = id.parse::<u64>() {
                counters.adoptions.advance_past(numeric);
            }
        }

        info!(
            "Opened record store: {} animals, {} adoptions, next ids ({}, {})",
            animals.len(),
            adoptions.len(),
            counters.next_id(),
            counters.next_adoption_id()
        );

        Self {
            animals_path,
            adoptions_path,
            state: Mutex::new(StoreState {
                animals,
                adoptions,
                counters,
            }),
        }
    }

    /// Load the animal file; any failure yields an empty map and counters (1, 1)
    pub fn load_animals(path: &Path) -> LoadedAnimals {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No readable animal file at {:?} ({}), starting empty", path, e);
                return LoadedAnimals::default();
            }
        };

        let file: AnimalsFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!("Animal file {:?} is malformed ({}), starting empty", path, e);
                return LoadedAnimals::default();
            }
        };

        let mut counters = IdAllocator::new(file.next_id, file.next_adoption_id);
        let animals: AnimalMap = file
            .animals
            .into_iter()
            .map(|(id, record)| (id.clone(), record.into_animal(id)))
            .collect();
        for id in animals.keys() {
            if let Ok(numeric) = id.parse::<u64>() {
                counters.animals.advance_past(numeric);
            }
        }

        debug!("Loaded {} animals from {:?}", animals.len(), path);
        LoadedAnimals { animals, counters }
    }

    /// Load the adoption file; any failure yields an empty map
    pub fn load_adoptions(path: &Path) -> AdoptionMap {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No readable adoption file at {:?} ({}), starting empty", path, e);
                return AdoptionMap::new();
            }
        };

        match serde_json::from_str::<AdoptionsFile>(&content) {
            Ok(file) => {
                let adoptions: AdoptionMap = file
                    .adoptions
                    .into_iter()
                    .map(|(id, record)| (id.clone(), record.into_adoption(id)))
                    .collect();
                debug!("Loaded {} adoptions from {:?}", adoptions.len(), path);
                adoptions
            }
            Err(e) => {
                warn!("Adoption file {:?} is malformed ({}), starting empty", path, e);
                AdoptionMap::new()
            }
        }
    }

    /// Persist the full animal collection together with both counters.
    ///
    /// The in-memory state is replaced only when the write succeeded.
    pub fn save_animals(&self, animals: AnimalMap, counters: IdAllocator) -> Result<()> {
        let file = AnimalsFile {
            animals: animals
                .iter()
                .map(|(id, animal)| (id.clone(), AnimalRecord::from_animal(animal)))
                .collect(),
            next_id: counters.next_id(),
            next_adoption_id: counters.next_adoption_id(),
        };

        let mut state = self.lock();
        write_json_atomic(&self.animals_path, &file)?;
        info!(
            "Saved {} animals to {:?} (next ids {}, {})",
            animals.len(),
            self.animals_path,
            counters.next_id(),
            counters.next_adoption_id()
        );
        state.animals = animals;
        state.counters = counters;
        Ok(())
    }

    /// Persist the full adoption collection.
    ///
    /// The in-memory state is replaced only when the write succeeded.
    pub fn save_adoptions(&self, adoptions: AdoptionMap) -> Result<()> {
        let file = AdoptionsFile {
            adoptions: adoptions
                .iter()
                .map(|(id, adoption)| (id.clone(), AdoptionRecord::from_adoption(adoption)))
                .collect(),
        };

        let mut state = self.lock();
        write_json_atomic(&self.adoptions_path, &file)?;
        info!("Saved {} adoptions to {:?}", adoptions.len(), self.adoptions_path);
        state.adoptions = adoptions;
        Ok(())
    }

    /// Copy of the animal collection
    pub fn animals(&self) -> AnimalMap {
        self.lock().animals.clone()
    }

    /// Copy of the adoption collection
    pub fn adoptions(&self) -> AdoptionMap {
        self.lock().adoptions.clone()
    }

    pub fn animal(&self, animal_id: &str) -> Option<Animal> {
        self.lock().animals.get(animal_id).cloned()
    }

    pub fn adoption(&self, adoption_id: &str) -> Option<Adoption> {
        self.lock().adoptions.get(adoption_id).cloned()
    }

    /// Current id counters
    pub fn counters(&self) -> IdAllocator {
        self.lock().counters
    }

    pub fn animals_path(&self) -> &Path {
        &self.animals_path
    }

    pub fn adoptions_path(&self) -> &Path {
        &self.adoptions_path
    }

    // A panic while holding the lock never leaves a half-applied commit
    // behind, so a poisoned lock is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serialize `value` as pretty JSON into `path` via a temp file and rename
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::persistence(path, e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StoreError::persistence(path, e))?;
        }
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json).map_err(|e| StoreError::persistence(path, e))?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StoreError::persistence(path, e)
    })?;
    Ok(())
}
