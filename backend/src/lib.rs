//! # Shelter Backend
//!
//! Data management core for an animal shelter: the record model, durable
//! storage of animals and adoptions, CSV import/export, and the operations
//! that keep both collections consistent. Every front end talks to it
//! through [`Backend`].
//!
//! ```text
//! UI Layer (out of scope)
//!     ↓
//! Domain Layer (services, CSV codec)
//!     ↓
//! Storage Layer (record store, data directory)
//! ```

use anyhow::Result;
use log::info;
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use storage::{DataConnection, RecordStore};

/// Main backend struct that wires all services to one record store
pub struct Backend {
    pub connection: DataConnection,
    pub store: Arc<RecordStore>,
    pub animal_service: domain::AnimalService,
    pub adoption_service: domain::AdoptionService,
    pub transfer_service: domain::TransferService,
    pub report_service: domain::ReportService,
}

impl Backend {
    /// Open the backend on the default data directory
    pub fn new_default() -> Result<Self> {
        Self::new(DataConnection::new_default()?)
    }

    /// Open the backend on a data directory, loading any stored records
    pub fn new(connection: DataConnection) -> Result<Self> {
        info!("Starting shelter backend in {:?}", connection.base_directory());
        let store = Arc::new(RecordStore::open(&connection)?);

        Ok(Backend {
            animal_service: domain::AnimalService::new(store.clone()),
            adoption_service: domain::AdoptionService::new(store.clone()),
            transfer_service: domain::TransferService::new(store.clone()),
            report_service: domain::ReportService::new(store.clone()),
            store,
            connection,
        })
    }
}
