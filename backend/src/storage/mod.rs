//! # Storage Module
//!
//! Durable persistence for the shelter records.
//!
//! - **connection**: the data directory everything lives in
//! - **config**: `shelter_config.yaml`, naming the record files
//! - **record_store**: fail-open load and atomic save of both collections,
//!   sole owner of the in-memory maps and id counters

pub mod config;
pub mod connection;
pub mod record_store;

#[cfg(test)]
pub mod test_utils;

pub use config::StoreConfig;
pub use connection::DataConnection;
pub use record_store::{AdoptionMap, AnimalMap, LoadedAnimals, RecordStore, StoreError};
