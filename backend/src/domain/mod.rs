//! # Domain Module
//!
//! Contains all business logic for the shelter records.
//!
//! ## Module Organization
//!
//! - **models**: animals, adoptions, species and the timestamp format
//! - **id_allocator**: monotonic id counters for both collections
//! - **commands**: command, result and filter types the services take
//! - **csv_codec**: pure CSV import validation and export rendering
//! - **animal_service** / **adoption_service**: interactive operations that
//!   keep animals and adoptions consistent with each other
//! - **transfer_service**: file-level CSV import and export
//! - **report_service**: population statistics
//!
//! ## Business Rules
//!
//! - Animal names are unique (case-insensitive) among registered animals
//! - An animal referenced by an adoption cannot be deleted
//! - Adopting flags the animal; deleting the adoption clears the flag
//! - Ids are never reused, including after imports with explicit ids
//! - A CSV import commits every row that passed validation and reports the
//!   rest, one line per rejected row

pub mod adoption_service;
pub mod animal_service;
pub mod commands;
pub mod csv_codec;
pub mod errors;
pub mod id_allocator;
pub mod models;
pub mod report_service;
pub mod transfer_service;

pub use adoption_service::AdoptionService;
pub use animal_service::AnimalService;
pub use errors::ShelterError;
pub use id_allocator::{IdAllocator, IdCounter, IdExhausted};
pub use report_service::{ReportService, ShelterReport};
pub use transfer_service::TransferService;
