//! Domain models for shelter records.
//!
//! Timestamps are kept as strings in the canonical `YYYY-MM-DD HH:MM:SS`
//! format, exactly as they are persisted and exchanged through CSV. The
//! helpers below are the only place that format is spelled out.

pub mod adoption;
pub mod animal;

use chrono::{Local, NaiveDateTime};

pub use adoption::{Adoption, AdoptionValidationError};
pub use animal::{Animal, AnimalValidationError, FeedingStatus, Species};

/// Canonical timestamp format for every date field
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a timestamp in the canonical format
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

/// Format a timestamp in the canonical format
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time in the canonical format
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now().naive_local())
}

/// Numeric sort key for record ids; ids that are not numbers sort last
pub fn id_sort_key(id: &str) -> (u64, &str) {
    (id.parse::<u64>().unwrap_or(u64::MAX), id)
}
