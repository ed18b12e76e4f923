//! Monotonic id counters for both record collections.
//!
//! Ids are handed out as decimal strings and never reused: a counter only
//! ever moves forward, including when rows with explicit ids are imported.

use serde::{Deserialize, Serialize};

/// A single monotonic counter; always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub fn new(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// The value the next call to [`IdCounter::allocate`] returns
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Return the current value and move past it.
    ///
    /// The last representable value is never handed out, so the counter
    /// always stays above every id it issued.
    pub fn allocate(&mut self) -> Result<u64, IdExhausted> {
        let id = self.next;
        self.next = id.checked_add(1).ok_or(IdExhausted)?;
        Ok(id)
    }

    /// Guarantee future allocations never collide with `id`
    pub fn advance_past(&mut self, id: u64) {
        self.next = self.next.max(id.saturating_add(1));
    }
}

/// The counter reached the top of the id range
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no ids left to allocate")]
pub struct IdExhausted;

impl Default for IdCounter {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Counters for animals and adoptions, persisted together with the animals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdAllocator {
    pub animals: IdCounter,
    pub adoptions: IdCounter,
}

impl IdAllocator {
    pub fn new(next_id: u64, next_adoption_id: u64) -> Self {
        Self {
            animals: IdCounter::new(next_id),
            adoptions: IdCounter::new(next_adoption_id),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.animals.peek()
    }

    pub fn next_adoption_id(&self) -> u64 {
        self.adoptions.peek()
    }

    pub fn allocate_animal_id(&mut self) -> Result<String, IdExhausted> {
        Ok(self.animals.allocate()?.to_string())
    }

    pub fn allocate_adoption_id(&mut self) -> Result<String, IdExhausted> {
        Ok(self.adoptions.allocate()?.to_string())
    }
}
