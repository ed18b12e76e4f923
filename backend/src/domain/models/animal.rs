//! Domain model for an animal kept in the shelter.
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::parse_timestamp;

/// Closed set of species an animal can be recorded as.
///
/// A classification tag only; every species is handled the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Hamster,
    Turtle,
}

impl Species {
    pub const ALL: [Species; 6] = [
        Species::Dog,
        Species::Cat,
        Species::Bird,
        Species::Rabbit,
        Species::Hamster,
        Species::Turtle,
    ];

    /// Label used in files and CSV
    pub fn label(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Bird => "Bird",
            Species::Rabbit => "Rabbit",
            Species::Hamster => "Hamster",
            Species::Turtle => "Turtle",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Species {
    type Err = AnimalValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .into_iter()
            .find(|species| species.label() == s)
            .ok_or_else(|| AnimalValidationError::UnknownSpecies(s.to_string()))
    }
}

/// How long ago an animal was last fed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedingStatus {
    /// No feeding has been recorded
    NoData,
    /// `last_fed` is set but not in the canonical format
    InvalidFormat,
    /// Whole hours elapsed since the last feeding, floored
    HoursAgo(i64),
}

impl fmt::Display for FeedingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeedingStatus::NoData => write!(f, "No data"),
            FeedingStatus::InvalidFormat => write!(f, "Invalid date format"),
            FeedingStatus::HoursAgo(hours) => write!(f, "{} hours ago", hours),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub species: Species,
    pub is_adopted: bool,
    pub is_vaccinated: bool,
    pub last_fed: Option<String>,
    pub admission_date: Option<String>,
}

impl Animal {
    /// Feeding status relative to the current local time
    pub fn feeding_status(&self) -> FeedingStatus {
        self.feeding_status_at(Local::now().naive_local())
    }

    /// Feeding status relative to `now`
    pub fn feeding_status_at(&self, now: NaiveDateTime) -> FeedingStatus {
        let Some(last_fed) = self.last_fed.as_deref() else {
            return FeedingStatus::NoData;
        };
        match parse_timestamp(last_fed) {
            Some(fed_at) => {
                let seconds = (now - fed_at).num_seconds();
                FeedingStatus::HoursAgo(seconds.div_euclid(3600))
            }
            None => FeedingStatus::InvalidFormat,
        }
    }

    /// Check the fields an interactive edit can set
    pub fn validate(&self) -> Result<(), AnimalValidationError> {
        if self.name.trim().is_empty() {
            return Err(AnimalValidationError::EmptyName);
        }
        if let Some(last_fed) = self.last_fed.as_deref() {
            if parse_timestamp(last_fed).is_none() {
                return Err(AnimalValidationError::InvalidLastFed(last_fed.to_string()));
            }
        }
        if let Some(admission_date) = self.admission_date.as_deref() {
            if parse_timestamp(admission_date).is_none() {
                return Err(AnimalValidationError::InvalidAdmissionDate(admission_date.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimalValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("age must be non-negative: {0}")]
    NegativeAge(i64),
    #[error("age is not a whole number: {0}")]
    InvalidAge(String),
    #[error("invalid species: {0}")]
    UnknownSpecies(String),
    #[error("invalid last fed date format: {0}")]
    InvalidLastFed(String),
    #[error("invalid admission date format: {0}")]
    InvalidAdmissionDate(String),
}

/// Parse an age cell; an empty cell means 0
pub fn parse_age(value: &str) -> Result<u32, AnimalValidationError> {
    if value.is_empty() {
        return Ok(0);
    }
    let age = value
        .parse::<i64>()
        .map_err(|_| AnimalValidationError::InvalidAge(value.to_string()))?;
    if age < 0 {
        return Err(AnimalValidationError::NegativeAge(age));
    }
    u32::try_from(age).map_err(|_| AnimalValidationError::InvalidAge(value.to_string()))
}
