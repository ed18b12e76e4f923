//! Domain model for an adoption of a shelter animal.
use serde::{Deserialize, Serialize};

use super::parse_timestamp;

pub const PESEL_LENGTH: usize = 11;
pub const PHONE_NUMBER_LENGTH: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adoption {
    pub id: String,
    /// Id of the adopted animal
    pub animal_id: String,
    /// Surname of the adopting person
    pub surname: String,
    /// National identity code, 11 digits (no checksum validation)
    pub pesel: String,
    pub phone_number: String,
    pub adoption_date: String,
}

impl Adoption {
    /// Check the adopter details; returns the first failure
    pub fn validate(&self) -> Result<(), AdoptionValidationError> {
        match self.validation_errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Every adopter detail that fails validation, in field order
    pub fn validation_errors(&self) -> Vec<AdoptionValidationError> {
        let mut errors = validate_adopter(&self.surname, &self.pesel, &self.phone_number);
        if parse_timestamp(&self.adoption_date).is_none() {
            errors.push(AdoptionValidationError::InvalidAdoptionDate(self.adoption_date.clone()));
        }
        errors
    }
}

/// Validate surname, PESEL and phone number as entered by a user
pub fn validate_adopter(surname: &str, pesel: &str, phone_number: &str) -> Vec<AdoptionValidationError> {
    let mut errors = Vec::new();
    if surname.trim().is_empty() {
        errors.push(AdoptionValidationError::EmptySurname);
    }
    if !is_digits(pesel, PESEL_LENGTH) {
        errors.push(AdoptionValidationError::InvalidPesel(pesel.to_string()));
    }
    if !is_digits(phone_number, PHONE_NUMBER_LENGTH) {
        errors.push(AdoptionValidationError::InvalidPhoneNumber(phone_number.to_string()));
    }
    errors
}

fn is_digits(value: &str, length: usize) -> bool {
    value.len() == length && value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdoptionValidationError {
    #[error("surname must not be empty")]
    EmptySurname,
    #[error("PESEL must be exactly 11 digits: {0}")]
    InvalidPesel(String),
    #[error("phone number must be exactly 9 digits: {0}")]
    InvalidPhoneNumber(String),
    #[error("adoption date is required")]
    MissingAdoptionDate,
    #[error("invalid adoption date format: {0}")]
    InvalidAdoptionDate(String),
}
