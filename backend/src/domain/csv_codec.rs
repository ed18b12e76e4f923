//! # CSV Codec
//!
//! Semicolon-delimited import and export of both collections. The codec is
//! pure: it never touches files or the record store. Imports return the
//! validated working set (the in-memory delta) and let the caller commit it.
//!
//! ## Formats
//!
//! ```csv
//! ID;Name;Age;Species;Vaccinated;LastFed;AdmissionDate;Status
//! 1;Rex;5;Dog;Yes;2025-06-20 08:00:00;2025-06-01 12:00:00;In shelter
//! ```
//!
//! ```csv
//! ID;AnimalID;Surname;PESEL;Phone;AdoptionDate
//! 1;1;Kowalski;90010112345;600700800;2025-06-21 10:15:00
//! ```
//!
//! ## Import pipeline
//!
//! 1. The header row must match exactly, otherwise nothing is processed.
//! 2. The working set starts empty (replace) or as a copy of the current
//!    collection (merge).
//! 3. Every data row is validated in one forward pass. A row with any
//!    failure is skipped as a whole and yields exactly one diagnostic
//!    listing all of its failures; a clean row is applied to the working
//!    set at once, so later rows see it in their duplicate check.

use anyhow::{anyhow, Result};
use csv::{Position, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::{debug, warn};
use shared::ImportMode;
use std::collections::BTreeSet;

use crate::domain::id_allocator::IdCounter;
use crate::domain::models::adoption::validate_adopter;
use crate::domain::models::animal::parse_age;
use crate::domain::models::{
    id_sort_key, parse_timestamp, Adoption, AdoptionValidationError, Animal, AnimalValidationError, Species,
};
use crate::storage::{AdoptionMap, AnimalMap};

pub const DELIMITER: u8 = b';';

pub const ANIMAL_HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Age",
    "Species",
    "Vaccinated",
    "LastFed",
    "AdmissionDate",
    "Status",
];

pub const ADOPTION_HEADERS: [&str; 6] = ["ID", "AnimalID", "Surname", "PESEL", "Phone", "AdoptionDate"];

pub const YES: &str = "Yes";
pub const NO: &str = "No";
pub const STATUS_ADOPTED: &str = "Adopted";
pub const STATUS_IN_SHELTER: &str = "In shelter";

/// A single failed rule within one CSV row
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("id must be a positive integer: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Animal(#[from] AnimalValidationError),
    #[error(transparent)]
    Adoption(#[from] AdoptionValidationError),
    #[error("duplicate animal id: {0}")]
    DuplicateAnimalId(String),
    #[error("duplicate adoption id: {0}")]
    DuplicateAdoptionId(String),
    #[error("animal not found: {0}")]
    UnknownAnimal(String),
}

/// One line of the import error list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportDiagnostic {
    #[error("Invalid CSV headers: expected '{expected}', found '{found}'")]
    MalformedHeader { expected: String, found: String },
    /// `row` is the file line the record starts on; the header is line 1
    #[error("Row {row}: {}", join_errors(.errors))]
    Row { row: u64, errors: Vec<RowError> },
}

fn join_errors(errors: &[RowError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Validated animal rows, ready to be committed
#[derive(Debug, Clone)]
pub struct AnimalImport {
    pub animals: AnimalMap,
    pub counter: IdCounter,
    pub accepted: usize,
    pub diagnostics: Vec<ImportDiagnostic>,
}

/// Validated adoption rows, ready to be committed
#[derive(Debug, Clone)]
pub struct AdoptionImport {
    pub adoptions: AdoptionMap,
    pub counter: IdCounter,
    pub accepted: usize,
    /// Animals referenced by accepted rows; they must be flagged adopted
    pub adopted_animal_ids: BTreeSet<String>,
    pub diagnostics: Vec<ImportDiagnostic>,
}

/// Import animal rows from CSV text.
///
/// `Err` means the header did not match and nothing was processed.
pub fn import_animals(
    text: &str,
    mode: ImportMode,
    current: &AnimalMap,
    current_counter: IdCounter,
) -> Result<AnimalImport, ImportDiagnostic> {
    let mut rows = read_rows(text).into_iter();
    check_header(rows.next().map(|row| row.record), &ANIMAL_HEADERS)?;

    let (mut animals, mut counter) = match mode {
        ImportMode::Replace => (AnimalMap::new(), IdCounter::default()),
        ImportMode::Merge => (current.clone(), current_counter),
    };
    let mut accepted = 0;
    let mut diagnostics = Vec::new();

    for row in rows {
        match parse_animal_row(&row.record, &animals) {
            Ok((numeric_id, animal)) => {
                counter.advance_past(numeric_id);
                animals.insert(animal.id.clone(), animal);
                accepted += 1;
            }
            Err(errors) => diagnostics.push(ImportDiagnostic::Row {
                row: row.line,
                errors,
            }),
        }
    }

    debug!(
        "Animal import ({}): {} accepted, {} rejected",
        mode,
        accepted,
        diagnostics.len()
    );
    Ok(AnimalImport {
        animals,
        counter,
        accepted,
        diagnostics,
    })
}

/// Import adoption rows from CSV text.
///
/// Referenced animals are looked up in `animals`, the current animal
/// collection. `Err` means the header did not match.
pub fn import_adoptions(
    text: &str,
    mode: ImportMode,
    current: &AdoptionMap,
    current_counter: IdCounter,
    animals: &AnimalMap,
) -> Result<AdoptionImport, ImportDiagnostic> {
    let mut rows = read_rows(text).into_iter();
    check_header(rows.next().map(|row| row.record), &ADOPTION_HEADERS)?;

    let (mut adoptions, mut counter) = match mode {
        ImportMode::Replace => (AdoptionMap::new(), IdCounter::default()),
        ImportMode::Merge => (current.clone(), current_counter),
    };
    let mut accepted = 0;
    let mut adopted_animal_ids = BTreeSet::new();
    let mut diagnostics = Vec::new();

    for row in rows {
        match parse_adoption_row(&row.record, &adoptions, animals) {
            Ok((numeric_id, adoption)) => {
                counter.advance_past(numeric_id);
                adopted_animal_ids.insert(adoption.animal_id.clone());
                adoptions.insert(adoption.id.clone(), adoption);
                accepted += 1;
            }
            Err(errors) => diagnostics.push(ImportDiagnostic::Row {
                row: row.line,
                errors,
            }),
        }
    }

    debug!(
        "Adoption import ({}): {} accepted, {} rejected",
        mode,
        accepted,
        diagnostics.len()
    );
    Ok(AdoptionImport {
        adoptions,
        counter,
        accepted,
        adopted_animal_ids,
        diagnostics,
    })
}

/// Render the animal collection as CSV, ordered by numeric id
pub fn export_animals(animals: &AnimalMap) -> Result<String> {
    let mut rows: Vec<&Animal> = animals.values().collect();
    rows.sort_by(|a, b| id_sort_key(&a.id).cmp(&id_sort_key(&b.id)));

    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(ANIMAL_HEADERS)?;
    for animal in rows {
        let age = animal.age.to_string();
        writer.write_record([
            animal.id.as_str(),
            animal.name.as_str(),
            age.as_str(),
            animal.species.label(),
            if animal.is_vaccinated { YES } else { NO },
            animal.last_fed.as_deref().unwrap_or(""),
            animal.admission_date.as_deref().unwrap_or(""),
            if animal.is_adopted { STATUS_ADOPTED } else { STATUS_IN_SHELTER },
        ])?;
    }
    finish(writer)
}

/// Render the adoption collection as CSV, ordered by numeric id
pub fn export_adoptions(adoptions: &AdoptionMap) -> Result<String> {
    let mut rows: Vec<&Adoption> = adoptions.values().collect();
    rows.sort_by(|a, b| id_sort_key(&a.id).cmp(&id_sort_key(&b.id)));

    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(ADOPTION_HEADERS)?;
    for adoption in rows {
        writer.write_record([
            adoption.id.as_str(),
            adoption.animal_id.as_str(),
            adoption.surname.as_str(),
            adoption.pesel.as_str(),
            adoption.phone_number.as_str(),
            adoption.adoption_date.as_str(),
        ])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// One CSV record and the file line it starts on
struct Row {
    line: u64,
    record: StringRecord,
}

/// Buffer every record of the text in a single forward pass.
///
/// Reading an in-memory `&str` with flexible record lengths has no failure
/// mode left (no I/O, always valid UTF-8, no length check); should the
/// reader still report an error, the scan ends there.
fn read_rows(text: &str) -> Vec<Row> {
    let bytes = text.strip_prefix('\u{feff}').unwrap_or(text).as_bytes();
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(1, |position| start_line(bytes, position));
                rows.push(Row { line, record });
            }
            Err(e) => {
                warn!("Stopped reading CSV input: {}", e);
                break;
            }
        }
    }
    rows
}

/// Line a record starts on.
///
/// The reader stamps each record with the position reached before it skips
/// blank lines, so the newlines skipped from there are added back.
fn start_line(bytes: &[u8], position: &Position) -> u64 {
    let skipped = usize::try_from(position.byte())
        .ok()
        .and_then(|offset| bytes.get(offset..))
        .unwrap_or_default()
        .iter()
        .take_while(|&&b| b == b'\r' || b == b'\n')
        .filter(|&&b| b == b'\n')
        .count();
    position.line() + skipped as u64
}

fn check_header(header: Option<StringRecord>, expected: &[&str]) -> Result<(), ImportDiagnostic> {
    let found: Vec<String> = match header {
        Some(record) => record.iter().map(|field| field.trim().to_string()).collect(),
        None => Vec::new(),
    };
    if found.iter().map(String::as_str).eq(expected.iter().copied()) {
        return Ok(());
    }
    Err(ImportDiagnostic::MalformedHeader {
        expected: expected.join(";"),
        found: found.join(";"),
    })
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a record id; ids are positive integers, stored without leading zeros.
///
/// The largest `u64` is refused: the id counter has to stay above every id.
fn parse_id(value: &str) -> Result<u64, RowError> {
    match value.parse::<u64>() {
        Ok(id) if id > 0 && id.checked_add(1).is_some() => Ok(id),
        _ => Err(RowError::InvalidId(value.to_string())),
    }
}

/// Map key for a raw id cell; numeric ids are normalised
fn id_key(value: &str) -> String {
    match value.parse::<u64>() {
        Ok(id) => id.to_string(),
        Err(_) => value.to_string(),
    }
}

fn parse_animal_row(record: &StringRecord, working: &AnimalMap) -> Result<(u64, Animal), Vec<RowError>> {
    if record.len() != ANIMAL_HEADERS.len() {
        return Err(vec![RowError::FieldCount {
            expected: ANIMAL_HEADERS.len(),
            found: record.len(),
        }]);
    }

    let mut errors: Vec<RowError> = Vec::new();

    let raw_id = field(record, 0);
    let numeric_id = parse_id(raw_id).map_err(|e| errors.push(e)).ok();

    let name = field(record, 1);
    if name.is_empty() {
        errors.push(AnimalValidationError::EmptyName.into());
    }

    let age = parse_age(field(record, 2)).map_err(|e| errors.push(e.into())).ok();
    let species = field(record, 3)
        .parse::<Species>()
        .map_err(|e| errors.push(e.into()))
        .ok();
    let is_vaccinated = field(record, 4).eq_ignore_ascii_case(YES);

    let last_fed = optional(field(record, 5));
    if let Some(value) = last_fed.as_deref() {
        if parse_timestamp(value).is_none() {
            errors.push(AnimalValidationError::InvalidLastFed(value.to_string()).into());
        }
    }
    let admission_date = optional(field(record, 6));
    if let Some(value) = admission_date.as_deref() {
        if parse_timestamp(value).is_none() {
            errors.push(AnimalValidationError::InvalidAdmissionDate(value.to_string()).into());
        }
    }
    let is_adopted = field(record, 7).eq_ignore_ascii_case(STATUS_ADOPTED);

    let key = id_key(raw_id);
    if working.contains_key(&key) {
        errors.push(RowError::DuplicateAnimalId(raw_id.to_string()));
    }

    let (Some(numeric_id), Some(age), Some(species)) = (numeric_id, age, species) else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok((
        numeric_id,
        Animal {
            id: key,
            name: name.to_string(),
            age,
            species,
            is_adopted,
            is_vaccinated,
            last_fed,
            admission_date,
        },
    ))
}

fn parse_adoption_row(
    record: &StringRecord,
    working: &AdoptionMap,
    animals: &AnimalMap,
) -> Result<(u64, Adoption), Vec<RowError>> {
    if record.len() != ADOPTION_HEADERS.len() {
        return Err(vec![RowError::FieldCount {
            expected: ADOPTION_HEADERS.len(),
            found: record.len(),
        }]);
    }

    let mut errors: Vec<RowError> = Vec::new();

    let raw_id = field(record, 0);
    let numeric_id = parse_id(raw_id).map_err(|e| errors.push(e)).ok();

    let animal_id = id_key(field(record, 1));
    let surname = field(record, 2);
    let pesel = field(record, 3);
    let phone_number = field(record, 4);
    errors.extend(validate_adopter(surname, pesel, phone_number).into_iter().map(RowError::from));

    if !animals.contains_key(&animal_id) {
        errors.push(RowError::UnknownAnimal(animal_id.clone()));
    }

    let adoption_date = field(record, 5);
    if adoption_date.is_empty() {
        errors.push(AdoptionValidationError::MissingAdoptionDate.into());
    } else if parse_timestamp(adoption_date).is_none() {
        errors.push(AdoptionValidationError::InvalidAdoptionDate(adoption_date.to_string()).into());
    }

    let key = id_key(raw_id);
    if working.contains_key(&key) {
        errors.push(RowError::DuplicateAdoptionId(raw_id.to_string()));
    }

    let Some(numeric_id) = numeric_id else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok((
        numeric_id,
        Adoption {
            id: key,
            animal_id,
            surname: surname.to_string(),
            pesel: pesel.to_string(),
            phone_number: phone_number.to_string(),
            adoption_date: adoption_date.to_string(),
        },
    ))
}
