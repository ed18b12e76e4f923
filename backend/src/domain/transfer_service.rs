//! CSV import and export of the shelter records.
//!
//! This service is the file-facing side of the CSV codec: it resolves the
//! paths typed by the user, reads or writes whole files, and commits
//! validated imports through the record store. Row validation itself lives
//! in [`crate::domain::csv_codec`].

use anyhow::{Context, Result};
use log::{error, info, warn};
use shared::{ExportReport, ImportMode, ImportReport};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::csv_codec;
use crate::storage::RecordStore;

/// Service that moves records between CSV files and the record store
#[derive(Clone)]
pub struct TransferService {
    store: Arc<RecordStore>,
}

impl TransferService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Import animals from a CSV file and commit every accepted row
    pub fn import_animals_csv(&self, path: &str, mode: ImportMode) -> Result<ImportReport> {
        let file_path = sanitize_path(path);
        info!("Importing animals from {:?} ({})", file_path, mode);

        let text = read_csv(&file_path)?;
        let current = self.store.animals();
        let mut counters = self.store.counters();

        let import = match csv_codec::import_animals(&text, mode, &current, counters.animals) {
            Ok(import) => import,
            Err(diagnostic) => {
                warn!("Animal import aborted: {}", diagnostic);
                return Ok(aborted_report(&file_path, mode, current.len(), diagnostic.to_string()));
            }
        };

        counters.animals = import.counter;
        let collection_size = import.animals.len();
        self.store.save_animals(import.animals, counters)?;

        let errors: Vec<String> = import.diagnostics.iter().map(ToString::to_string).collect();
        info!(
            "Imported {} animals from {:?}, {} rows rejected, {} animals stored",
            import.accepted,
            file_path,
            errors.len(),
            collection_size
        );

        Ok(ImportReport {
            file_path: file_path.to_string_lossy().to_string(),
            mode,
            accepted_count: import.accepted,
            collection_size,
            errors,
            committed: true,
        })
    }

    /// Import adoptions from a CSV file, flagging every adopted animal
    pub fn import_adoptions_csv(&self, path: &str, mode: ImportMode) -> Result<ImportReport> {
        let file_path = sanitize_path(path);
        info!("Importing adoptions from {:?} ({})", file_path, mode);

        let text = read_csv(&file_path)?;
        let current = self.store.adoptions();
        let mut animals = self.store.animals();
        let mut counters = self.store.counters();

        let import = match csv_codec::import_adoptions(&text, mode, &current, counters.adoptions, &animals) {
            Ok(import) => import,
            Err(diagnostic) => {
                warn!("Adoption import aborted: {}", diagnostic);
                return Ok(aborted_report(&file_path, mode, current.len(), diagnostic.to_string()));
            }
        };

        for animal_id in &import.adopted_animal_ids {
            if let Some(animal) = animals.get_mut(animal_id) {
                animal.is_adopted = true;
            }
        }
        counters.adoptions = import.counter;

        let collection_size = import.adoptions.len();
        self.store.save_adoptions(import.adoptions)?;
        self.store.save_animals(animals, counters)?;

        let errors: Vec<String> = import.diagnostics.iter().map(ToString::to_string).collect();
        info!(
            "Imported {} adoptions from {:?}, {} rows rejected, {} adoptions stored",
            import.accepted,
            file_path,
            errors.len(),
            collection_size
        );

        Ok(ImportReport {
            file_path: file_path.to_string_lossy().to_string(),
            mode,
            accepted_count: import.accepted,
            collection_size,
            errors,
            committed: true,
        })
    }

    /// Write every animal to a CSV file
    pub fn export_animals_csv(&self, path: &str) -> Result<ExportReport> {
        let animals = self.store.animals();
        let text = csv_codec::export_animals(&animals)?;
        let file_path = write_csv(path, &text)?;

        info!("Exported {} animals to {:?}", animals.len(), file_path);
        Ok(ExportReport {
            file_path: file_path.to_string_lossy().to_string(),
            record_count: animals.len(),
        })
    }

    /// Write every adoption to a CSV file
    pub fn export_adoptions_csv(&self, path: &str) -> Result<ExportReport> {
        let adoptions = self.store.adoptions();
        let text = csv_codec::export_adoptions(&adoptions)?;
        let file_path = write_csv(path, &text)?;

        info!("Exported {} adoptions to {:?}", adoptions.len(), file_path);
        Ok(ExportReport {
            file_path: file_path.to_string_lossy().to_string(),
            record_count: adoptions.len(),
        })
    }
}

fn aborted_report(file_path: &Path, mode: ImportMode, collection_size: usize, error: String) -> ImportReport {
    ImportReport {
        file_path: file_path.to_string_lossy().to_string(),
        mode,
        accepted_count: 0,
        collection_size,
        errors: vec![error],
        committed: false,
    }
}

fn read_csv(file_path: &Path) -> Result<String> {
    fs::read_to_string(file_path).with_context(|| format!("Failed to read CSV file {:?}", file_path))
}

fn write_csv(path: &str, text: &str) -> Result<PathBuf> {
    let file_path = sanitize_path(path);

    if let Some(parent_dir) = file_path.parent() {
        if !parent_dir.as_os_str().is_empty() {
            fs::create_dir_all(parent_dir).map_err(|e| {
                error!("Failed to create export directory {:?}: {}", parent_dir, e);
                anyhow::anyhow!("Failed to create export directory {:?}: {}", parent_dir, e)
            })?;
        }
    }

    fs::write(&file_path, text).with_context(|| format!("Failed to write CSV file {:?}", file_path))?;
    Ok(file_path)
}

/// Basic path sanitization to handle common user input issues
pub fn sanitize_path(path: &str) -> PathBuf {
    let mut cleaned = path.trim().to_string();

    // Remove surrounding quotes (single or double)
    if cleaned.len() >= 2
        && ((cleaned.starts_with('"') && cleaned.ends_with('"'))
            || (cleaned.starts_with('\'') && cleaned.ends_with('\'')))
    {
        cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
    }

    // Escaped spaces, as pasted from a shell
    cleaned = cleaned.replace("\\ ", " ");

    while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
        cleaned.pop();
    }

    if cleaned == "~" || cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
        if let Some(home) = dirs::home_dir() {
            return if cleaned == "~" { home } else { home.join(&cleaned[2..]) };
        }
    }

    PathBuf::from(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::animals::{AddAnimalCommand, DeleteAnimalCommand};
    use crate::domain::models::Species;
    use crate::storage::test_utils::TestHelper;

    const ANIMALS_CSV: &str = "ID;Name;Age;Species;Vaccinated;LastFed;AdmissionDate;Status\n\
        1;Rex;5;Dog;Yes;2025-06-20 08:00:00;2025-06-01 12:00:00;In shelter\n\
        2;Tom;3;Cat;No;;2025-06-02 12:00:00;In shelter\n\
        4;;1;Bird;No;;;In shelter\n";

    const ADOPTIONS_CSV: &str = "ID;AnimalID;Surname;PESEL;Phone;AdoptionDate\n\
        3;2;Kowalski;90010112345;600700800;2025-06-21 10:15:00\n\
        4;9;Nowak;90010112345;600700800;2025-06-21 10:15:00\n";

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_sanitize_path() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(sanitize_path("\"~/Documents\""), home.join("Documents"));
        assert_eq!(sanitize_path("'~/Documents'"), home.join("Documents"));
        assert_eq!(sanitize_path("~"), home);

        assert_eq!(sanitize_path("  /path/to/dir  "), PathBuf::from("/path/to/dir"));
        assert_eq!(sanitize_path("/path\\ to\\ dir"), PathBuf::from("/path to dir"));
        assert_eq!(sanitize_path("/path/to/dir/"), PathBuf::from("/path/to/dir"));
        assert_eq!(sanitize_path("/path/to/dir\\"), PathBuf::from("/path/to/dir"));
    }

    #[test]
    fn test_import_animals_commits_accepted_rows() {
        let helper = TestHelper::new().unwrap();
        let path = helper.env.write_file("animals.csv", ANIMALS_CSV).unwrap();

        let report = helper
            .transfer
            .import_animals_csv(path_str(&path), ImportMode::Replace)
            .unwrap();

        assert!(report.committed);
        assert_eq!(report.accepted_count, 2);
        assert_eq!(report.collection_size, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Row 4: "));

        let reopened = helper.reopen_store().unwrap();
        assert_eq!(reopened.animals().len(), 2);
        assert_eq!(reopened.counters().next_id(), 3);
    }

    #[test]
    fn test_import_with_bad_header_changes_nothing() {
        let helper = TestHelper::new().unwrap();
        helper
            .animals
            .add_animal(AddAnimalCommand {
                name: "Rex".to_string(),
                age: 5,
                species: Species::Dog,
                is_vaccinated: true,
            })
            .unwrap();
        let path = helper
            .env
            .write_file("animals.csv", "Id,Name\n1,Rex\n")
            .unwrap();

        let report = helper
            .transfer
            .import_animals_csv(path_str(&path), ImportMode::Replace)
            .unwrap();

        assert!(!report.committed);
        assert_eq!(report.accepted_count, 0);
        assert_eq!(report.collection_size, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Invalid CSV headers"));
        assert_eq!(helper.store.animals().len(), 1);
    }

    #[test]
    fn test_import_missing_file_is_an_error() {
        let helper = TestHelper::new().unwrap();
        let missing = helper.env.base_path.join("missing.csv");
        assert!(helper
            .transfer
            .import_animals_csv(path_str(&missing), ImportMode::Merge)
            .is_err());
    }

    #[test]
    fn test_import_adoptions_flags_animals() {
        let helper = TestHelper::new().unwrap();
        let animals = helper.env.write_file("animals.csv", ANIMALS_CSV).unwrap();
        let adoptions = helper.env.write_file("adoptions.csv", ADOPTIONS_CSV).unwrap();
        helper
            .transfer
            .import_animals_csv(path_str(&animals), ImportMode::Replace)
            .unwrap();

        let report = helper
            .transfer
            .import_adoptions_csv(path_str(&adoptions), ImportMode::Merge)
            .unwrap();

        assert_eq!(report.accepted_count, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("animal not found: 9"));

        let reopened = helper.reopen_store().unwrap();
        assert!(reopened.animal("2").unwrap().is_adopted);
        assert!(!reopened.animal("1").unwrap().is_adopted);
        assert_eq!(reopened.adoption("3").unwrap().surname, "Kowalski");
        assert_eq!(reopened.counters().next_adoption_id(), 4);

        // the imported adoption now blocks deleting its animal
        assert!(helper
            .animals
            .delete_animal(DeleteAnimalCommand {
                animal_id: "2".to_string()
            })
            .is_err());
    }

    #[test]
    fn test_export_then_reimport_round_trip() {
        let helper = TestHelper::new().unwrap();
        let source = helper.env.write_file("animals.csv", ANIMALS_CSV).unwrap();
        helper
            .transfer
            .import_animals_csv(path_str(&source), ImportMode::Replace)
            .unwrap();
        let before = helper.store.animals();

        let target = helper.env.base_path.join("exports").join("nested").join("out.csv");
        let report = helper.transfer.export_animals_csv(path_str(&target)).unwrap();
        assert_eq!(report.record_count, 2);
        assert!(target.exists());

        let reimport = helper
            .transfer
            .import_animals_csv(path_str(&target), ImportMode::Replace)
            .unwrap();
        assert!(reimport.is_clean());
        assert_eq!(helper.store.animals(), before);
        assert_eq!(helper.store.counters().next_id(), 3);
    }

    #[test]
    fn test_export_adoptions_writes_header_for_empty_collection() {
        let helper = TestHelper::new().unwrap();
        let target = helper.env.base_path.join("adoptions_out.csv");

        let report = helper.transfer.export_adoptions_csv(path_str(&target)).unwrap();
        assert_eq!(report.record_count, 0);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "ID;AnimalID;Surname;PESEL;Phone;AdoptionDate\n"
        );
    }
}
