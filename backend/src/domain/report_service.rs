use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::models::Species;
use crate::storage::RecordStore;

/// Headline numbers about the shelter population
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShelterReport {
    /// Animals still in the shelter, per species; species with none are absent
    pub in_shelter_by_species: BTreeMap<Species, usize>,
    /// Vaccinated animals still in the shelter
    pub vaccinated: usize,
    /// Unvaccinated animals still in the shelter
    pub not_vaccinated: usize,
    pub total: usize,
    pub adopted: usize,
}

impl ShelterReport {
    pub fn in_shelter(&self) -> usize {
        self.total - self.adopted
    }
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<RecordStore>,
}

impl ReportService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn shelter_report(&self) -> ShelterReport {
        let mut report = ShelterReport::default();

        for animal in self.store.animals().values() {
            report.total += 1;
            if animal.is_adopted {
                report.adopted += 1;
                continue;
            }
            *report.in_shelter_by_species.entry(animal.species).or_insert(0) += 1;
            if animal.is_vaccinated {
                report.vaccinated += 1;
            } else {
                report.not_vaccinated += 1;
            }
        }

        debug!(
            "Shelter report: {} animals, {} adopted, {} vaccinated in shelter",
            report.total, report.adopted, report.vaccinated
        );
        report
    }
}
