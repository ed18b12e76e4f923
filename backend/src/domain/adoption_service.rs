use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::adoptions::{
    AdoptCommand, AdoptResult, AdoptionFilter, DeleteAdoptionCommand, DeleteAdoptionResult, EditAdoptionCommand,
    EditAdoptionResult,
};
use crate::domain::errors::ShelterError;
use crate::domain::models::adoption::validate_adopter;
use crate::domain::models::{id_sort_key, now_timestamp, Adoption};
use crate::storage::RecordStore;

/// Service for adoptions; keeps the animals' adopted flags in step
#[derive(Clone)]
pub struct AdoptionService {
    store: Arc<RecordStore>,
}

impl AdoptionService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Hand an animal that is still in the shelter over to an adopter
    pub fn adopt(&self, command: AdoptCommand) -> Result<AdoptResult> {
        info!("Adopting animal: {} by {}", command.animal_id, command.surname);

        let mut animals = self.store.animals();
        let animal = animals
            .get_mut(&command.animal_id)
            .ok_or_else(|| ShelterError::AnimalNotFound(command.animal_id.clone()))?;
        if animal.is_adopted {
            warn!("Animal {} is already adopted", command.animal_id);
            return Err(ShelterError::AlreadyAdopted(command.animal_id).into());
        }

        let surname = command.surname.trim();
        let pesel = command.pesel.trim();
        let phone_number = command.phone_number.trim();
        if let Some(error) = validate_adopter(surname, pesel, phone_number).into_iter().next() {
            return Err(error.into());
        }

        let mut counters = self.store.counters();
        let adoption = Adoption {
            id: counters.allocate_adoption_id()?,
            animal_id: animal.id.clone(),
            surname: surname.to_string(),
            pesel: pesel.to_string(),
            phone_number: phone_number.to_string(),
            adoption_date: now_timestamp(),
        };
        animal.is_adopted = true;
        let animal = animal.clone();

        let mut adoptions = self.store.adoptions();
        adoptions.insert(adoption.id.clone(), adoption.clone());
        self.store.save_adoptions(adoptions)?;
        self.store.save_animals(animals, counters)?;

        info!("Animal {} adopted under adoption {}", animal.id, adoption.id);
        Ok(AdoptResult { adoption, animal })
    }

    /// Replace the adopter details of an adoption
    pub fn edit_adoption(&self, command: EditAdoptionCommand) -> Result<EditAdoptionResult> {
        info!("Editing adoption: {}", command.adoption_id);

        let mut adoptions = self.store.adoptions();
        let adoption = adoptions
            .get_mut(&command.adoption_id)
            .ok_or_else(|| ShelterError::AdoptionNotFound(command.adoption_id.clone()))?;

        let surname = command.surname.trim();
        let pesel = command.pesel.trim();
        let phone_number = command.phone_number.trim();
        if let Some(error) = validate_adopter(surname, pesel, phone_number).into_iter().next() {
            return Err(error.into());
        }

        adoption.surname = surname.to_string();
        adoption.pesel = pesel.to_string();
        adoption.phone_number = phone_number.to_string();
        let adoption = adoption.clone();

        self.store.save_adoptions(adoptions)?;

        info!("Edited adoption {}", adoption.id);
        Ok(EditAdoptionResult { adoption })
    }

    /// Remove an adoption and return its animal to the shelter
    pub fn delete_adoption(&self, command: DeleteAdoptionCommand) -> Result<DeleteAdoptionResult> {
        info!("Deleting adoption: {}", command.adoption_id);

        let mut adoptions = self.store.adoptions();
        let adoption = adoptions
            .remove(&command.adoption_id)
            .ok_or_else(|| ShelterError::AdoptionNotFound(command.adoption_id.clone()))?;
        self.store.save_adoptions(adoptions)?;

        let mut animals = self.store.animals();
        let released_animal = animals.get_mut(&adoption.animal_id).map(|animal| {
            animal.is_adopted = false;
            animal.clone()
        });
        if released_animal.is_some() {
            self.store.save_animals(animals, self.store.counters())?;
        } else {
            warn!(
                "Adoption {} referenced missing animal {}",
                adoption.id, adoption.animal_id
            );
        }

        info!("Deleted adoption {}", adoption.id);
        Ok(DeleteAdoptionResult {
            adoption,
            released_animal,
        })
    }

    pub fn get_adoption(&self, adoption_id: &str) -> Option<Adoption> {
        self.store.adoption(adoption_id)
    }

    /// Adoptions matching `filter`, ordered by numeric id
    pub fn list_adoptions(&self, filter: &AdoptionFilter) -> Vec<Adoption> {
        let mut adoptions: Vec<Adoption> = self
            .store
            .adoptions()
            .into_values()
            .filter(|adoption| filter.matches(adoption))
            .collect();
        adoptions.sort_by(|a, b| id_sort_key(&a.id).cmp(&id_sort_key(&b.id)));
        adoptions
    }
}
