use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::animals::{
    AddAnimalCommand, AddAnimalResult, AnimalFilter, DeleteAnimalCommand, DeleteAnimalResult, EditAnimalCommand,
    EditAnimalResult, MarkFedCommand, MarkFedResult,
};
use crate::domain::errors::ShelterError;
use crate::domain::models::{id_sort_key, now_timestamp, Animal};
use crate::storage::RecordStore;

/// Service for registering and maintaining shelter animals
#[derive(Clone)]
pub struct AnimalService {
    store: Arc<RecordStore>,
}

impl AnimalService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Register a new animal, admitted now
    pub fn add_animal(&self, command: AddAnimalCommand) -> Result<AddAnimalResult> {
        info!("Adding animal: name={}, species={}", command.name, command.species);

        let name = command.name.trim().to_string();
        let mut animals = self.store.animals();
        if animals.values().any(|a| a.name.to_lowercase() == name.to_lowercase()) {
            warn!("Animal name already taken: {}", name);
            return Err(ShelterError::DuplicateName(name).into());
        }

        let mut counters = self.store.counters();
        let animal = Animal {
            id: counters.allocate_animal_id()?,
            name,
            age: command.age,
            species: command.species,
            is_adopted: false,
            is_vaccinated: command.is_vaccinated,
            last_fed: None,
            admission_date: Some(now_timestamp()),
        };
        animal.validate()?;

        animals.insert(animal.id.clone(), animal.clone());
        self.store.save_animals(animals, counters)?;

        info!("Added animal: {} with ID: {}", animal.name, animal.id);
        Ok(AddAnimalResult { animal })
    }

    /// Replace the editable fields of an animal.
    ///
    /// Clearing the adopted flag of an adopted animal also removes the first
    /// adoption that references it.
    pub fn edit_animal(&self, command: EditAnimalCommand) -> Result<EditAnimalResult> {
        info!("Editing animal: {}", command.animal_id);

        let mut animals = self.store.animals();
        let current = animals
            .get(&command.animal_id)
            .cloned()
            .ok_or_else(|| ShelterError::AnimalNotFound(command.animal_id.clone()))?;

        let animal = Animal {
            name: command.name.trim().to_string(),
            age: command.age,
            species: command.species,
            is_vaccinated: command.is_vaccinated,
            is_adopted: command.is_adopted,
            ..current.clone()
        };
        animal.validate()?;

        let mut removed_adoption = None;
        if current.is_adopted && !animal.is_adopted {
            let mut adoptions = self.store.adoptions();
            let adoption_id = adoptions
                .values()
                .find(|adoption| adoption.animal_id == animal.id)
                .map(|adoption| adoption.id.clone());
            if let Some(adoption_id) = adoption_id {
                removed_adoption = adoptions.remove(&adoption_id);
                self.store.save_adoptions(adoptions)?;
                info!("Removed adoption {} of animal {}", adoption_id, animal.id);
            }
        }

        animals.insert(animal.id.clone(), animal.clone());
        self.store.save_animals(animals, self.store.counters())?;

        info!("Edited animal: {} with ID: {}", animal.name, animal.id);
        Ok(EditAnimalResult {
            animal,
            removed_adoption,
        })
    }

    /// Delete an animal no adoption refers to
    pub fn delete_animal(&self, command: DeleteAnimalCommand) -> Result<DeleteAnimalResult> {
        info!("Deleting animal: {}", command.animal_id);

        let mut animals = self.store.animals();
        if !animals.contains_key(&command.animal_id) {
            warn!("Animal not found: {}", command.animal_id);
            return Err(ShelterError::AnimalNotFound(command.animal_id).into());
        }

        if let Some(adoption) = self
            .store
            .adoptions()
            .values()
            .find(|adoption| adoption.animal_id == command.animal_id)
        {
            warn!(
                "Refusing to delete animal {} referenced by adoption {}",
                command.animal_id, adoption.id
            );
            return Err(ShelterError::AnimalHasAdoption {
                animal_id: command.animal_id,
                adoption_id: adoption.id.clone(),
            }
            .into());
        }

        let Some(animal) = animals.remove(&command.animal_id) else {
            return Err(ShelterError::AnimalNotFound(command.animal_id).into());
        };
        self.store.save_animals(animals, self.store.counters())?;

        info!("Deleted animal: {} with ID: {}", animal.name, animal.id);
        Ok(DeleteAnimalResult {
            success_message: format!("Animal '{}' deleted successfully", animal.name),
            animal,
        })
    }

    /// Record a feeding at the current local time
    pub fn mark_fed(&self, command: MarkFedCommand) -> Result<MarkFedResult> {
        info!("Marking animal as fed: {}", command.animal_id);

        let mut animals = self.store.animals();
        let animal = animals
            .get_mut(&command.animal_id)
            .ok_or_else(|| ShelterError::AnimalNotFound(command.animal_id.clone()))?;
        animal.last_fed = Some(now_timestamp());
        let animal = animal.clone();

        self.store.save_animals(animals, self.store.counters())?;

        info!("Fed animal {} at {}", animal.id, animal.last_fed.as_deref().unwrap_or_default());
        Ok(MarkFedResult { animal })
    }

    pub fn get_animal(&self, animal_id: &str) -> Option<Animal> {
        self.store.animal(animal_id)
    }

    /// Animals matching `filter`, ordered by numeric id
    pub fn list_animals(&self, filter: &AnimalFilter) -> Vec<Animal> {
        let mut animals: Vec<Animal> = self
            .store
            .animals()
            .into_values()
            .filter(|animal| filter.matches(animal))
            .collect();
        animals.sort_by(|a, b| id_sort_key(&a.id).cmp(&id_sort_key(&b.id)));
        animals
    }
}
