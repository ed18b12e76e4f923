//! Domain-level command and query types.
//! These structs are the surface the UI collaborator calls the services
//! with; every mutating operation gets its own command and result pair.

pub mod animals {
    use chrono::NaiveDateTime;

    use crate::domain::models::{parse_timestamp, Adoption, Animal, Species};

    /// Input for registering a new animal.
    #[derive(Debug, Clone)]
    pub struct AddAnimalCommand {
        pub name: String,
        pub age: u32,
        pub species: Species,
        pub is_vaccinated: bool,
    }

    #[derive(Debug, Clone)]
    pub struct AddAnimalResult {
        pub animal: Animal,
    }

    /// Input for editing an animal. Feeding and admission dates are kept.
    #[derive(Debug, Clone)]
    pub struct EditAnimalCommand {
        pub animal_id: String,
        pub name: String,
        pub age: u32,
        pub species: Species,
        pub is_vaccinated: bool,
        pub is_adopted: bool,
    }

    #[derive(Debug, Clone)]
    pub struct EditAnimalResult {
        pub animal: Animal,
        /// Adoption removed because the adopted flag was cleared
        pub removed_adoption: Option<Adoption>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteAnimalCommand {
        pub animal_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteAnimalResult {
        pub animal: Animal,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct MarkFedCommand {
        pub animal_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct MarkFedResult {
        pub animal: Animal,
    }

    /// Query filter for listing animals; unset fields match everything.
    #[derive(Debug, Clone, Default)]
    pub struct AnimalFilter {
        /// Exact id
        pub id: Option<String>,
        /// Case-insensitive substring of the name
        pub name: Option<String>,
        pub age: Option<u32>,
        pub species: Option<Species>,
        pub is_vaccinated: Option<bool>,
        pub is_adopted: Option<bool>,
        /// Inclusive lower bound on the admission date
        pub admitted_from: Option<NaiveDateTime>,
        /// Inclusive upper bound on the admission date
        pub admitted_to: Option<NaiveDateTime>,
    }

    impl AnimalFilter {
        pub fn matches(&self, animal: &Animal) -> bool {
            if self.id.as_deref().is_some_and(|id| id != animal.id) {
                return false;
            }
            if let Some(name) = self.name.as_deref() {
                if !animal.name.to_lowercase().contains(&name.to_lowercase()) {
                    return false;
                }
            }
            if self.age.is_some_and(|age| age != animal.age) {
                return false;
            }
            if self.species.is_some_and(|species| species != animal.species) {
                return false;
            }
            if self.is_vaccinated.is_some_and(|v| v != animal.is_vaccinated) {
                return false;
            }
            if self.is_adopted.is_some_and(|a| a != animal.is_adopted) {
                return false;
            }
            if self.admitted_from.is_some() || self.admitted_to.is_some() {
                // animals without a readable admission date never match a range
                let Some(admitted) = animal.admission_date.as_deref().and_then(parse_timestamp) else {
                    return false;
                };
                if self.admitted_from.is_some_and(|from| admitted < from) {
                    return false;
                }
                if self.admitted_to.is_some_and(|to| admitted > to) {
                    return false;
                }
            }
            true
        }
    }
}

pub mod adoptions {
    use chrono::NaiveDateTime;

    use crate::domain::models::{parse_timestamp, Adoption, Animal};

    /// Input for adopting an animal that is still in the shelter.
    #[derive(Debug, Clone)]
    pub struct AdoptCommand {
        pub animal_id: String,
        pub surname: String,
        pub pesel: String,
        pub phone_number: String,
    }

    #[derive(Debug, Clone)]
    pub struct AdoptResult {
        pub adoption: Adoption,
        pub animal: Animal,
    }

    /// Input for editing adopter details. Animal and date are kept.
    #[derive(Debug, Clone)]
    pub struct EditAdoptionCommand {
        pub adoption_id: String,
        pub surname: String,
        pub pesel: String,
        pub phone_number: String,
    }

    #[derive(Debug, Clone)]
    pub struct EditAdoptionResult {
        pub adoption: Adoption,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteAdoptionCommand {
        pub adoption_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteAdoptionResult {
        pub adoption: Adoption,
        /// The animal whose adopted flag was cleared, if it still exists
        pub released_animal: Option<Animal>,
    }

    /// Query filter for listing adoptions; unset fields match everything.
    #[derive(Debug, Clone, Default)]
    pub struct AdoptionFilter {
        pub id: Option<String>,
        pub animal_id: Option<String>,
        /// Case-insensitive substring of the surname
        pub surname: Option<String>,
        /// Substring of the PESEL
        pub pesel: Option<String>,
        /// Substring of the phone number
        pub phone_number: Option<String>,
        pub adopted_from: Option<NaiveDateTime>,
        pub adopted_to: Option<NaiveDateTime>,
    }

    impl AdoptionFilter {
        pub fn matches(&self, adoption: &Adoption) -> bool {
            if self.id.as_deref().is_some_and(|id| id != adoption.id) {
                return false;
            }
            if self.animal_id.as_deref().is_some_and(|id| id != adoption.animal_id) {
                return false;
            }
            if let Some(surname) = self.surname.as_deref() {
                if !adoption.surname.to_lowercase().contains(&surname.to_lowercase()) {
                    return false;
                }
            }
            if self.pesel.as_deref().is_some_and(|p| !adoption.pesel.contains(p)) {
                return false;
            }
            if self.phone_number.as_deref().is_some_and(|p| !adoption.phone_number.contains(p)) {
                return false;
            }
            if self.adopted_from.is_some() || self.adopted_to.is_some() {
                let Some(adopted) = parse_timestamp(&adoption.adoption_date) else {
                    return false;
                };
                if self.adopted_from.is_some_and(|from| adopted < from) {
                    return false;
                }
                if self.adopted_to.is_some_and(|to| adopted > to) {
                    return false;
                }
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::adoptions::AdoptionFilter;
    use super::animals::AnimalFilter;
    use crate::domain::models::{parse_timestamp, Species};
    use crate::storage::test_utils::{sample_adoption, sample_animal};

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(AnimalFilter::default().matches(&sample_animal("1", "Rex", Species::Dog)));
        assert!(AdoptionFilter::default().matches(&sample_adoption("1", "1")));
    }

    #[test]
    fn test_animal_filter_fields() {
        let rex = sample_animal("1", "Rex", Species::Dog);

        let by_name = AnimalFilter {
            name: Some("rE".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&rex));

        let by_species = AnimalFilter {
            species: Some(Species::Cat),
            ..Default::default()
        };
        assert!(!by_species.matches(&rex));

        let by_id = AnimalFilter {
            id: Some("10".to_string()),
            ..Default::default()
        };
        assert!(!by_id.matches(&rex));
    }

    #[test]
    fn test_animal_admission_range_is_inclusive() {
        let rex = sample_animal("1", "Rex", Species::Dog);
        let admitted = parse_timestamp("2025-06-20 02:00:00");

        let exact = AnimalFilter {
            admitted_from: admitted,
            admitted_to: admitted,
            ..Default::default()
        };
        assert!(exact.matches(&rex));

        let mut undated = rex.clone();
        undated.admission_date = None;
        assert!(!exact.matches(&undated));

        let later = AnimalFilter {
            admitted_from: parse_timestamp("2025-06-21 00:00:00"),
            ..Default::default()
        };
        assert!(!later.matches(&rex));
    }

    #[test]
    fn test_adoption_filter_substrings() {
        let adoption = sample_adoption("1", "4");

        let filter = AdoptionFilter {
            surname: Some("kowal".to_string()),
            pesel: Some("0101".to_string()),
            phone_number: Some("700".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&adoption));

        let other_animal = AdoptionFilter {
            animal_id: Some("5".to_string()),
            ..Default::default()
        };
        assert!(!other_animal.matches(&adoption));

        let before = AdoptionFilter {
            adopted_to: parse_timestamp("2025-06-21 10:14:59"),
            ..Default::default()
        };
        assert!(!before.matches(&adoption));
    }
}
