/// Rejections of interactive operations that callers may want to tell apart
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShelterError {
    #[error("animal not found: {0}")]
    AnimalNotFound(String),
    #[error("adoption not found: {0}")]
    AdoptionNotFound(String),
    #[error("animal {animal_id} is referenced by adoption {adoption_id}")]
    AnimalHasAdoption { animal_id: String, adoption_id: String },
    #[error("animal {0} is already adopted")]
    AlreadyAdopted(String),
    #[error("an animal named {0} already exists")]
    DuplicateName(String),
}
