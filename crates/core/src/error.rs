use crate::registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<RegistryError> for CoreError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) | RegistryError::NotActive(id) => CoreError::NotFound {
                entity: "Translation",
                id: id.to_string(),
            },
            RegistryError::DuplicateId(id) => {
                CoreError::Conflict(format!("Translation {id} already exists"))
            }
        }
    }
}
