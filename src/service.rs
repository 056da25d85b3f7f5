// Persistence contract consumed by the forms

use thiserror::Error;

/// A failed store operation, carrying a message fit for an alert
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PersistenceError {
    message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        PersistenceError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::new(err.to_string())
    }
}

/// Create/read/update/delete for one entity type.
///
/// `save_or_update` inserts when the entity has no id and writes the new id
/// back into it; otherwise it updates the existing row.
pub trait PersistenceService<E> {
    fn save_or_update(&self, entity: &mut E) -> Result<(), PersistenceError>;

    fn find_all(&self) -> Result<Vec<E>, PersistenceError>;

    fn find_by_id(&self, id: i64) -> Result<Option<E>, PersistenceError>;

    fn delete_by_id(&self, id: i64) -> Result<(), PersistenceError>;
}
