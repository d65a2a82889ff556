use crate::directory_store::ValidationError;
use thiserror::Error;

/// Failure kinds surfaced by the query and mutation services.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
}

impl DirectoryError {
    /// Convert a store error, recovering validation failures raised inside a
    /// store transaction.
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<ValidationError>() {
            Ok(validation) => DirectoryError::Validation(validation),
            Err(err) => DirectoryError::Storage(err),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DirectoryError::NotFound { entity, id }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
