use thiserror::Error;

use crate::domain::errors::{ConversionError, DomainError};

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::NotFound(msg) => ApplicationError::NotFound(msg),
            DomainError::InvalidData(msg) => ApplicationError::ValidationError(msg),
            DomainError::InternalError(msg) => ApplicationError::InternalError(msg),
        }
    }
}

impl From<ConversionError> for ApplicationError {
    fn from(error: ConversionError) -> Self {
        DomainError::from(error).into()
    }
}
