use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Failure of a single avatar conversion.
///
/// A missing source file or an avatar that is already WebP is not an error;
/// both are reported as an unchanged `ConversionResult`.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to decode image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode WebP image for '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ConversionError> for DomainError {
    fn from(error: ConversionError) -> Self {
        match error {
            ConversionError::Decode { .. } => DomainError::InvalidData(error.to_string()),
            ConversionError::Encode { .. } | ConversionError::Io { .. } => {
                DomainError::InternalError(error.to_string())
            }
        }
    }
}
