use crate::domain::errors::DomainError;
use crate::infrastructure::logging::logger;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::fs::{self as tokio_fs, create_dir_all, read_to_string};

/// Layout of the data directory standing in for the forum database
pub struct DataDirectory {
    root: PathBuf,
    users_file: PathBuf,
    cache_file: PathBuf,
}

impl DataDirectory {
    /// Create a new DataDirectory instance
    pub fn new(root: PathBuf) -> Self {
        let users_file = root.join("users.json");
        let cache_file = root.join("datacache.json");

        Self {
            root,
            users_file,
            cache_file,
        }
    }

    /// Initialize the data directory structure
    pub async fn initialize(&self) -> Result<(), DomainError> {
        tracing::info!("Initializing data directory at: {:?}", self.root);

        if !self.root.exists() {
            tracing::info!("Creating directory: {:?}", self.root);
            create_dir_all(&self.root).await.map_err(|e| {
                tracing::error!("Failed to create directory {:?}: {}", self.root, e);
                DomainError::InternalError(format!("Failed to create directory: {}", e))
            })?;
        }

        Ok(())
    }

    /// JSON file holding the users table
    pub fn users_file(&self) -> &Path {
        &self.users_file
    }

    /// JSON file holding the plugin data cache
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }
}

/// Read a JSON file and deserialize it
pub async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    logger::debug(&format!("Reading JSON file: {:?}", path));

    let contents = read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DomainError::NotFound(format!("File not found: {}", path.display()))
        } else {
            logger::error(&format!("Failed to read file {:?}: {}", path, e));
            DomainError::InternalError(format!("Failed to read file: {}", e))
        }
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        logger::error(&format!("Failed to parse JSON from file {:?}: {}", path, e));
        DomainError::InvalidData(format!("Invalid JSON: {}", e))
    })
}

/// Read a JSON file, falling back to `T::default()` when it does not exist yet
pub async fn read_json_file_or_default<T>(path: &Path) -> Result<T, DomainError>
where
    T: DeserializeOwned + Default,
{
    match read_json_file(path).await {
        Ok(value) => Ok(value),
        Err(DomainError::NotFound(_)) => Ok(T::default()),
        Err(error) => Err(error),
    }
}

/// Write a JSON file through a temporary sibling and a rename
pub async fn write_json_file<T: Serialize>(path: &Path, data: &T) -> Result<(), DomainError> {
    logger::debug(&format!("Writing JSON file: {:?}", path));

    if let Some(parent) = path.parent() {
        create_dir_all(parent).await.map_err(|e| {
            logger::error(&format!(
                "Failed to create parent directory for {:?}: {}",
                path, e
            ));
            DomainError::InternalError(format!("Failed to create directory: {}", e))
        })?;
    }

    let json = serde_json::to_string_pretty(data).map_err(|e| {
        logger::error(&format!(
            "Failed to serialize to JSON for file {:?}: {}",
            path, e
        ));
        DomainError::InvalidData(format!("Failed to serialize to JSON: {}", e))
    })?;

    let temp_path = path.with_extension("json.tmp");
    tokio_fs::write(&temp_path, json).await.map_err(|e| {
        logger::error(&format!("Failed to write to file {:?}: {}", temp_path, e));
        DomainError::InternalError(format!("Failed to write to file: {}", e))
    })?;

    tokio_fs::rename(&temp_path, path).await.map_err(|e| {
        logger::error(&format!("Failed to finalize file {:?}: {}", path, e));
        DomainError::InternalError(format!("Failed to finalize file: {}", e))
    })
}

/// Delete a file; a file that is already gone is not an error
pub async fn delete_file(path: &Path) -> Result<(), DomainError> {
    logger::debug(&format!("Deleting file: {:?}", path));

    match tokio_fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => {
            logger::error(&format!("Failed to delete file {:?}: {}", path, error));
            Err(DomainError::InternalError(format!(
                "Failed to delete file: {}",
                error
            )))
        }
    }
}
