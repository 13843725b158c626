use serde::{Deserialize, Serialize};

/// Result of converting one user's avatar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarConversionDto {
    pub uid: u32,
    pub changed: bool,
    /// Stored reference after the call
    pub avatar: String,
    /// `false` when the new file was written but the old one could not be deleted
    pub original_removed: bool,
}

/// A batch entry that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailureDto {
    pub uid: u32,
    pub message: String,
}

/// Summary of one pass over all stored avatars
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConversionReport {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failures: Vec<ConversionFailureDto>,
    /// Converted entries whose original file is still on disk
    pub leftover_originals: usize,
}

impl BatchConversionReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
