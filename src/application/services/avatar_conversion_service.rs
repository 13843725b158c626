use std::sync::Arc;

use crate::application::dto::conversion_dto::{
    AvatarConversionDto, BatchConversionReport, ConversionFailureDto,
};
use crate::application::errors::ApplicationError;
use crate::domain::models::avatar::{AvatarReference, ConversionResult};
use crate::domain::repositories::user_repository::UserRepository;
use crate::infrastructure::logging::logger;
use crate::infrastructure::persistence::file_system::delete_file;
use crate::infrastructure::persistence::webp_converter::{AvatarWebpConverter, ConversionContext};

/// Converts stored avatars to WebP and keeps the users table in step
pub struct AvatarConversionService {
    user_repository: Arc<dyn UserRepository>,
    converter: AvatarWebpConverter,
    context: ConversionContext,
}

impl AvatarConversionService {
    pub fn new(user_repository: Arc<dyn UserRepository>, context: ConversionContext) -> Self {
        Self {
            user_repository,
            converter: AvatarWebpConverter::new(),
            context,
        }
    }

    /// React to a finished avatar upload.
    ///
    /// Nothing happens unless at least one non-empty file name was uploaded.
    pub async fn on_avatar_upload(
        &self,
        session_uid: u32,
        uploaded_file_names: &[String],
    ) -> Result<Option<AvatarConversionDto>, ApplicationError> {
        if !uploaded_file_names.iter().any(|name| !name.is_empty()) {
            logger::debug("Avatar upload finished without files, nothing to convert");
            return Ok(None);
        }

        self.update_avatar_extension(session_uid).await.map(Some)
    }

    /// Convert one user's avatar and persist the new reference.
    ///
    /// The WebP file is written first, the reference is persisted next and the
    /// original is deleted last. A failed deletion is reported, not raised.
    pub async fn update_avatar_extension(
        &self,
        uid: u32,
    ) -> Result<AvatarConversionDto, ApplicationError> {
        let user = self.user_repository.find_by_id(uid).await?;
        if !user.has_avatar() {
            return Ok(unchanged(uid, user.avatar));
        }

        let result = self.write_webp(user.avatar_reference()).await?;
        if !result.changed {
            return Ok(unchanged(uid, user.avatar));
        }

        let stored = result.new_reference.to_stored();
        if let Err(error) = self.user_repository.update_avatar(uid, &stored).await {
            logger::error(&format!(
                "Failed to store converted avatar of user {}: {}",
                uid, error
            ));
            let orphan = self.context.resolve(&result.new_reference.path);
            if let Err(cleanup_error) = delete_file(&orphan).await {
                logger::warn(&format!(
                    "Failed to remove unreferenced avatar {:?}: {}",
                    orphan, cleanup_error
                ));
            }
            return Err(error.into());
        }

        let original_removed = self.remove_original(result).await;

        tracing::info!("Avatar of user {} converted to {}", uid, stored);
        Ok(AvatarConversionDto {
            uid,
            changed: true,
            avatar: stored,
            original_removed,
        })
    }

    /// Convert every stored avatar that is not WebP yet.
    ///
    /// Entries are handled one at a time in uid order; a failing entry is
    /// recorded and the pass moves on.
    pub async fn convert_previous_avatars(&self) -> Result<BatchConversionReport, ApplicationError> {
        let users = self.user_repository.find_with_avatar().await?;
        let mut report = BatchConversionReport {
            total: users.len(),
            ..BatchConversionReport::default()
        };

        for user in users {
            if user.avatar_reference().is_webp() {
                report.skipped += 1;
                continue;
            }

            match self.update_avatar_extension(user.uid).await {
                Ok(outcome) if outcome.changed => {
                    report.converted += 1;
                    if !outcome.original_removed {
                        report.leftover_originals += 1;
                    }
                }
                Ok(_) => report.skipped += 1,
                Err(error) => {
                    logger::warn(&format!(
                        "Failed to convert avatar of user {}: {}",
                        user.uid, error
                    ));
                    report.failures.push(ConversionFailureDto {
                        uid: user.uid,
                        message: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Avatar conversion pass finished: {} total, {} converted, {} skipped, {} failed",
            report.total,
            report.converted,
            report.skipped,
            report.failed()
        );
        Ok(report)
    }

    async fn write_webp(
        &self,
        reference: AvatarReference,
    ) -> Result<ConversionResult, ApplicationError> {
        let converter = self.converter;
        let context = self.context.clone();

        let result = tokio::task::spawn_blocking(move || converter.write_webp(&reference, &context))
            .await
            .map_err(|error| {
                ApplicationError::InternalError(format!("Conversion task failed: {}", error))
            })??;

        Ok(result)
    }

    async fn remove_original(&self, result: ConversionResult) -> bool {
        let converter = self.converter;

        match tokio::task::spawn_blocking(move || converter.remove_original(&result)).await {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                logger::warn(&format!("Converted avatar left its original behind: {}", error));
                false
            }
            Err(error) => {
                logger::warn(&format!("Original avatar removal task failed: {}", error));
                false
            }
        }
    }
}

fn unchanged(uid: u32, avatar: String) -> AvatarConversionDto {
    AvatarConversionDto {
        uid,
        changed: false,
        avatar,
        original_removed: false,
    }
}
