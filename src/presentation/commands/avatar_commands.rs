use serde::Serialize;

use crate::app::AppState;
use crate::application::dto::conversion_dto::{AvatarConversionDto, BatchConversionReport};
use crate::application::errors::ApplicationError;
use crate::domain::models::avatar::AvatarReference;
use crate::infrastructure::persistence::webp_converter::AvatarWebpConverter;
use crate::presentation::commands::helpers::{log_command, map_command_error};
use crate::presentation::errors::CommandError;

/// Outcome for one reference passed to `convert_avatar_references`
#[derive(Debug, Serialize)]
pub struct ReferenceConversionDto {
    pub input: String,
    pub output: Option<String>,
    pub changed: bool,
    pub error: Option<CommandError>,
}

pub async fn convert_user_avatar(
    app_state: &AppState,
    uid: u32,
) -> Result<AvatarConversionDto, CommandError> {
    log_command(format!("convert_user_avatar {}", uid));

    app_state
        .avatar_conversion_service
        .update_avatar_extension(uid)
        .await
        .map_err(map_command_error("Failed to convert avatar"))
}

pub async fn convert_previous_avatars(
    app_state: &AppState,
) -> Result<BatchConversionReport, CommandError> {
    log_command("convert_previous_avatars");

    app_state
        .avatar_conversion_service
        .convert_previous_avatars()
        .await
        .map_err(map_command_error("Failed to convert previous avatars"))
}

/// Convert stored reference strings directly, without touching the users table.
///
/// Originals are deleted as each conversion completes.
pub async fn convert_avatar_references(
    app_state: &AppState,
    references: Vec<String>,
) -> Result<Vec<ReferenceConversionDto>, CommandError> {
    log_command(format!("convert_avatar_references ({})", references.len()));

    let context = app_state.conversion_context.clone();
    tokio::task::spawn_blocking(move || {
        let converter = AvatarWebpConverter::new();
        let entries = references.into_iter().map(|stored| {
            let reference = AvatarReference::parse(&stored);
            (stored, reference)
        });

        converter
            .batch_convert(entries, &context)
            .map(|(input, result)| match result {
                Ok(result) => ReferenceConversionDto {
                    input,
                    output: Some(result.new_reference.to_stored()),
                    changed: result.changed,
                    error: None,
                },
                Err(error) => {
                    tracing::warn!("Failed to convert {}: {}", input, error);
                    ReferenceConversionDto {
                        input,
                        output: None,
                        changed: false,
                        error: Some(ApplicationError::from(error).into()),
                    }
                }
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|error| CommandError::InternalServerError(format!("Conversion task failed: {}", error)))
}
