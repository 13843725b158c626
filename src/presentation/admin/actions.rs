use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::application::dto::conversion_dto::BatchConversionReport;
use crate::presentation::commands::helpers::{log_command, map_command_error};
use crate::presentation::errors::CommandError;

pub const PLUGINS_PAGE: &str = "index.php?module=config-plugins";
pub const ACTION_CONVERT_PREVIOUS: &str = "edit-previous-avatar-extensions";
pub const ACTION_CLOSE_DONATION: &str = "deactivate-donation";

pub const CONVERTED_MESSAGE: &str = "User profile photos have been successfully converted to .webp!";
pub const DONATION_CLOSED_MESSAGE: &str = "The donation message has been successfully closed.";

/// Query parameters of an admin plugin-page request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminRequest {
    pub my_post_key: Option<String>,
    /// Value of the `webpp` parameter
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub message: String,
    pub kind: FlashKind,
}

/// Flash message plus redirect target after an admin action ran
#[derive(Debug, Clone, Serialize)]
pub struct AdminRedirect {
    pub flash: FlashMessage,
    pub location: String,
    pub report: Option<BatchConversionReport>,
}

/// `my_post_key` must echo the session's non-empty post code.
pub fn post_key_matches(post_code: &str, my_post_key: Option<&str>) -> bool {
    !post_code.is_empty() && my_post_key == Some(post_code)
}

/// Run the admin action named in `request`, if any.
///
/// Requests without a valid post key or with an unknown action run nothing
/// and return `None`, leaving the plugin page to render normally.
pub async fn handle_admin_request(
    app_state: &AppState,
    request: &AdminRequest,
) -> Result<Option<AdminRedirect>, CommandError> {
    let Some(action) = request.action.as_deref() else {
        return Ok(None);
    };

    if !post_key_matches(
        &app_state.settings.session.post_code,
        request.my_post_key.as_deref(),
    ) {
        tracing::warn!("Ignoring admin action '{}' with a mismatched post key", action);
        return Ok(None);
    }

    log_command(format!("admin action {}", action));

    match action {
        ACTION_CONVERT_PREVIOUS => {
            let report = app_state
                .avatar_conversion_service
                .convert_previous_avatars()
                .await
                .map_err(map_command_error("Failed to convert previous avatars"))?;

            Ok(Some(AdminRedirect {
                flash: conversion_flash(&report),
                location: PLUGINS_PAGE.to_string(),
                report: Some(report),
            }))
        }
        ACTION_CLOSE_DONATION => {
            app_state
                .plugin_service
                .deactivate_donation()
                .await
                .map_err(map_command_error("Failed to close donation message"))?;

            Ok(Some(AdminRedirect {
                flash: FlashMessage {
                    message: DONATION_CLOSED_MESSAGE.to_string(),
                    kind: FlashKind::Success,
                },
                location: PLUGINS_PAGE.to_string(),
                report: None,
            }))
        }
        other => {
            tracing::debug!("Unknown admin action '{}'", other);
            Ok(None)
        }
    }
}

fn conversion_flash(report: &BatchConversionReport) -> FlashMessage {
    if report.failed() == 0 {
        return FlashMessage {
            message: CONVERTED_MESSAGE.to_string(),
            kind: FlashKind::Success,
        };
    }

    FlashMessage {
        message: format!(
            "{} {} of {} profile photos could not be converted.",
            CONVERTED_MESSAGE,
            report.failed(),
            report.total
        ),
        kind: FlashKind::Error,
    }
}
