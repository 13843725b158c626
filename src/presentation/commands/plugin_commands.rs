use crate::app::AppState;
use crate::domain::models::plugin::PluginInfo;
use crate::presentation::admin::html;
use crate::presentation::commands::helpers::{log_command, map_command_error};
use crate::presentation::errors::CommandError;

/// Plugin metadata with the description assembled for the current state
pub async fn plugin_info(app_state: &AppState) -> Result<PluginInfo, CommandError> {
    log_command("plugin_info");

    let post_code = &app_state.settings.session.post_code;
    let mut description = html::description();

    let installed = app_state
        .plugin_service
        .is_installed()
        .await
        .map_err(map_command_error("Failed to read plugin state"))?;
    if installed {
        description.push_str(&html::apply_conversion_block(post_code));
    }

    let donation = app_state
        .plugin_service
        .donation_status()
        .await
        .map_err(map_command_error("Failed to read donation state"))?;
    if donation {
        description.push_str(&html::donation_block(post_code));
    }

    Ok(PluginInfo::with_description(description))
}

pub async fn install_plugin(app_state: &AppState) -> Result<(), CommandError> {
    log_command("install_plugin");

    app_state
        .plugin_service
        .install()
        .await
        .map_err(map_command_error("Failed to install plugin"))
}

pub async fn uninstall_plugin(app_state: &AppState) -> Result<(), CommandError> {
    log_command("uninstall_plugin");

    app_state
        .plugin_service
        .uninstall()
        .await
        .map_err(map_command_error("Failed to uninstall plugin"))
}

pub async fn is_plugin_installed(app_state: &AppState) -> Result<bool, CommandError> {
    app_state
        .plugin_service
        .is_installed()
        .await
        .map_err(map_command_error("Failed to read plugin state"))
}

pub async fn activate_plugin(app_state: &AppState) -> Result<(), CommandError> {
    log_command("activate_plugin");

    app_state
        .plugin_service
        .activate()
        .await
        .map_err(map_command_error("Failed to activate plugin"))
}

pub async fn deactivate_plugin(app_state: &AppState) -> Result<(), CommandError> {
    log_command("deactivate_plugin");

    app_state
        .plugin_service
        .deactivate()
        .await
        .map_err(map_command_error("Failed to deactivate plugin"))
}
