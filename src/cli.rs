use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::app::AppState;
use crate::presentation::admin::actions::{AdminRequest, handle_admin_request};
use crate::presentation::commands::avatar_commands::{
    convert_avatar_references, convert_previous_avatars, convert_user_avatar,
};
use crate::presentation::commands::hook_commands::{
    AvatarUploadEvent, ExecutionContext, fire_avatar_upload,
};
use crate::presentation::commands::plugin_commands::{
    activate_plugin, deactivate_plugin, install_plugin, is_plugin_installed, plugin_info,
    uninstall_plugin,
};
use crate::presentation::errors::CommandError;

#[derive(Debug, Parser)]
#[command(name = "webpp", version, about = "Convert forum avatars to WebP")]
pub struct Cli {
    /// Settings file (JSON); defaults apply when it does not exist
    #[arg(short, long, default_value = "webpp.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show plugin metadata and the admin description
    Info,
    Install,
    Uninstall,
    Activate,
    Deactivate,
    /// Convert one user's avatar
    Convert { uid: u32 },
    /// Convert every stored avatar that is not WebP yet
    ConvertAll,
    /// Convert stored reference strings without touching the users table
    ConvertRefs {
        #[arg(required = true)]
        references: Vec<String>,
    },
    /// Replay the avatar-upload hook
    Upload {
        #[arg(long)]
        uid: Option<u32>,
        /// Part of the forum the hook fires in
        #[arg(long, value_enum, default_value_t = ExecutionContext::Frontend)]
        context: ExecutionContext,
        file_names: Vec<String>,
    },
    /// Replay an admin plugin-page request
    Admin {
        #[arg(long)]
        post_key: Option<String>,
        #[arg(long)]
        action: Option<String>,
    },
}

pub async fn dispatch(app_state: &AppState, command: Command) -> Result<(), CommandError> {
    match command {
        Command::Info => print_json(&plugin_info(app_state).await?),
        Command::Install => {
            if is_plugin_installed(app_state).await? {
                tracing::info!("Plugin is already installed");
                return Ok(());
            }
            install_plugin(app_state).await
        }
        Command::Uninstall => uninstall_plugin(app_state).await,
        Command::Activate => activate_plugin(app_state).await,
        Command::Deactivate => deactivate_plugin(app_state).await,
        Command::Convert { uid } => print_json(&convert_user_avatar(app_state, uid).await?),
        Command::ConvertAll => print_json(&convert_previous_avatars(app_state).await?),
        Command::ConvertRefs { references } => {
            print_json(&convert_avatar_references(app_state, references).await?)
        }
        Command::Upload {
            uid,
            context,
            file_names,
        } => {
            let event = AvatarUploadEvent { uid, file_names };
            print_json(&fire_avatar_upload(app_state, context, event).await?)
        }
        Command::Admin { post_key, action } => {
            let request = AdminRequest {
                my_post_key: post_key,
                action,
            };
            match handle_admin_request(app_state, &request).await? {
                Some(redirect) => print_json(&redirect),
                None => print_json(&plugin_info(app_state).await?),
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| CommandError::InternalServerError(error.to_string()))?;
    println!("{}", json);
    Ok(())
}
