use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::application::dto::conversion_dto::AvatarConversionDto;
use crate::presentation::commands::helpers::{log_command, map_command_error};
use crate::presentation::errors::CommandError;

/// Host hook fired at the end of an avatar change in the user control panel
pub const AVATAR_UPLOAD_HOOK: &str = "usercp_do_avatar_end";

/// Which part of the forum is running the plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    #[default]
    Frontend,
    Admin,
}

/// Hooks registered in the given context; the admin panel gets none
pub fn registered_hooks(context: ExecutionContext) -> &'static [&'static str] {
    match context {
        ExecutionContext::Frontend => &[AVATAR_UPLOAD_HOOK],
        ExecutionContext::Admin => &[],
    }
}

/// Payload of the avatar-upload hook
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvatarUploadEvent {
    /// Defaults to the session user
    pub uid: Option<u32>,
    /// Names of the uploaded files, empty when the form carried none
    pub file_names: Vec<String>,
}

pub async fn on_avatar_upload(
    app_state: &AppState,
    event: AvatarUploadEvent,
) -> Result<Option<AvatarConversionDto>, CommandError> {
    let uid = event.uid.unwrap_or(app_state.settings.session.uid);
    log_command(format!("{} uid={}", AVATAR_UPLOAD_HOOK, uid));

    app_state
        .avatar_conversion_service
        .on_avatar_upload(uid, &event.file_names)
        .await
        .map_err(map_command_error("Failed to convert uploaded avatar"))
}

/// Fire the avatar-upload hook if `context` registers it
pub async fn fire_avatar_upload(
    app_state: &AppState,
    context: ExecutionContext,
    event: AvatarUploadEvent,
) -> Result<Option<AvatarConversionDto>, CommandError> {
    if !registered_hooks(context).contains(&AVATAR_UPLOAD_HOOK) {
        tracing::debug!("{} is not registered in {:?} context", AVATAR_UPLOAD_HOOK, context);
        return Ok(None);
    }

    on_avatar_upload(app_state, event).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::settings::{AppSettings, SessionSettings};
    use crate::domain::models::user::User;
    use crate::infrastructure::persistence::file_system::write_json_file;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use rand::random;
    use std::io::Cursor;
    use std::path::PathBuf;

    async fn setup_state(session_uid: u32) -> (AppState, PathBuf) {
        let root = std::env::temp_dir().join(format!("webpp-hook-{}", random::<u64>()));
        std::fs::create_dir_all(root.join("uploads/avatars")).expect("create avatars dir");

        for uid in [1, 2] {
            let mut png = Vec::new();
            DynamicImage::ImageRgb8(RgbImage::new(4, 4))
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .expect("should build png image");
            std::fs::write(root.join(format!("uploads/avatars/avatar_{}.png", uid)), png)
                .expect("write avatar");
        }

        write_json_file(
            &root.join("data/users.json"),
            &vec![
                User::new(1, "./uploads/avatars/avatar_1.png?dateline=1"),
                User::new(2, "./uploads/avatars/avatar_2.png?dateline=1"),
            ],
        )
        .await
        .expect("seed users");

        let settings = AppSettings {
            forum_root: root.clone(),
            data_directory: root.join("data"),
            log_directory: root.join("logs"),
            session: SessionSettings {
                uid: session_uid,
                post_code: "postkey".to_string(),
            },
        };
        let state = AppState::new(settings).await.expect("app state");
        (state, root)
    }

    #[test]
    fn upload_hook_is_frontend_only() {
        assert_eq!(registered_hooks(ExecutionContext::Frontend), &[AVATAR_UPLOAD_HOOK]);
        assert!(registered_hooks(ExecutionContext::Admin).is_empty());
    }

    #[tokio::test]
    async fn admin_context_ignores_upload_hook() {
        let (state, root) = setup_state(1).await;

        let outcome = fire_avatar_upload(
            &state,
            ExecutionContext::Admin,
            AvatarUploadEvent {
                uid: None,
                file_names: vec!["me.png".to_string()],
            },
        )
        .await
        .expect("upload hook");

        assert_eq!(outcome, None);
        assert!(root.join("uploads/avatars/avatar_1.png").exists());
        assert!(!root.join("uploads/avatars/avatar_1.webp").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn upload_without_uid_converts_session_user() {
        let (state, root) = setup_state(2).await;

        let outcome = fire_avatar_upload(
            &state,
            ExecutionContext::Frontend,
            AvatarUploadEvent {
                uid: None,
                file_names: vec!["me.png".to_string()],
            },
        )
        .await
        .expect("upload hook")
        .expect("conversion should run");

        assert_eq!(outcome.uid, 2);
        assert!(outcome.changed);
        assert!(root.join("uploads/avatars/avatar_2.webp").exists());
        assert!(root.join("uploads/avatars/avatar_1.png").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn explicit_uid_overrides_session_user() {
        let (state, root) = setup_state(2).await;

        let outcome = on_avatar_upload(
            &state,
            AvatarUploadEvent {
                uid: Some(1),
                file_names: vec!["me.png".to_string()],
            },
        )
        .await
        .expect("upload hook")
        .expect("conversion should run");

        assert_eq!(outcome.uid, 1);
        assert!(root.join("uploads/avatars/avatar_1.webp").exists());
        assert!(root.join("uploads/avatars/avatar_2.png").exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
