use std::path::Path;
use std::sync::Arc;

use crate::application::services::avatar_conversion_service::AvatarConversionService;
use crate::application::services::plugin_service::PluginService;
use crate::domain::errors::DomainError;
use crate::domain::models::settings::AppSettings;
use crate::infrastructure::persistence::file_system::read_json_file_or_default;
use crate::infrastructure::persistence::webp_converter::ConversionContext;

mod bootstrap;

pub struct AppState {
    pub settings: AppSettings,
    pub conversion_context: ConversionContext,
    pub avatar_conversion_service: Arc<AvatarConversionService>,
    pub plugin_service: Arc<PluginService>,
}

impl AppState {
    pub async fn new(settings: AppSettings) -> Result<Self, DomainError> {
        tracing::info!(
            "Initializing application with data root: {:?}",
            settings.data_directory
        );

        let data_directory = bootstrap::initialize_data_directory(&settings.data_directory).await?;
        let conversion_context = ConversionContext::new(&settings.forum_root);
        let services = bootstrap::build_services(&data_directory, &conversion_context);

        tracing::info!("Application initialized successfully");

        Ok(Self {
            settings,
            conversion_context,
            avatar_conversion_service: services.avatar_conversion_service,
            plugin_service: services.plugin_service,
        })
    }
}

/// Load settings from a JSON file; a missing file yields the defaults
pub async fn load_settings(path: &Path) -> Result<AppSettings, DomainError> {
    let settings: AppSettings = read_json_file_or_default(path).await?;
    tracing::debug!("Loaded settings from {:?}", path);
    Ok(settings)
}
