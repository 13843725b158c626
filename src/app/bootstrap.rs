use std::path::Path;
use std::sync::Arc;

use crate::application::services::avatar_conversion_service::AvatarConversionService;
use crate::application::services::plugin_service::PluginService;
use crate::domain::errors::DomainError;
use crate::domain::repositories::plugin_cache_repository::PluginCacheRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::infrastructure::persistence::file_system::DataDirectory;
use crate::infrastructure::persistence::webp_converter::ConversionContext;
use crate::infrastructure::repositories::file_plugin_cache_repository::FilePluginCacheRepository;
use crate::infrastructure::repositories::file_user_repository::FileUserRepository;

pub(super) struct Services {
    pub avatar_conversion_service: Arc<AvatarConversionService>,
    pub plugin_service: Arc<PluginService>,
}

pub(super) async fn initialize_data_directory(
    data_root: &Path,
) -> Result<DataDirectory, DomainError> {
    let data_directory = DataDirectory::new(data_root.to_path_buf());
    data_directory.initialize().await?;
    Ok(data_directory)
}

pub(super) fn build_services(
    data_directory: &DataDirectory,
    conversion_context: &ConversionContext,
) -> Services {
    let user_repository: Arc<dyn UserRepository> = Arc::new(FileUserRepository::new(
        data_directory.users_file().to_path_buf(),
    ));
    let plugin_cache_repository: Arc<dyn PluginCacheRepository> = Arc::new(
        FilePluginCacheRepository::new(data_directory.cache_file().to_path_buf()),
    );

    Services {
        avatar_conversion_service: Arc::new(AvatarConversionService::new(
            user_repository,
            conversion_context.clone(),
        )),
        plugin_service: Arc::new(PluginService::new(plugin_cache_repository)),
    }
}
