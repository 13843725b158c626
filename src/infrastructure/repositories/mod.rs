pub mod file_plugin_cache_repository;
pub mod file_user_repository;
