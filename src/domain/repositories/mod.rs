pub mod plugin_cache_repository;
pub mod user_repository;
