pub mod avatar_conversion_service;
pub mod plugin_service;
