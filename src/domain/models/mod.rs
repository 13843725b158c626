pub mod avatar;
pub mod plugin;
pub mod settings;
pub mod user;
