pub mod avatar_commands;
pub mod helpers;
pub mod hook_commands;
pub mod plugin_commands;
