// Presentation layer - entry points the forum host calls into
pub mod admin;
pub mod commands;
pub mod errors;
