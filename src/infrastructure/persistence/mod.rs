// Persistence utilities
pub mod file_system;
pub mod image_probe;
pub mod webp_converter;
