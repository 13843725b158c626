// Application layer - use cases built on the domain interfaces
pub mod dto;
pub mod errors;
pub mod services;
