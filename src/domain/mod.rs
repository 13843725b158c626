// Domain layer - models, repository interfaces and errors
pub mod errors;
pub mod models;
pub mod repositories;
