pub mod app;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

use clap::Parser;

use app::{AppState, load_settings};
use cli::Cli;
use infrastructure::logging::logger;

pub async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let settings = load_settings(&cli.config)
        .await
        .map_err(|error| format!("Failed to load settings: {}", error))?;

    if let Err(error) = logger::init_logger(&settings.log_directory) {
        eprintln!("Failed to initialize logger: {}", error);
    }

    tracing::info!("Starting WebPP");

    let app_state = AppState::new(settings)
        .await
        .map_err(|error| format!("Failed to initialize application state: {}", error))?;

    cli::dispatch(&app_state, cli.command)
        .await
        .map_err(|error| error.to_string())
}
