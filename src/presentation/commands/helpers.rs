use std::fmt::Display;

use crate::presentation::errors::CommandError;

pub fn log_command(command: impl AsRef<str>) {
    tracing::debug!(command = command.as_ref(), "Handling command");
}

/// Log an error under `context` and convert it for the caller
pub fn map_command_error<E>(context: &'static str) -> impl FnOnce(E) -> CommandError
where
    E: Display + Into<CommandError>,
{
    move |error| {
        tracing::error!(%error, "{}", context);
        error.into()
    }
}
