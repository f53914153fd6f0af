//! CLI command implementations.
//!
//! Results are reported through `tracing` at info level, one line per record.

pub mod account;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod requests;

use layercraft_core::ParseStatusError;
use layercraft_storefront::AppError;
use layercraft_storefront::Storefront;
use layercraft_storefront::appwrite::AppwriteError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Storefront operation failed.
    #[error("{}", .0.user_message())]
    App(#[from] AppError),

    /// Backend client could not be created.
    #[error("Backend client error: {0}")]
    Client(#[from] AppwriteError),

    /// The command needs the server API key.
    #[error("{0} requires APPWRITE_API_KEY to be set")]
    MissingApiKey(&'static str),

    /// Status argument is not a known status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseStatusError),

    /// Seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for the expected shape.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Fail unless a server API key is configured.
fn require_api_key(storefront: &Storefront, command: &'static str) -> Result<(), CliError> {
    if storefront.config().appwrite.api_key.is_none() {
        return Err(CliError::MissingApiKey(command));
    }
    Ok(())
}
