use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Manifest not found: {0}")]
    NotFound(String),
    #[error("Manifest parse error: {0}")]
    ParseError(String),
    #[error("Bootstrap failed for {ecosystem} environment: {detail}")]
    BootstrapFailed { ecosystem: String, detail: String },
    #[error("Install failed for '{specifier}' ({ecosystem}): {detail}")]
    InstallFailed {
        specifier: String,
        ecosystem: String,
        detail: String,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
}
