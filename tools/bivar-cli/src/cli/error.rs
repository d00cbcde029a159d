use std::path::PathBuf;

use bivarcontours_core::ContourError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Contour(#[from] ContourError),

    #[error("{}: {message}", path.display())]
    Limits { path: PathBuf, message: String },

    #[error("{}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("stdout: {0}")]
    Stdout(String),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Contour(err) => err.code(),
            CliError::Limits { .. } => "E_CLI_LIMITS",
            CliError::Write { .. } => "E_IO_WRITE",
            CliError::Stdout(_) => "E_IO_WRITE",
        }
    }
}
