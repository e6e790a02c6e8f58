use std::path::PathBuf;

use genflow::GenflowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("image file not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Genflow(#[from] GenflowError),
}

pub type Result<T> = std::result::Result<T, CliError>;
