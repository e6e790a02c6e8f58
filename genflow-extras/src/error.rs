//! Error types for genflow-extras

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtrasError {
    /// Telemetry initialization error
    #[cfg(feature = "telemetry")]
    #[error("Telemetry initialization error: {0}")]
    TelemetryInit(String),

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, ExtrasError>;
