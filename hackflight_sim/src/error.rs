//! Error types for the simulation harness and drivers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Sonar noise must be a finite, non-negative standard deviation
    #[error("Invalid sonar noise standard deviation: {0}")]
    InvalidNoise(f64),
    
    /// Writing an export file failed
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Export serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
