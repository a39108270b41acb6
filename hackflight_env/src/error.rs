//! Error types for the Hackflight environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The serial device could not be opened
    #[error("Failed to open serial port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
    
    /// Read or write on an open link failed
    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    /// The peer hung up (zero-length read, drained test link)
    #[error("Link closed: {0}")]
    Closed(String),
    
    /// The Ctrl-C handler could not be installed
    #[error("Interrupt handler error: {0}")]
    Interrupt(#[from] ctrlc::Error),
}

impl EnvError {
    /// Creates a link-closed error.
    pub fn closed(link: impl std::fmt::Display) -> Self {
        Self::Closed(link.to_string())
    }
}
